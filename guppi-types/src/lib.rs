pub mod bit_depth;
pub mod descriptor;
pub mod error;
pub mod grouping;
pub mod header;

pub use bit_depth::*;
pub use descriptor::*;
pub use error::*;
pub use grouping::*;
pub use header::*;

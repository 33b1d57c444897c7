//! Кодек формата GUPPI RAW
//!
//! Чтение и запись файлов с комплексными выборками напряжений
//! радиотелескопов: разбор 80-байтовых записей заголовка, распаковка
//! 4/8/16-битных выборок в `Complex32`, раскладка блока в тензор по
//! антеннам/лучам, каналам, времени и поляризациям.
//!
//! # Быстрый старт
//!
//! ```no_run
//! use guppi_core::{read_all_blocks, GuppiReader, GuppiWriter};
//! use guppi_types::BitDepth;
//!
//! let mut reader = GuppiReader::open("guppi_59000_0001.0000.raw")?;
//! let blocks = read_all_blocks(&mut reader)?;
//!
//! let mut writer = GuppiWriter::new(std::fs::File::create("copy.raw")?, BitDepth::Eight);
//! for block in &blocks {
//!     writer.write_block(&block.header, &block.data)?;
//! }
//! writer.finish()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod format;
pub mod geometry;
pub mod serialization;
pub mod session;
pub mod tensor;
pub mod transcode;
pub mod unpack;

pub use binary::*;
pub use format::*;
pub use geometry::*;
pub use num_complex::Complex32;
pub use serialization::*;
pub use session::*;
pub use tensor::*;
pub use transcode::*;
pub use unpack::*;

/// Версия библиотеки.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        assert_eq!(HEADER_RECORD_SIZE, 80);
        assert_eq!(DIRECTIO_ALIGN, 512);
        assert_eq!(DUMP_HEADER_SLOT, 204_800);
        assert!(!VERSION.is_empty());
    }
}

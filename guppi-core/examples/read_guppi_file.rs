//! Пример: чтение GUPPI RAW файла через GuppiReader
//!
//! Демонстрирует:
//! - открытие файла и фиксацию геометрии по первому заголовку
//! - итерацию блоков с распаковкой в тензор
//! - статистику чтения

use guppi_core::GuppiReader;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "guppi-core/test_output.raw".to_string());

    // --- GuppiReader читает первый заголовок при открытии ---
    let mut reader = match GuppiReader::open(&input_path) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("✗ Header validation failed: {e}");
            return Err(Box::new(e));
        }
    };

    if let Some(d) = reader.session() {
        println!("✓ Session geometry");
        println!("  NPOL      : {}", d.npol);
        println!("  OBSNCHAN  : {}", d.obsnchan);
        println!("  NBITS     : {}", d.bit_depth);
        println!("  BLOCSIZE  : {}", d.blocsize);
        println!("  Grouping  : {:?}", d.grouping());
        println!("  DIRECTIO  : {}", d.directio);
    }

    println!("\nBlocks:");
    for block in reader.by_ref() {
        let block = block?;
        let power: f32 = block.data.view().iter().map(|s| s.norm_sqr()).sum();
        println!(
            "  shape {:?}, mean power {:.3}",
            block.data.shape(),
            power / block.data.len() as f32
        );
    }

    let stats = reader.stats();
    println!("\n✓ Read complete");
    println!("  Blocks read     : {}", stats.blocks_read);
    println!("  Bytes processed : {}", stats.bytes_processed);
    println!("  Samples decoded : {}", stats.samples_decoded);

    Ok(())
}

//! Пример: запись GUPPI RAW файла через GuppiWriter
//!
//! Демонстрирует:
//! - заголовок наблюдения без полей раскладки
//! - генерацию синтетического тона по антеннам и каналам
//! - вывод OBSNCHAN/NANTS/BLOCSIZE/NBITS из формы тензора

use std::{f32::consts::PI, fs::File};

use guppi_core::{Complex32, GuppiWriter, SampleTensor};
use guppi_types::{BitDepth, GuppiHeader};
use ndarray::Array4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = "guppi-core/test_output.raw";

    // --- Заголовок ---
    let mut header = GuppiHeader::new();
    header.insert("BACKEND", "GUPPI");
    header.insert("TELESCOP", "ATA");
    header.insert("SRC_NAME", "SYNTH");
    header.insert("OBSFREQ", 1420.0);
    header.insert("CHAN_BW", 0.5);
    header.insert("TBIN", 2.0e-6);
    header.insert("DIRECTIO", 1);

    let file = File::create(output_path)?;
    let mut writer = GuppiWriter::new(file, BitDepth::Four);

    // --- Синтетические данные: тон в канале 3 каждой антенны ---
    let (nants, nchan, ntime, npol) = (4, 16, 1024, 2);

    for block_idx in 0..8 {
        let data = Array4::from_shape_fn((nants, nchan, ntime, npol), |(a, f, t, _)| {
            if f != 3 {
                return Complex32::new(0.0, 0.0);
            }
            let phase = 2.0 * PI * ((block_idx * ntime + t) as f32 / 64.0 + a as f32 / 8.0);
            Complex32::new(7.0 * phase.cos(), 7.0 * phase.sin())
        });

        header.insert("PKTIDX", block_idx * ntime);
        let written = writer.write_block(&header, &SampleTensor::Grouped(data))?;

        if block_idx == 0 {
            println!("✓ First header:");
            for (key, value) in written.iter() {
                println!("  {key:<8} = {value}");
            }
        }
    }

    println!("\n✓ Write complete: {output_path}");
    println!("  Blocks        : {}", writer.block_count());
    println!("  Bytes written : {}", writer.bytes_written());
    writer.finish()?;

    Ok(())
}

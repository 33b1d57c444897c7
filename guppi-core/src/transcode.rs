use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
    time::Instant,
};

use guppi_types::{keys, BitDepth, GuppiError, GuppiResult};
use log::{debug, info};

use crate::{
    serialization::{GuppiReader, GuppiWriter},
    unpack::widen_4bit_to_8bit,
};

/// Итоги перекодирования.
#[derive(Debug, Clone, Default)]
pub struct TranscodeStats {
    pub blocks: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub duration_secs: f64,
}

impl TranscodeStats {
    /// Скорость чтения в МБ/с.
    pub fn read_speed_mbps(&self) -> f64 {
        if self.duration_secs < 1e-9 {
            return 0.0;
        }

        self.bytes_read as f64 / self.duration_secs / 1_000_000.0
    }
}

/// Переписывает 4-битный поток в 8-битный.
///
/// Каждый блок распаковывается байт в байт: полубайты расширяются со знаком
/// до i8. В заголовке меняются только NBITS (8) и BLOCSIZE (вдвое больше),
/// остальные записи и их порядок сохраняются. Любой блок с другой
/// разрядностью прерывает перекодирование.
pub fn transcode_4bit_to_8bit<R: Read, W: Write>(
    input: R,
    output: W,
) -> GuppiResult<(W, TranscodeStats)> {
    let start = Instant::now();
    let mut reader = GuppiReader::new(input);
    let mut writer = GuppiWriter::new(output, BitDepth::Eight);
    let mut widened = Vec::new();

    while let Some(block) = reader.next_raw_block() {
        let block = block?;

        if block.descriptor.bit_depth != BitDepth::Four {
            return Err(GuppiError::UnsupportedBitDepth(
                block.descriptor.bit_depth.nbits() as i64,
            ));
        }

        widened.clear();
        widen_4bit_to_8bit(block.data, &mut widened);

        let mut header = block.header;
        header.insert(keys::NBITS, BitDepth::Eight.nbits());
        header.insert(keys::BLOCSIZE, widened.len());

        writer.write_raw_block(&header, &widened)?;
        debug!(
            "transcoded block {}: {} -> {} bytes",
            writer.block_count() - 1,
            block.data.len(),
            widened.len()
        );
    }

    let stats = TranscodeStats {
        blocks: writer.block_count(),
        bytes_read: reader.stats().bytes_processed,
        bytes_written: writer.bytes_written(),
        duration_secs: start.elapsed().as_secs_f64(),
    };
    let output = writer.finish()?;

    info!(
        "Transcoded {} blocks: {} -> {} bytes ({:.1} MB/s)",
        stats.blocks,
        stats.bytes_read,
        stats.bytes_written,
        stats.read_speed_mbps()
    );

    Ok((output, stats))
}

/// Перекодирует файл `input` в новый файл `output`.
pub fn convert_4bit_to_8bit<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> GuppiResult<TranscodeStats> {
    info!(
        "Converting {:?} -> {:?}",
        input.as_ref(),
        output.as_ref()
    );

    let src = File::open(input)?;
    let dst = File::create(output)?;
    let (file, stats) = transcode_4bit_to_8bit(src, dst)?;
    file.sync_all()?;

    Ok(stats)
}

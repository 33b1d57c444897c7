use std::io::{self, Read};

use guppi_types::{GuppiError, GuppiResult};
use log::warn;

/// Итог чтения одной записи фиксированной длины.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordRead {
    /// Запись прочитана целиком
    Full,
    /// Поток закончился до первого байта записи
    Eof,
}

/// Читает ровно `buf.len()` байт.
///
/// Ноль прочитанных байт означает чистый конец потока, обрыв посреди
/// записи считается ошибкой формата.
pub fn read_record<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
) -> GuppiResult<RecordRead> {
    let mut filled = 0;

    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(GuppiError::Io(e)),
        }
    }

    match filled {
        0 => Ok(RecordRead::Eof),
        n if n == buf.len() => Ok(RecordRead::Full),
        n => Err(GuppiError::format(format!(
            "truncated header record: {n} of {} bytes",
            buf.len()
        ))),
    }
}

/// Читает область данных блока длиной `len` в `buf`.
///
/// Буфер растёт по мере поступления байт, а не заранее по `len`.
/// Нехватка данных в потоке даёт ошибку формата.
pub fn read_data_region<R: Read>(
    reader: &mut R,
    len: usize,
    buf: &mut Vec<u8>,
) -> GuppiResult<()> {
    buf.clear();
    let got = reader.by_ref().take(len as u64).read_to_end(buf)?;

    if got < len {
        return Err(GuppiError::format(format!(
            "truncated data region: expected {len} bytes, got {got}"
        )));
    }

    Ok(())
}

/// Пропускает `n` байт выравнивания. Возвращает сколько реально пропущено.
///
/// Недостающее выравнивание в конце файла не считается ошибкой.
pub fn skip_padding<R: Read>(
    reader: &mut R,
    n: usize,
) -> GuppiResult<usize> {
    if n == 0 {
        return Ok(0);
    }

    let skipped = io::copy(&mut reader.by_ref().take(n as u64), &mut io::sink())? as usize;

    if skipped < n {
        warn!("stream ended inside padding: skipped {skipped} of {n} bytes");
    }

    Ok(skipped)
}

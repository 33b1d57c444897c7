//! Формат файлов GUPPI RAW
//!
//! Файл: последовательность блоков без общего заголовка и контрольных сумм:
//!
//! ```text
//! [записи заголовка по 80 байт]+ END [выравнивание DIRECTIO]?
//! [BLOCSIZE байт упакованных выборок] [выравнивание DIRECTIO]?
//! ```
//!
//! Запись заголовка: ASCII вида `KEY     =VALUE`, ровно 80 байт. Заголовок
//! завершается записью `END` + 77 пробелов. При DIRECTIO заголовок и данные
//! дополняются до границы 512 байт.

use std::io::Read;

use guppi_types::{GuppiError, GuppiHeader, GuppiResult, HeaderValue, HEADER_KEY_MAX_LEN};
use log::{debug, trace};

use crate::binary::{padding_len, read_record, skip_padding, RecordRead};

/// Размер одной записи заголовка
pub const HEADER_RECORD_SIZE: usize = 80;

/// Граница выравнивания DIRECTIO
pub const DIRECTIO_ALIGN: usize = 512;

/// Запись-терминатор: `END` и 77 пробелов
pub const END_RECORD: [u8; HEADER_RECORD_SIZE] = end_record();

/// Заполнитель выравнивания после заголовка
pub const HEADER_PAD_FILL: u8 = b'*';

/// Заполнитель выравнивания после данных (пробелы, как у ASCII-записей)
pub const DATA_PAD_FILL: u8 = b' ';

/// Ширина поля значения в записи (80 - 8 символов ключа - `=`)
const VALUE_FIELD_LEN: usize = HEADER_RECORD_SIZE - HEADER_KEY_MAX_LEN - 1;

/// Разобранная запись заголовка.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderRecord {
    Entry(String, HeaderValue),
    End,
}

/// Чтение и запись заголовков GUPPI RAW.
pub trait GuppiHeaderExt: Sized {
    /// Читает заголовок из потока, включая выравнивание DIRECTIO.
    ///
    /// `Ok(None)`: поток закончился до первого байта заголовка.
    fn parse_from<R: Read>(reader: &mut R) -> GuppiResult<Option<Self>>;

    /// Сериализует записи, END и (при DIRECTIO) заполнитель до 512 байт.
    fn serialize(&self) -> GuppiResult<Vec<u8>>;
}

impl GuppiHeaderExt for GuppiHeader {
    fn parse_from<R: Read>(reader: &mut R) -> GuppiResult<Option<Self>> {
        let mut record = [0u8; HEADER_RECORD_SIZE];

        if read_record(reader, &mut record)? == RecordRead::Eof {
            return Ok(None);
        }

        let mut header = GuppiHeader::new();
        let mut nbytes = 0usize;

        loop {
            nbytes += HEADER_RECORD_SIZE;

            match parse_record(&record)? {
                HeaderRecord::End => break,
                HeaderRecord::Entry(key, value) => {
                    header.insert(key, value);
                }
            }

            if read_record(reader, &mut record)? == RecordRead::Eof {
                return Err(GuppiError::format(format!(
                    "stream ended after {nbytes} header bytes without END record"
                )));
            }
        }

        if header.directio() {
            let pad = padding_len(nbytes, DIRECTIO_ALIGN);
            trace!("skipping {pad} bytes of header padding");
            nbytes += skip_padding(reader, pad)?;
        }

        header.set_header_size(nbytes);
        debug!("parsed header: {} records, {nbytes} bytes", header.len());

        Ok(Some(header))
    }

    fn serialize(&self) -> GuppiResult<Vec<u8>> {
        let mut buf = Vec::with_capacity((self.len() + 1) * HEADER_RECORD_SIZE);

        for (key, value) in self.iter() {
            buf.extend_from_slice(&serialize_record(key, value)?);
        }

        buf.extend_from_slice(&END_RECORD);

        if self.directio() {
            let pad = padding_len(buf.len(), DIRECTIO_ALIGN);
            buf.resize(buf.len() + pad, HEADER_PAD_FILL);
        }

        Ok(buf)
    }
}

/// Разбирает одну 80-байтовую запись.
pub fn parse_record(record: &[u8; HEADER_RECORD_SIZE]) -> GuppiResult<HeaderRecord> {
    if record.starts_with(b"END") {
        if *record == END_RECORD {
            return Ok(HeaderRecord::End);
        }
        return Err(GuppiError::format(format!(
            "malformed END record: {:?}",
            String::from_utf8_lossy(record)
        )));
    }

    let text = std::str::from_utf8(record)
        .map_err(|_| GuppiError::format("header record is not ASCII"))?;

    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| GuppiError::format(format!("record without '=': {text:?}")))?;

    let key = key.trim();
    if key.is_empty() {
        return Err(GuppiError::format(format!("record without key: {text:?}")));
    }

    Ok(HeaderRecord::Entry(key.to_string(), HeaderValue::parse(value)))
}

/// Собирает запись: ключ шириной 8, `=`, значение шириной 71.
pub fn serialize_record(
    key: &str,
    value: &HeaderValue,
) -> GuppiResult<[u8; HEADER_RECORD_SIZE]> {
    if key.is_empty() || !key.is_ascii() || key.contains('=') {
        return Err(GuppiError::format(format!("invalid header key: {key:?}")));
    }

    // Такая запись будет прочитана как испорченный END
    if key.starts_with("END") {
        return Err(GuppiError::format(format!(
            "header key {key:?} collides with the END record"
        )));
    }

    let rendered = value.render();
    if !rendered.is_ascii() {
        return Err(GuppiError::format(format!(
            "value of {key} is not ASCII: {rendered:?}"
        )));
    }

    let key = &key[..key.len().min(HEADER_KEY_MAX_LEN)];
    let value = &rendered[..rendered.len().min(VALUE_FIELD_LEN)];
    let text = format!(
        "{key:<kw$}={value:<vw$}",
        kw = HEADER_KEY_MAX_LEN,
        vw = VALUE_FIELD_LEN
    );

    let mut out = [b' '; HEADER_RECORD_SIZE];
    out.copy_from_slice(text.as_bytes());
    Ok(out)
}

/// Выравнивание DIRECTIO после области данных длиной `blocsize`.
pub fn data_padding(blocsize: usize) -> usize {
    padding_len(blocsize, DIRECTIO_ALIGN)
}

const fn end_record() -> [u8; HEADER_RECORD_SIZE] {
    let mut r = [b' '; HEADER_RECORD_SIZE];
    r[0] = b'E';
    r[1] = b'N';
    r[2] = b'D';
    r
}

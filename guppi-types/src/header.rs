use std::fmt;

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{GuppiError, GuppiResult};

/// Имена ключей, которые кодек интерпретирует для вычисления раскладки блока.
pub mod keys {
    pub const NPOL: &str = "NPOL";
    pub const OBSNCHAN: &str = "OBSNCHAN";
    pub const NBITS: &str = "NBITS";
    pub const BLOCSIZE: &str = "BLOCSIZE";
    pub const NANTS: &str = "NANTS";
    pub const NBEAMS: &str = "NBEAMS";
    pub const NCHAN: &str = "NCHAN";
    pub const DIRECTIO: &str = "DIRECTIO";
    pub const PIPERBLK: &str = "PIPERBLK";
    /// Синтетическое поле: сколько байт занял заголовок в потоке.
    pub const HEADER_SIZE: &str = "HEADER_SIZE";
}

/// Максимальная длина ключа в записи заголовка.
pub const HEADER_KEY_MAX_LEN: usize = 8;

/// Максимальная длина строкового значения до заключения в кавычки.
pub const HEADER_STRING_MAX_LEN: usize = 69;

/// Значение записи заголовка.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// Заголовок одного блока GUPPI RAW.
///
/// Упорядоченное отображение ключ → значение: ключи уникальны, повторная
/// вставка перезаписывает значение на прежней позиции. `header_size` не
/// является частью записей и при сериализации не выводится.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GuppiHeader {
    entries: Vec<(String, HeaderValue)>,
    header_size: usize,
}

impl HeaderValue {
    /// Разбирает текст значения из записи.
    ///
    /// Значение с `.` читается как число с плавающей точкой, без точки
    /// как целое. Если разбор не удался, остаётся строка без окружающих кавычек.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let parsed = if raw.contains('.') {
            raw.parse::<f64>().ok().map(HeaderValue::Float)
        } else {
            raw.parse::<i64>().ok().map(HeaderValue::Int)
        };

        parsed.unwrap_or_else(|| HeaderValue::Str(raw.trim_matches('\'').trim().to_string()))
    }

    /// Целое значение. Float без дробной части тоже принимается.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(v) => Some(*v),
            HeaderValue::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            HeaderValue::Int(v) => Some(*v as f64),
            HeaderValue::Float(v) => Some(*v),
            HeaderValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Истинность значения: ненулевое число или непустая строка.
    pub fn is_truthy(&self) -> bool {
        match self {
            HeaderValue::Int(v) => *v != 0,
            HeaderValue::Float(v) => *v != 0.0,
            HeaderValue::Str(s) => !s.is_empty(),
        }
    }

    /// Текст значения в том виде, в каком он попадает в запись.
    ///
    /// Строки обрезаются до 69 символов и заключаются в одинарные кавычки.
    /// Конечный float всегда содержит `.`, чтобы при обратном разборе остаться float.
    /// NaN и бесконечности пишутся как `NaN`, `inf`, `-inf` и читаются обратно
    /// как `HeaderValue::Str`.
    pub fn render(&self) -> String {
        match self {
            HeaderValue::Int(v) => v.to_string(),
            HeaderValue::Float(v) => render_float(*v),
            HeaderValue::Str(s) => {
                let cut: String = s.chars().take(HEADER_STRING_MAX_LEN).collect();
                format!("'{cut}'")
            }
        }
    }
}

impl GuppiHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Вставляет значение. Существующий ключ сохраняет свою позицию.
    pub fn insert<K: Into<String>, V: Into<HeaderValue>>(
        &mut self,
        key: K,
        value: V,
    ) -> Option<HeaderValue> {
        let key = key.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Вставляет значение, только если ключ ещё отсутствует.
    pub fn insert_default<K: Into<String>, V: Into<HeaderValue>>(
        &mut self,
        key: K,
        value: V,
    ) {
        let key = key.into();
        if !self.contains_key(&key) {
            self.entries.push((key, value.into()));
        }
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<&HeaderValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn remove(
        &mut self,
        key: &str,
    ) -> Option<HeaderValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn contains_key(
        &self,
        key: &str,
    ) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Сколько байт занял заголовок в потоке (записи + END + выравнивание).
    ///
    /// Ноль для заголовков, собранных в памяти.
    pub fn header_size(&self) -> usize {
        self.header_size
    }

    pub fn set_header_size(
        &mut self,
        size: usize,
    ) {
        self.header_size = size;
    }

    /// Целочисленное обязательное поле.
    pub fn get_int(
        &self,
        key: &str,
    ) -> GuppiResult<i64> {
        let value = self.get(key).ok_or_else(|| GuppiError::missing_field(key))?;
        value
            .as_int()
            .ok_or_else(|| GuppiError::invalid_field(key, value))
    }

    /// Неотрицательное обязательное поле.
    pub fn get_usize(
        &self,
        key: &str,
    ) -> GuppiResult<usize> {
        let v = self.get_int(key)?;
        usize::try_from(v).map_err(|_| GuppiError::invalid_field(key, v))
    }

    /// Неотрицательное необязательное поле.
    pub fn get_opt_usize(
        &self,
        key: &str,
    ) -> GuppiResult<Option<usize>> {
        if self.contains_key(key) {
            self.get_usize(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Флаг DIRECTIO. Отсутствующий ключ трактуется как `false`.
    pub fn directio(&self) -> bool {
        self.get(keys::DIRECTIO).is_some_and(HeaderValue::is_truthy)
    }
}

/// Конечные значения получают `.`; `NaN`, `inf`, `-inf` остаются как есть.
fn render_float(v: f64) -> String {
    let s = format!("{v:?}");

    if s.contains('.') || !v.is_finite() {
        s
    } else if let Some(pos) = s.find('e') {
        format!("{}.0{}", &s[..pos], &s[pos..])
    } else {
        format!("{s}.0")
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для HeaderValue, GuppiHeader
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for HeaderValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            HeaderValue::Int(v) => write!(f, "{v}"),
            HeaderValue::Float(v) => write!(f, "{}", render_float(*v)),
            HeaderValue::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for HeaderValue {
    fn from(v: i64) -> Self {
        HeaderValue::Int(v)
    }
}

impl From<i32> for HeaderValue {
    fn from(v: i32) -> Self {
        HeaderValue::Int(v as i64)
    }
}

impl From<u32> for HeaderValue {
    fn from(v: u32) -> Self {
        HeaderValue::Int(v as i64)
    }
}

impl From<usize> for HeaderValue {
    fn from(v: usize) -> Self {
        HeaderValue::Int(v as i64)
    }
}

impl From<bool> for HeaderValue {
    fn from(v: bool) -> Self {
        HeaderValue::Int(v as i64)
    }
}

impl From<f64> for HeaderValue {
    fn from(v: f64) -> Self {
        HeaderValue::Float(v)
    }
}

impl From<&str> for HeaderValue {
    fn from(v: &str) -> Self {
        HeaderValue::Str(v.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(v: String) -> Self {
        HeaderValue::Str(v)
    }
}

impl Serialize for GuppiHeader {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() + 1))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.serialize_entry(keys::HEADER_SIZE, &self.header_size)?;
        map.end()
    }
}

impl<K: Into<String>, V: Into<HeaderValue>> FromIterator<(K, V)> for GuppiHeader {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut header = GuppiHeader::new();
        for (k, v) in iter {
            header.insert(k, v);
        }
        header
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

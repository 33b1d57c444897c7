use thiserror::Error;

/// Результат для операций GUPPI.
pub type GuppiResult<T> = std::result::Result<T, GuppiError>;

/// Типы ошибок формата GUPPI RAW.
///
/// Все ошибки фатальны для текущего вызова чтения/записи: частичный блок
/// вызывающему не возвращается, поток не восстанавливается автоматически.
#[derive(Debug, Error)]
pub enum GuppiError {
    /// Некорректная запись заголовка (в т.ч. испорченная запись END или
    /// поток, оборвавшийся посреди заголовка)
    #[error("Not a GUPPI-RAW-formatted header: {0}")]
    Format(String),

    /// Отсутствует поле, без которого невозможно вычислить геометрию блока
    #[error("Missing header field: {0}")]
    MissingField(String),

    /// Поле присутствует, но его значение непригодно (не целое, отрицательное)
    #[error("Invalid header field {key}: {value}")]
    InvalidField { key: String, value: String },

    /// NBITS вне множества {4, 8, 16} (или не та разрядность, что ожидает
    /// операция)
    #[error("Unsupported bit depth: NBITS={0}")]
    UnsupportedBitDepth(i64),

    /// BLOCSIZE или OBSNCHAN не делятся нацело по вычисленной геометрии
    #[error("Bad block geometry: {0}")]
    Geometry(String),

    /// Геометрия блока отличается от первого блока, прочитанного из потока
    #[error("Session mismatch on {field}: first block had {expected}, this block has {found}")]
    SessionMismatch {
        field: &'static str,
        expected: String,
        found: String,
    },

    /// Тензор не укладывается в модель заголовка
    #[error("Tensor shape error: {0}")]
    Shape(String),

    /// Ошибки ввода/вывода (автоконвертируются из std::io::Error)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuppiError {
    /// Удобные конструкторы
    pub fn format<S: Into<String>>(s: S) -> Self {
        Self::Format(s.into())
    }

    pub fn missing_field<S: Into<String>>(key: S) -> Self {
        Self::MissingField(key.into())
    }

    pub fn invalid_field<K: Into<String>, V: ToString>(
        key: K,
        value: V,
    ) -> Self {
        Self::InvalidField {
            key: key.into(),
            value: value.to_string(),
        }
    }

    pub fn geometry<S: Into<String>>(s: S) -> Self {
        Self::Geometry(s.into())
    }

    pub fn shape<S: Into<String>>(s: S) -> Self {
        Self::Shape(s.into())
    }
}

use guppi_types::GuppiError;
use thiserror::Error;

pub type ToolResult<T> = std::result::Result<T, ToolError>;

#[derive(Debug, Error)]
pub enum ToolError {
    /// Ошибка формата GUPPI RAW
    #[error("GUPPI error: {0}")]
    Guppi(#[from] GuppiError),

    /// Ошибка чтения/записи файла
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Ошибка вывода отчёта в JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Некорректные параметры запуска
    #[error("Invalid configuration: {0}")]
    Config(String),
}

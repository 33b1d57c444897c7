use guppi_core::BlockLayout;
use log::LevelFilter;

use crate::{ToolError, ToolResult};

/// Раскладка входного файла (выбор при старте).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutKind {
    /// Обычный GUPPI RAW.
    #[default]
    Stream,
    /// Dump-файл hashpipe со слотами фиксированного размера.
    Dump,
}

/// Параметры команды `info`.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Раскладка входного файла
    pub layout: LayoutKind,
    /// Сколько блоков прочитать (None = все)
    pub max_blocks: Option<usize>,
    /// Печатать отчёт в JSON вместо текста
    pub json: bool,
    /// Включать в отчёт полные заголовки блоков
    pub headers: bool,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl LayoutKind {
    /// Раскладка для `GuppiReader`.
    pub fn block_layout(&self) -> BlockLayout {
        match self {
            LayoutKind::Stream => BlockLayout::Stream,
            LayoutKind::Dump => BlockLayout::dumpfile(),
        }
    }
}

impl ToolConfig {
    pub fn validate(&self) -> ToolResult<()> {
        if self.max_blocks == Some(0) {
            return Err(ToolError::Config(
                "--max-blocks must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Уровень логирования по флагам `--quiet` и `--verbose`.
pub fn log_level(
    quiet: bool,
    verbose: u8,
) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }

    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для LayoutKind, ToolConfig
////////////////////////////////////////////////////////////////////////////////

impl std::fmt::Display for LayoutKind {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            LayoutKind::Stream => write!(f, "stream"),
            LayoutKind::Dump => write!(f, "dump"),
        }
    }
}

impl std::str::FromStr for LayoutKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stream" | "raw" => Ok(LayoutKind::Stream),
            "dump" | "dumpfile" => Ok(LayoutKind::Dump),
            _ => Err(format!("Unknown layout: '{s}'. Use: stream, dump")),
        }
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            layout: LayoutKind::Stream,
            max_blocks: None,
            json: false,
            headers: false,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_kind_fromstr() {
        assert_eq!("stream".parse::<LayoutKind>().unwrap(), LayoutKind::Stream);
        assert_eq!("DUMP".parse::<LayoutKind>().unwrap(), LayoutKind::Dump);
        assert_eq!("dumpfile".parse::<LayoutKind>().unwrap(), LayoutKind::Dump);
        assert!("fits".parse::<LayoutKind>().is_err());
    }

    #[test]
    fn test_layout_kind_display_roundtrip() {
        for kind in [LayoutKind::Stream, LayoutKind::Dump] {
            assert_eq!(kind.to_string().parse::<LayoutKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_block_layout_mapping() {
        assert_eq!(LayoutKind::Stream.block_layout(), BlockLayout::Stream);
        assert_eq!(LayoutKind::Dump.block_layout(), BlockLayout::dumpfile());
    }

    #[test]
    fn test_validate_max_blocks() {
        let mut cfg = ToolConfig::default();
        assert!(cfg.validate().is_ok());

        cfg.max_blocks = Some(0);
        assert!(matches!(cfg.validate(), Err(ToolError::Config(_))));
    }

    #[test]
    fn test_log_level_flags() {
        assert_eq!(log_level(false, 0), LevelFilter::Info);
        assert_eq!(log_level(false, 1), LevelFilter::Debug);
        assert_eq!(log_level(false, 5), LevelFilter::Trace);
        assert_eq!(log_level(true, 2), LevelFilter::Error);
    }
}

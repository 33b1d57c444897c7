use std::{fs::File, path::Path, time::Instant};

use guppi_core::{GuppiBlock, GuppiReader, ReadStats};
use guppi_types::{BlockDescriptor, GroupingAxis, GuppiHeader};
use log::{debug, info};
use serde::Serialize;

use crate::{ToolConfig, ToolResult};

/// Геометрия сессии в виде, пригодном для вывода.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub npol: usize,
    pub obsnchan: usize,
    pub nbits: u32,
    pub blocsize: usize,
    pub grouping: String,
    pub directio: bool,
}

/// Сводка по одному блоку.
#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    pub index: usize,
    pub header_size: usize,
    pub shape: Vec<usize>,
    /// Средняя мощность |x|² по всем выборкам блока
    pub mean_power: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<GuppiHeader>,
}

/// Итоговый отчёт команды `info`.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub layout: String,
    pub session: Option<SessionReport>,
    pub blocks: Vec<BlockReport>,
    pub blocks_read: u64,
    pub bytes_processed: u64,
    pub samples_decoded: u64,
    pub duration_secs: f64,
}

impl SessionReport {
    pub fn from_descriptor(d: &BlockDescriptor) -> Self {
        let grouping = match d.grouping() {
            GroupingAxis::Ungrouped => "none".to_string(),
            GroupingAxis::Antennas(n) => format!("{n} antennas"),
            GroupingAxis::Beams(n) => format!("{n} beams"),
        };

        Self {
            npol: d.npol,
            obsnchan: d.obsnchan,
            nbits: d.bit_depth.nbits(),
            blocsize: d.blocsize,
            grouping,
            directio: d.directio,
        }
    }
}

impl BlockReport {
    pub fn from_block(
        index: usize,
        block: &GuppiBlock,
        with_header: bool,
    ) -> Self {
        let view = block.data.view();
        let power: f64 = view.iter().map(|s| s.norm_sqr() as f64).sum();
        let mean_power = if view.is_empty() {
            0.0
        } else {
            power / view.len() as f64
        };

        Self {
            index,
            header_size: block.header.header_size(),
            shape: block.data.shape().to_vec(),
            mean_power,
            header: with_header.then(|| block.header.clone()),
        }
    }
}

impl FileReport {
    /// Скорость чтения в МБ/с.
    pub fn read_speed_mbps(&self) -> f64 {
        if self.duration_secs < 1e-9 {
            return 0.0;
        }

        self.bytes_processed as f64 / self.duration_secs / 1_000_000.0
    }

    fn finish(
        &mut self,
        stats: &ReadStats,
        start: &Instant,
    ) {
        self.blocks_read = stats.blocks_read;
        self.bytes_processed = stats.bytes_processed;
        self.samples_decoded = stats.samples_decoded;
        self.duration_secs = start.elapsed().as_secs_f64();
    }
}

/// Читает файл и собирает отчёт по блокам.
///
/// Первая ошибка чтения прерывает разбор и возвращается вызывающему.
pub fn inspect_file<P: AsRef<Path>>(
    path: P,
    cfg: &ToolConfig,
) -> ToolResult<FileReport> {
    let path = path.as_ref();
    let start = Instant::now();

    info!("Inspecting {path:?} (layout: {})", cfg.layout);

    let file = File::open(path)?;
    let mut reader = GuppiReader::probe_with_layout(file, cfg.layout.block_layout())?;

    let mut report = FileReport {
        path: path.display().to_string(),
        layout: cfg.layout.to_string(),
        session: reader.session().map(SessionReport::from_descriptor),
        blocks: Vec::new(),
        blocks_read: 0,
        bytes_processed: 0,
        samples_decoded: 0,
        duration_secs: 0.0,
    };

    let limit = cfg.max_blocks.unwrap_or(usize::MAX);

    for (index, block) in reader.by_ref().take(limit).enumerate() {
        let block = block?;
        debug!("block {index}: shape {:?}", block.data.shape());
        report
            .blocks
            .push(BlockReport::from_block(index, &block, cfg.headers));
    }

    report.finish(reader.stats(), &start);
    Ok(report)
}

impl std::fmt::Display for FileReport {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        writeln!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(f, "  File          : {}", self.path)?;
        writeln!(f, "  Layout        : {}", self.layout)?;

        match &self.session {
            Some(s) => {
                writeln!(f, "  NPOL          : {}", s.npol)?;
                writeln!(f, "  OBSNCHAN      : {}", s.obsnchan)?;
                writeln!(f, "  NBITS         : {}", s.nbits)?;
                writeln!(f, "  BLOCSIZE      : {}", s.blocsize)?;
                writeln!(f, "  Grouping      : {}", s.grouping)?;
                writeln!(f, "  DIRECTIO      : {}", s.directio)?;
            }
            None => writeln!(f, "  (empty file)")?,
        }

        for b in &self.blocks {
            writeln!(
                f,
                "  [{:>4}] shape {:?}, header {} B, mean power {:.3}",
                b.index, b.shape, b.header_size, b.mean_power
            )?;
            if let Some(h) = &b.header {
                for (key, value) in h.iter() {
                    writeln!(f, "         {key:<8} = {value}")?;
                }
            }
        }

        writeln!(f, "  Blocks        : {}", self.blocks_read)?;
        writeln!(f, "  Samples       : {}", self.samples_decoded)?;
        writeln!(
            f,
            "  Bytes read    : {:.1} MB",
            self.bytes_processed as f64 / 1e6
        )?;
        writeln!(f, "  Read speed    : {:.1} MB/s", self.read_speed_mbps())?;
        write!(f, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")
    }
}

#[cfg(test)]
mod tests {
    use guppi_core::{Complex32, GuppiWriter, SampleTensor};
    use guppi_types::BitDepth;
    use ndarray::Array4;
    use tempfile::NamedTempFile;

    use super::*;
    use crate::LayoutKind;

    fn write_file(blocks: usize) -> NamedTempFile {
        let tmp = NamedTempFile::new().unwrap();
        let data = Array4::from_shape_fn((2, 4, 8, 2), |(a, _, _, _)| {
            Complex32::new(a as f32 + 1.0, 0.0)
        });
        let tensor = SampleTensor::Grouped(data);

        let mut header = GuppiHeader::new();
        header.insert("TELESCOP", "ATA");
        header.insert("DIRECTIO", 1);

        let mut writer = GuppiWriter::new(File::create(tmp.path()).unwrap(), BitDepth::Eight);
        for _ in 0..blocks {
            writer.write_block(&header, &tensor).unwrap();
        }
        writer.finish().unwrap();
        tmp
    }

    #[test]
    fn test_inspect_counts_blocks() {
        let tmp = write_file(3);
        let report = inspect_file(tmp.path(), &ToolConfig::default()).unwrap();

        assert_eq!(report.blocks.len(), 3);
        assert_eq!(report.blocks_read, 3);
        assert_eq!(report.samples_decoded, 3 * 128);

        let session = report.session.as_ref().unwrap();
        assert_eq!(session.obsnchan, 8);
        assert_eq!(session.nbits, 8);
        assert_eq!(session.grouping, "2 antennas");

        // Антенна 0 → 1, антенна 1 → 4: среднее 2.5
        assert!((report.blocks[0].mean_power - 2.5).abs() < 1e-9);
        assert!(report.blocks[0].header.is_none());
    }

    #[test]
    fn test_inspect_respects_max_blocks() {
        let tmp = write_file(5);
        let cfg = ToolConfig {
            max_blocks: Some(2),
            headers: true,
            ..ToolConfig::default()
        };

        let report = inspect_file(tmp.path(), &cfg).unwrap();
        assert_eq!(report.blocks.len(), 2);
        assert_eq!(report.blocks_read, 2);
        assert!(report.blocks[1].header.is_some());
    }

    #[test]
    fn test_report_json_shape() {
        let tmp = write_file(1);
        let cfg = ToolConfig {
            headers: true,
            ..ToolConfig::default()
        };
        let report = inspect_file(tmp.path(), &cfg).unwrap();

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["layout"], "stream");
        assert_eq!(json["session"]["directio"], true);
        assert_eq!(json["blocks"][0]["shape"], serde_json::json!([2, 4, 8, 2]));
        assert_eq!(json["blocks"][0]["header"]["TELESCOP"], "ATA");
        assert_eq!(json["blocks"][0]["header"]["HEADER_SIZE"], 1024);
    }

    #[test]
    fn test_empty_file_report() {
        let tmp = NamedTempFile::new().unwrap();
        let report = inspect_file(tmp.path(), &ToolConfig::default()).unwrap();
        assert!(report.session.is_none());
        assert!(report.blocks.is_empty());
        assert!(report.to_string().contains("(empty file)"));
    }

    #[test]
    fn test_wrong_layout_is_error() {
        let tmp = write_file(1);
        let cfg = ToolConfig {
            layout: LayoutKind::Dump,
            ..ToolConfig::default()
        };
        // Слот заголовка длиннее всего файла, данных после него нет
        let report = inspect_file(tmp.path(), &cfg);
        assert!(report.is_err());
    }
}

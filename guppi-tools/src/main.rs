use std::path::PathBuf;

use clap::{Parser, Subcommand};
use guppi_core::convert_4bit_to_8bit;
use guppi_tools::{inspect_file, log_level, LayoutKind, ToolConfig, ToolResult};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "guppi",
    version = env!("CARGO_PKG_VERSION"),
    about = "Inspect and transcode GUPPI RAW baseband files",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Тихий режим (только ошибки)
    #[arg(short, long, global = true)]
    quiet: bool,
    /// Подробный лог (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Показать геометрию и сводку по блокам
    Info {
        /// Входной файл
        input: PathBuf,
        /// Раскладка файла: stream, dump
        #[arg(short, long, default_value = "stream")]
        layout: LayoutKind,
        /// Сколько блоков прочитать (по умолчанию все)
        #[arg(short = 'n', long)]
        max_blocks: Option<usize>,
        /// Печатать полные заголовки блоков
        #[arg(long)]
        headers: bool,
        /// Вывод в JSON
        #[arg(long)]
        json: bool,
    },
    /// Перекодировать 4-битный файл в 8-битный
    Transcode {
        /// Входной 4-битный файл
        input: PathBuf,
        /// Выходной файл
        output: PathBuf,
    },
}

fn run(cli: Cli) -> ToolResult<()> {
    match cli.command {
        Command::Info {
            input,
            layout,
            max_blocks,
            headers,
            json,
        } => {
            let cfg = ToolConfig {
                layout,
                max_blocks,
                json,
                headers,
            };
            cfg.validate()?;

            let report = inspect_file(&input, &cfg)?;

            if cfg.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
        }
        Command::Transcode { input, output } => {
            let stats = convert_4bit_to_8bit(&input, &output)?;

            info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            info!("  Blocks        : {}", stats.blocks);
            info!("  Bytes read    : {:.1} MB", stats.bytes_read as f64 / 1e6);
            info!("  Bytes written : {:.1} MB", stats.bytes_written as f64 / 1e6);
            info!("  Duration      : {:.2}s", stats.duration_secs);
            info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            info!("✓ Transcode complete: {output:?}");
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(log_level(cli.quiet, cli.verbose))
        .format_target(false)
        .format_timestamp_secs()
        .init();

    if let Err(e) = run(cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

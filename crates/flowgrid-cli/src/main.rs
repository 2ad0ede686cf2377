mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Lay out a workflow graph by dependency level and print node positions as JSON.
#[derive(Debug, Parser)]
#[command(name = "flowgrid", version)]
struct Args {
    /// Workflow JSON document. Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// JSON layout config; fields left out keep their defaults.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print the output.
    #[arg(long)]
    pretty: bool,

    /// Also write JSON logs to a daily rolling file in this directory.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log dir {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::RollingFileAppender::builder()
                .rotation(tracing_appender::rolling::Rotation::DAILY)
                .filename_prefix("flowgrid")
                .filename_suffix("txt")
                .build(dir)
                .context("Failed to create log file appender")?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(EnvFilter::new("trace"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.log_dir.as_deref())?;

    let config = commands::load_config(args.config.as_deref())?;
    let input = commands::read_input(args.input.as_deref())?;
    let report = commands::layout_document(&input, &config)?;

    println!("{}", commands::render(&report, args.pretty)?);
    Ok(())
}

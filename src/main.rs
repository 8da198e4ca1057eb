//! finchat - multi-persona financial chat backend
//!
//! CLI entry point for the finchat server.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

mod api;
mod cli;
mod middleware;
mod server;

use server::config::LoggingConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let logging = server::load_config()
        .map(|config| config.logging)
        .unwrap_or_default();
    let _guard = init_tracing(&logging);

    let cli = cli::Cli::parse();

    info!("Starting finchat v{}", env!("CARGO_PKG_VERSION"));
    if !Path::new(".env").exists() {
        warn!(".env file not found. Provider credentials must come from the environment.");
    }

    cli::run(cli).await
}

/// Install the global subscriber; the returned guard flushes the error file
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "finchat=info,tower_http=info".into());

    let (pretty, json) = if logging.json {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    let (error_layer, guard) = match logging.error_file.as_deref().map(error_file_writer) {
        Some(Ok((writer, guard))) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(LevelFilter::ERROR);
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("Error log file disabled: {e}");
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .with(error_layer)
        .init();

    guard
}

fn error_file_writer(path: &str) -> Result<(NonBlocking, WorkerGuard)> {
    let path = Path::new(path);
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("error.log");

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file)
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

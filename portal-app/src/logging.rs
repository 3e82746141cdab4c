//! Tracing setup. The terminal belongs to the UI, so events go to a file.

use crate::config::LogConfig;
use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Default log file (~/.cache/equipment-portal/portal.log)
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|p| p.join("equipment-portal").join("portal.log"))
}

pub fn init(config: &LogConfig, verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose { "debug" } else { config.level.as_str() };

    let writer = match config.file.clone().or_else(default_log_path) {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::sink),
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

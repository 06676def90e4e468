use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use crate::config::AppConfig;
use crate::error::{AppError, Result};

/// Send `tracing` output to the log file; the terminal belongs to the UI.
pub fn init(config: &AppConfig) -> Result<()> {
    if let Some(parent) = Path::new(&config.log_file).parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(&config.log_level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}

fn filter(level: &str) -> String {
    format!("jumla_console={level},engine={level},client={level}")
}

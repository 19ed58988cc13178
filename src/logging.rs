// File: src/logging.rs
use crate::error::{Result, WordleError};
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Installs the global logger: the terminal at `level` and, when `log_dir` is given,
/// a `<unix seconds>.log` file in it at `Debug`. Returns the log file path, if any.
///
/// Only binaries call this; the library just emits through `log`.
pub fn init(level: log::LevelFilter, log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let config = ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> =
        vec![TermLogger::new(level, config.clone(), TerminalMode::Mixed, ColorChoice::Auto)];

    let file = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let time = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| WordleError::Config(e.to_string()))?
                .as_secs();
            let path = dir.join(format!("{time}.log"));
            loggers.push(WriteLogger::new(log::LevelFilter::Debug, config, File::create(&path)?));
            Some(path)
        }
        None => None,
    };

    CombinedLogger::init(loggers).map_err(|e| WordleError::Config(format!("logger: {e}")))?;
    Ok(file)
}

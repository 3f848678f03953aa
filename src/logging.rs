//! log4rs setup.
//!
//! A `log4rs.yml` in the working directory wins. Otherwise everything goes to
//! stderr, at debug level with `--verbose` and error level without.

use crate::config::LOG_CONFIG_FILE;
use crate::error::ConfigError;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::Path;

const STDERR_APPENDER: &str = "stderr";
const LOG_PATTERN: &str = "{d(%Y/%m/%d %H:%M:%S%.6f)} {l} {m}{n}";

pub fn log_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Error
    }
}

/// Build the stderr-only configuration used when no `log4rs.yml` exists.
pub fn stderr_config(verbose: bool) -> Result<Config, ConfigError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build();
    Config::builder()
        .appender(Appender::builder().build(STDERR_APPENDER, Box::new(stderr)))
        .build(
            Root::builder()
                .appender(STDERR_APPENDER)
                .build(log_level(verbose)),
        )
        .map_err(|e| ConfigError::Logging(e.to_string()))
}

/// Install the global logger. Call once, before any work is done.
pub fn init_logging(verbose: bool) -> Result<(), ConfigError> {
    if Path::new(LOG_CONFIG_FILE).exists() {
        log4rs::init_file(LOG_CONFIG_FILE, Default::default())
            .map_err(|e| ConfigError::Logging(e.to_string()))?;
        log::info!("Logging configured from {LOG_CONFIG_FILE}");
        return Ok(());
    }
    log4rs::init_config(stderr_config(verbose)?)
        .map_err(|e| ConfigError::Logging(e.to_string()))?;
    Ok(())
}

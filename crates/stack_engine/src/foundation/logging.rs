//! Logging setup and editor level names

use log::{LevelFilter, SetLoggerError};

/// Initialize logging with an explicit level, still honouring `RUST_LOG`
/// module filters.
pub fn init_with_level(level: LevelFilter) -> Result<(), SetLoggerError> {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init()
}

/// Parse a level name as written in editor config files.
///
/// Accepts the standard names plus the editor's historical aliases
/// (`all`, `warning`, `fatal`). Case-insensitive.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.to_ascii_lowercase().as_str() {
        "all" | "trace" => Some(LevelFilter::Trace),
        "debug" => Some(LevelFilter::Debug),
        "info" => Some(LevelFilter::Info),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "error" | "fatal" => Some(LevelFilter::Error),
        "off" => Some(LevelFilter::Off),
        _ => None,
    }
}

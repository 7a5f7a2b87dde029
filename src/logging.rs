//! Tracing setup.
//!
//! The board UI owns the terminal, so while it runs logs are appended to
//! `cork.log` in the data directory. Plain subcommands log to stderr.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::{LOG_ENV, LOG_FILE};

pub const DEFAULT_LEVEL: &str = "warn";

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// `cork.log` inside the data directory.
    File,
}

/// Pick the filter directive: explicit flag, then `CORKBOARD_LOG`, then config, then `warn`.
pub fn resolve_level(flag: Option<&str>, config: Option<&str>) -> String {
    flag.map(str::to_string)
        .or_else(|| std::env::var(LOG_ENV).ok().filter(|v| !v.trim().is_empty()))
        .or_else(|| config.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init(level: &str, target: LogTarget, data_dir: &Path) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let result = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File => {
            fs::create_dir_all(data_dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(data_dir.join(LOG_FILE))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).try_init()
        }
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "keeping existing subscriber");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_config() {
        assert_eq!(resolve_level(Some("trace"), Some("info")), "trace");
    }
}

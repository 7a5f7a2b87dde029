//! User configuration.
//!
//! Everything lives in one data directory: the board itself, the log file
//! and an optional `config.yaml`. The directory is chosen by, in order, the
//! `--dir` flag, `CORKBOARD_DIR`, and `~/.corkboard`.
//!
//! ```yaml
//! board_width: 1200
//! board_height: 700
//! stack_ceiling: 19
//! log_level: debug
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::BoardSettings;
use crate::geometry::Rect;
use crate::stacking::DEFAULT_STACK_CEILING;

pub const DIR_ENV: &str = "CORKBOARD_DIR";
pub const LOG_ENV: &str = "CORKBOARD_LOG";
pub const CONFIG_FILE: &str = "config.yaml";
pub const LOG_FILE: &str = "cork.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Board size in pixels; notes are kept inside it.
    pub board_width: f64,
    pub board_height: f64,
    /// Highest stacking rank before the stack is packed down.
    pub stack_ceiling: u32,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            board_width: 1000.0,
            board_height: 600.0,
            stack_ceiling: DEFAULT_STACK_CEILING,
            log_level: None,
        }
    }
}

impl Config {
    /// Read `config.yaml` from `dir`. A missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn board_settings(&self) -> BoardSettings {
        BoardSettings {
            bounds: Rect::new(0.0, 0.0, self.board_width.max(1.0), self.board_height.max(1.0)),
            stack_ceiling: self.stack_ceiling.max(1),
        }
    }
}

/// Resolve the data directory from the flag, the environment, or the home directory.
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".corkboard")
}

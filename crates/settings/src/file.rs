//! TOML config file support.
//!
//! Config location: `~/.config/ttyscreen/config.toml`

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Which standard stream the detectors probe.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputStream {
    Stdin,
    Stdout,
    #[default]
    Stderr,
}

impl std::str::FromStr for OutputStream {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stdin" => Ok(Self::Stdin),
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            other => Err(format!("unknown output stream '{}'", other)),
        }
    }
}

/// User-facing config parsed from TOML.
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Print a one-line notice to stderr when a native capability fails to load.
    pub verbose: bool,
    /// Stream whose terminal is measured.
    pub output: OutputStream,
    /// Memoize the first answer for the lifetime of a detector.
    pub cache: bool,
    /// Strategies to leave out of the size and color chains, by name.
    pub skip: Vec<String>,
}

/// Default config file content with comments.
pub const DEFAULT_CONFIG: &str = r#"# ttyscreen configuration

# Print a notice to stderr when curses, readline or the native console
# capability cannot be loaded
verbose = false

# Stream to measure: "stdout", "stderr" or "stdin"
output = "stderr"

# Remember the first answer for the lifetime of a detector
cache = false

# Strategies to skip. Size: native-console, ioctl, readline, tput, stty,
# env, ansicon. Color: curses, tput-colors, term, colorterm.
# skip = ["tput", "stty"]
"#;

/// Return the default config file path.
pub fn config_path() -> PathBuf {
    ttyscreen_paths::config_file()
}

/// Load the config file from its default location. Returns default on any error.
pub fn load_config() -> Config {
    load_config_from(&config_path())
}

/// Load and parse the config file at `path`. Returns default on any error.
pub fn load_config_from(path: &Path) -> Config {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read config {:?}: {}", path, e);
            }
            return Config::default();
        }
    };

    // Size guard
    if content.len() > crate::constants::settings::MAX_FILE_SIZE as usize {
        tracing::warn!(
            "Config file too large ({} bytes), using defaults",
            content.len()
        );
        return Config::default();
    }

    match toml::from_str(&content) {
        Ok(cfg) => {
            tracing::debug!("Loaded config from {:?}", path);
            cfg
        }
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}", path, e);
            Config::default()
        }
    }
}

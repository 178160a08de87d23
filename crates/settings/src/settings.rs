//! Configuration system for ttyscreen.
//!
//! Provides compile-time constants, the injectable environment snapshot the
//! detectors read from, and TOML config file support.

pub mod constants;
pub mod env;
pub mod file;

pub use env::Env;
pub use file::{config_path, load_config, load_config_from, Config, OutputStream};

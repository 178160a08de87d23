//! Shared utilities for ttyscreen.

pub mod command;

pub use command::{resolve_executable, CommandRunner, SystemCommands};

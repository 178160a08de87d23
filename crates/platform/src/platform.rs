//! Platform-specific terminal queries.
//!
//! Standard stream handles, the native window-size accessor, raw
//! device-control calls, and the optional curses / readline libraries that
//! are loaded at runtime. Everything that can be missing on a given host is
//! surfaced as a [`Capability`] instead of an error.

mod capability;
mod library;
mod output;

pub mod curses;
pub mod readline;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

pub use capability::Capability;
pub use curses::Curses;
pub use library::{Libraries, SystemLibraries};
pub use output::{Output, StdStream, WindowSize};
pub use readline::LineEditor;

/// Host runtime flavour, fixed at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Runtime {
    /// Unix-like systems with a terminal driver reachable through `ioctl`.
    Posix,
    /// Native Windows console.
    Windows,
    /// Anything else (wasm, embedded); no native terminal access.
    Other,
}

impl Runtime {
    /// The runtime this binary was compiled for.
    pub const fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(unix) {
            Self::Posix
        } else {
            Self::Other
        }
    }

    /// Whether raw device-control requests can be issued.
    pub fn supports_ioctl(self) -> bool {
        self == Self::Posix
    }

    /// Whether the OS exposes a typed window-size accessor for streams.
    pub fn has_native_console(self) -> bool {
        matches!(self, Self::Posix | Self::Windows)
    }

    /// Whether `PATHEXT` extensions take part in command lookup.
    pub fn uses_path_ext(self) -> bool {
        self == Self::Windows
    }
}

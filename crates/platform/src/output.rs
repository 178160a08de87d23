//! The stream whose terminal is being measured.

use std::io::{self, IsTerminal};

/// Rows and columns as reported by the OS, before any validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
}

impl WindowSize {
    pub fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

/// A stream handle the detectors can interrogate. Probes only read from it.
pub trait Output: Send + Sync {
    /// Whether the stream is attached to an interactive terminal.
    fn is_tty(&self) -> bool;

    /// OS file descriptor of the stream, when it has one.
    fn descriptor(&self) -> Option<i32> {
        None
    }

    /// The native window-size accessor. `None` when the stream has none.
    fn window_size(&self) -> Option<io::Result<WindowSize>> {
        None
    }

    /// Issue the raw device-control `request`, letting the driver fill `buf`.
    ///
    /// Returns the call's (non-negative) return value.
    fn ioctl(&self, request: u64, buf: &mut [u8; 8]) -> io::Result<i32> {
        let _ = (request, buf);
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }
}

/// One of the process's standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StdStream {
    Stdin,
    Stdout,
    #[default]
    Stderr,
}

impl StdStream {
    /// File descriptor number of the stream.
    #[cfg(unix)]
    pub fn fd(self) -> std::os::unix::io::RawFd {
        match self {
            Self::Stdin => libc::STDIN_FILENO,
            Self::Stdout => libc::STDOUT_FILENO,
            Self::Stderr => libc::STDERR_FILENO,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Stdin => "stdin",
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl Output for StdStream {
    fn is_tty(&self) -> bool {
        match self {
            Self::Stdin => io::stdin().is_terminal(),
            Self::Stdout => io::stdout().is_terminal(),
            Self::Stderr => io::stderr().is_terminal(),
        }
    }

    #[cfg(unix)]
    fn descriptor(&self) -> Option<i32> {
        Some(self.fd())
    }

    #[cfg(unix)]
    fn window_size(&self) -> Option<io::Result<WindowSize>> {
        Some(crate::unix::window_size(self.fd()))
    }

    #[cfg(windows)]
    fn window_size(&self) -> Option<io::Result<WindowSize>> {
        Some(crate::windows::window_size(*self))
    }

    #[cfg(unix)]
    fn ioctl(&self, request: u64, buf: &mut [u8; 8]) -> io::Result<i32> {
        crate::unix::ioctl(self.fd(), request, buf)
    }
}

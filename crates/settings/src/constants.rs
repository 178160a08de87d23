//! Centralized constants for ttyscreen.
//!
//! Organized by the concern that reads them.

/// Fallback terminal geometry.
pub mod size {
    /// Rows reported when every strategy declines.
    pub const DEFAULT_ROWS: u16 = 27;
    /// Columns reported when every strategy declines.
    pub const DEFAULT_COLS: u16 = 80;
}

/// Environment variable names consulted by the detectors.
pub mod vars {
    pub const COLUMNS: &str = "COLUMNS";
    pub const LINES: &str = "LINES";
    /// Fallback for `LINES` on some shells.
    pub const ROWS: &str = "ROWS";
    /// Set by the ANSICON console wrapper on Windows, e.g. `80x300 (80x25)`.
    pub const ANSICON: &str = "ANSICON";
    pub const TERM: &str = "TERM";
    pub const COLORTERM: &str = "COLORTERM";
    pub const PATH: &str = "PATH";
    pub const PATHEXT: &str = "PATHEXT";
}

/// External commands and their arguments.
pub mod commands {
    pub const TPUT: &str = "tput";
    pub const STTY: &str = "stty";
}

/// Raw "get window size" device-control codes.
pub mod ioctl {
    /// Linux and most POSIX systems.
    pub const TIOCGWINSZ: u64 = 0x5413;
    /// BSD-derived systems and PowerPC Linux.
    pub const TIOCGWINSZ_PPC: u64 = 0x4008_7468;
    /// Solaris.
    pub const TIOCGWINSZ_SOL: u64 = 0x5468;

    /// Every code in the order they are tried.
    pub const WINDOW_SIZE_CODES: [u64; 3] = [TIOCGWINSZ, TIOCGWINSZ_PPC, TIOCGWINSZ_SOL];
}

/// Settings file validation limits.
pub mod settings {
    /// Maximum settings file size in bytes (16 KB).
    pub const MAX_FILE_SIZE: u64 = 16 * 1024;
}

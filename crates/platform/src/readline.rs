//! Line-editing library screen-size query.
//!
//! GNU readline (or libedit's compatible shim) keeps its own idea of the
//! screen size. It is only consulted when the host process already has the
//! library loaded.

use std::io;

use crate::{Capability, WindowSize};

/// A loaded line-editing library.
pub trait LineEditor {
    /// Screen size as the library sees it.
    ///
    /// An `Unsupported` error means the library has no such query.
    fn screen_size(&self) -> io::Result<WindowSize>;
}

/// Shared objects providing `rl_get_screen_size`, most specific first.
pub(crate) const LIBRARY_NAMES: &[&str] = &[
    "libreadline.so.8",
    "libreadline.so.7",
    "libreadline.so",
    "libedit.so.2",
    "libreadline.8.dylib",
    "libreadline.dylib",
    "libedit.3.dylib",
];

const GET_SCREEN_SIZE: &[u8] = b"rl_get_screen_size\0";

type GetScreenSize = unsafe extern "C" fn(*mut std::ffi::c_int, *mut std::ffi::c_int);

/// readline / libedit found among the libraries mapped into this process.
pub struct Readline {
    name: &'static str,
    get_screen_size: GetScreenSize,
    _lib: libloading::Library,
}

impl Readline {
    /// Look for a line-editing library the process has already loaded.
    #[cfg(unix)]
    pub fn find_loaded() -> Capability<Self> {
        let Some((name, lib)) = crate::library::open_first(LIBRARY_NAMES, true) else {
            return Capability::unavailable("no readline library loaded");
        };

        // SAFETY: the symbol type matches readline's
        // `void rl_get_screen_size(int *rows, int *cols)`.
        let get_screen_size = match unsafe { lib.get::<GetScreenSize>(GET_SCREEN_SIZE) } {
            Ok(symbol) => *symbol,
            Err(_) => {
                return Capability::unavailable(format!("{} has no rl_get_screen_size", name))
            }
        };

        Capability::Available(Self {
            name,
            get_screen_size,
            _lib: lib,
        })
    }

    #[cfg(not(unix))]
    pub fn find_loaded() -> Capability<Self> {
        Capability::unavailable("no readline library loaded")
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl LineEditor for Readline {
    fn screen_size(&self) -> io::Result<WindowSize> {
        let (mut rows, mut cols): (std::ffi::c_int, std::ffi::c_int) = (0, 0);
        // SAFETY: the library stays loaded for as long as `self` lives, and
        // both pointers refer to live stack slots.
        unsafe { (self.get_screen_size)(&mut rows, &mut cols) };
        Ok(WindowSize::new(clamp(rows), clamp(cols)))
    }
}

fn clamp(value: std::ffi::c_int) -> u16 {
    u16::try_from(value).unwrap_or(0)
}

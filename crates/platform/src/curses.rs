//! Curses color query.
//!
//! Only the terminfo layer of ncurses is used: `setupterm` loads the
//! terminal description, `has_colors` reads it, and the description is freed
//! again in `close_screen`. The screen itself is never taken over.

use std::ffi::{c_char, c_int, c_uchar, c_void, CString};
use std::io;

#[cfg(unix)]
use anyhow::Context as _;

use crate::Capability;

/// A curses implementation able to report color support.
///
/// Callers must pair every `init_screen` with `close_screen`, also when
/// `init_screen` or `has_colors` fail.
pub trait Curses {
    /// Set up the screen context for the terminal type `term` on descriptor
    /// `fd` (standard output when `None`).
    fn init_screen(&mut self, term: &str, fd: Option<c_int>) -> io::Result<()>;

    fn has_colors(&mut self) -> io::Result<bool>;

    /// Tear the screen context down. Safe to call when none is active.
    fn close_screen(&mut self);
}

/// Candidate ncurses builds, wide-character variants first.
pub(crate) const LIBRARY_NAMES: &[&str] = &[
    "libncursesw.so.6",
    "libncurses.so.6",
    "libncursesw.so.5",
    "libncurses.so.5",
    "libncursesw.so",
    "libncurses.so",
    "libncurses.dylib",
    "libncursesw.dylib",
];

const OK: c_int = 0;
const STDOUT: c_int = 1;

type SetupTerm = unsafe extern "C" fn(*const c_char, c_int, *mut c_int) -> c_int;
// ncurses' `bool` is an unsigned char.
type HasColors = unsafe extern "C" fn() -> c_uchar;
type SetCurTerm = unsafe extern "C" fn(*mut c_void) -> *mut c_void;
type DelCurTerm = unsafe extern "C" fn(*mut c_void) -> c_int;

/// ncurses loaded with the dynamic loader.
pub struct Ncurses {
    name: &'static str,
    setupterm: SetupTerm,
    has_colors: HasColors,
    set_curterm: SetCurTerm,
    del_curterm: DelCurTerm,
    active: bool,
    _lib: libloading::Library,
}

impl Ncurses {
    /// Load the first ncurses build the dynamic loader can find.
    #[cfg(unix)]
    pub fn load() -> Capability<Self> {
        let Some((name, lib)) = crate::library::open_first(LIBRARY_NAMES, false) else {
            return Capability::unavailable("no native curses support");
        };

        match Self::resolve(name, lib) {
            Ok(curses) => Capability::Available(curses),
            Err(e) => Capability::Failed(e),
        }
    }

    #[cfg(not(unix))]
    pub fn load() -> Capability<Self> {
        Capability::unavailable("no native curses support")
    }

    #[cfg(unix)]
    fn resolve(name: &'static str, lib: libloading::Library) -> anyhow::Result<Self> {
        // SAFETY: each type matches the ncurses prototype of the same name.
        let (setupterm, has_colors, set_curterm, del_curterm) = unsafe {
            (
                *lib.get::<SetupTerm>(b"setupterm\0")
                    .with_context(|| format!("{} has no setupterm", name))?,
                *lib.get::<HasColors>(b"has_colors\0")
                    .with_context(|| format!("{} has no has_colors", name))?,
                *lib.get::<SetCurTerm>(b"set_curterm\0")
                    .with_context(|| format!("{} has no set_curterm", name))?,
                *lib.get::<DelCurTerm>(b"del_curterm\0")
                    .with_context(|| format!("{} has no del_curterm", name))?,
            )
        };

        Ok(Self {
            name,
            setupterm,
            has_colors,
            set_curterm,
            del_curterm,
            active: false,
            _lib: lib,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Curses for Ncurses {
    fn init_screen(&mut self, term: &str, fd: Option<c_int>) -> io::Result<()> {
        let term =
            CString::new(term).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let mut err: c_int = 0;
        // SAFETY: `term` is a NUL-terminated string that outlives the call and
        // `err` is a live stack slot.
        let ret = unsafe { (self.setupterm)(term.as_ptr(), fd.unwrap_or(STDOUT), &mut err) };
        if ret != OK {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("setupterm failed (errret {})", err),
            ));
        }
        self.active = true;
        Ok(())
    }

    fn has_colors(&mut self) -> io::Result<bool> {
        if !self.active {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "has_colors called without a screen",
            ));
        }
        // SAFETY: a terminal description is loaded (checked above).
        Ok(unsafe { (self.has_colors)() } != 0)
    }

    fn close_screen(&mut self) {
        if !self.active {
            return;
        }
        // SAFETY: detach the current terminal and free it; the pointer came
        // from ncurses itself.
        unsafe {
            let term = (self.set_curterm)(std::ptr::null_mut());
            if !term.is_null() {
                (self.del_curterm)(term);
            }
        }
        self.active = false;
    }
}

impl Drop for Ncurses {
    fn drop(&mut self) {
        self.close_screen();
    }
}

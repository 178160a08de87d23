//! Runtime loading of optional native libraries.

use crate::curses::Curses;
use crate::readline::LineEditor;
use crate::{Capability, Runtime};

/// Source of the optional native capabilities the probes depend on.
///
/// [`SystemLibraries`] loads the real ones; tests substitute fakes.
pub trait Libraries: Send + Sync {
    /// The typed window-size accessor for the output stream.
    fn native_console(&self) -> Capability<()>;

    /// A line-editing library already loaded into this process.
    fn line_editor(&self) -> Capability<Box<dyn LineEditor>>;

    /// A curses implementation able to answer "has colors".
    fn curses(&self) -> Capability<Box<dyn Curses>>;
}

/// Loads capabilities from the host system.
#[derive(Debug, Clone, Copy)]
pub struct SystemLibraries {
    runtime: Runtime,
}

impl SystemLibraries {
    pub fn new(runtime: Runtime) -> Self {
        Self { runtime }
    }
}

impl Default for SystemLibraries {
    fn default() -> Self {
        Self::new(Runtime::current())
    }
}

impl Libraries for SystemLibraries {
    fn native_console(&self) -> Capability<()> {
        if self.runtime.has_native_console() {
            Capability::Available(())
        } else {
            Capability::unavailable("no native console support")
        }
    }

    fn line_editor(&self) -> Capability<Box<dyn LineEditor>> {
        crate::readline::Readline::find_loaded().map(|r| {
            tracing::debug!(library = r.name(), "line editor loaded");
            Box::new(r) as Box<dyn LineEditor>
        })
    }

    fn curses(&self) -> Capability<Box<dyn Curses>> {
        crate::curses::Ncurses::load().map(|c| {
            tracing::debug!(library = c.name(), "curses loaded");
            Box::new(c) as Box<dyn Curses>
        })
    }
}

/// Open the first library in `names` that the dynamic loader accepts.
///
/// With `already_loaded` set, only libraries that are mapped into the
/// process already are considered; nothing new is loaded.
#[cfg(unix)]
pub(crate) fn open_first(
    names: &'static [&'static str],
    already_loaded: bool,
) -> Option<(&'static str, libloading::Library)> {
    let mut flags = libc::RTLD_LAZY | libc::RTLD_LOCAL;
    if already_loaded {
        flags |= libc::RTLD_NOLOAD;
    }

    names.iter().copied().find_map(|name| {
        // SAFETY: the candidates are well-known C libraries whose
        // initializers have no preconditions.
        match unsafe { libloading::os::unix::Library::open(Some(name), flags) } {
            Ok(lib) => {
                tracing::trace!(library = name, "opened");
                Some((name, libloading::Library::from(lib)))
            }
            Err(e) => {
                tracing::trace!(library = name, "not opened: {}", e);
                None
            }
        }
    })
}

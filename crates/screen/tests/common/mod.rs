//! Shared helpers for the detection integration tests.

// Not every test file uses every helper.
#![allow(dead_code)]

use std::path::Path;

use platform::{Capability, Curses, Libraries, LineEditor, Output, Runtime};
use screen::{Context, ContextBuilder};
use settings::Env;

pub use tempfile::{tempdir, TempDir};

// ============================================================================
// Streams and libraries
// ============================================================================

/// Output stream that claims to be a terminal but offers no native queries.
pub struct FakeTty;

impl Output for FakeTty {
    fn is_tty(&self) -> bool {
        true
    }
}

/// Output stream redirected to a pipe or file.
pub struct FakePipe;

impl Output for FakePipe {
    fn is_tty(&self) -> bool {
        false
    }
}

/// A host without curses, readline or a native console accessor.
pub struct NoLibraries;

impl Libraries for NoLibraries {
    fn native_console(&self) -> Capability<()> {
        Capability::unavailable("no native console support")
    }

    fn line_editor(&self) -> Capability<Box<dyn LineEditor>> {
        Capability::unavailable("no readline library loaded")
    }

    fn curses(&self) -> Capability<Box<dyn Curses>> {
        Capability::unavailable("no native curses support")
    }
}

/// Context with no native capabilities, an empty `PATH`, and `env` on top.
pub fn isolated(output: impl Output + 'static, env: Env) -> ContextBuilder {
    Context::builder()
        .output(output)
        .env(env)
        .libraries(NoLibraries)
        .runtime(Runtime::Posix)
}

// ============================================================================
// Fake executables
// ============================================================================

/// Write an executable shell script named `name` into `dir`.
#[cfg(unix)]
pub fn fake_bin(dir: &Path, name: &str, script: &str) {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", script)).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("stat script").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
}

/// Fake `tput` answering `lines`, `cols` and `colors`.
#[cfg(unix)]
pub fn fake_tput(dir: &Path, lines: &str, cols: &str, colors: &str) {
    fake_bin(
        dir,
        "tput",
        &format!(
            "case \"$1\" in\n  lines) echo {};;\n  cols) echo {};;\n  colors) echo {};;\nesac",
            lines, cols, colors
        ),
    );
}

/// Environment whose `PATH` is only `dir`.
pub fn path_env(dir: &Path) -> Env {
    Env::empty().with("PATH", dir.to_string_lossy())
}

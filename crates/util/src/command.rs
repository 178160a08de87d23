//! External command lookup and invocation.
//!
//! Resolution walks the injected `PATH` (plus `PATHEXT` extensions on
//! Windows) and only spawns a process once a regular file is found. The
//! child sees the injected environment, not the one of this process.
//! Invocation errors are returned to the caller untouched.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use settings::constants::vars;
use settings::Env;

/// Locates and runs external programs.
pub trait CommandRunner: Send + Sync {
    /// Full path of `name` on the search path, if any.
    fn which(&self, name: &str) -> Option<PathBuf>;

    fn command_exists(&self, name: &str) -> bool {
        self.which(name).is_some()
    }

    /// Run `name` with `args`, capturing stdout and discarding stderr.
    ///
    /// Returns `Ok(None)` without spawning anything when `name` cannot be
    /// resolved.
    fn run(&self, name: &str, args: &[&str]) -> io::Result<Option<String>>;
}

/// Runs real processes in an [`Env`], resolving executables against it.
#[derive(Debug, Clone)]
pub struct SystemCommands {
    env: Env,
    path: String,
    path_ext: Option<String>,
}

impl SystemCommands {
    /// Read `PATH` (and on Windows `PATHEXT`) from `env`.
    pub fn new(env: &Env) -> Self {
        Self::with_path_extensions(env, cfg!(windows))
    }

    /// Like [`SystemCommands::new`], choosing explicitly whether `PATHEXT`
    /// extensions are tried.
    pub fn with_path_extensions(env: &Env, use_path_ext: bool) -> Self {
        Self {
            env: env.clone(),
            path: env.fetch(vars::PATH, "").to_string(),
            path_ext: use_path_ext.then(|| env.fetch(vars::PATHEXT, "").to_string()),
        }
    }
}

impl CommandRunner for SystemCommands {
    fn which(&self, name: &str) -> Option<PathBuf> {
        resolve_executable(name, &self.path, self.path_ext.as_deref())
    }

    fn run(&self, name: &str, args: &[&str]) -> io::Result<Option<String>> {
        let Some(program) = self.which(name) else {
            tracing::trace!(command = name, "not found on PATH");
            return Ok(None);
        };

        tracing::trace!(command = ?program, ?args, "running");
        let output = Command::new(&program)
            .args(args)
            .env_clear()
            .envs(self.env.iter())
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()?;

        Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
    }
}

/// Search `path` (a platform path list) for a regular file called `name`.
///
/// When `path_ext` is given, each `;`-separated extension in it is also
/// tried after the bare name.
pub fn resolve_executable(name: &str, path: &str, path_ext: Option<&str>) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    let extensions: Vec<&str> = path_ext
        .map(|exts| exts.split(';').filter(|e| !e.is_empty()).collect())
        .unwrap_or_default();

    std::env::split_paths(path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .find_map(|dir| {
            let candidate = dir.join(name);
            if is_regular_file(&candidate) {
                return Some(candidate);
            }
            extensions.iter().find_map(|ext| {
                let mut with_ext = candidate.clone().into_os_string();
                with_ext.push(ext);
                let with_ext = PathBuf::from(with_ext);
                is_regular_file(&with_ext).then_some(with_ext)
            })
        })
}

fn is_regular_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}

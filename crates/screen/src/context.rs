//! Everything a probe is allowed to look at.
//!
//! A [`Context`] is built once per detector and never changes afterwards.
//! All platform access goes through it so tests can swap any part out.

use std::fmt;
use std::io;
use std::sync::Arc;

use platform::{Capability, Libraries, Output, Runtime, StdStream, SystemLibraries};
use settings::Env;
use util::{CommandRunner, SystemCommands};

/// Receives the one-line diagnostics printed in verbose mode.
pub type WarnSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Immutable detector configuration shared by every probe.
#[derive(Clone)]
pub struct Context {
    output: Arc<dyn Output>,
    env: Env,
    verbose: bool,
    runtime: Runtime,
    commands: Arc<dyn CommandRunner>,
    libraries: Arc<dyn Libraries>,
    warn: WarnSink,
}

impl Context {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    pub fn output(&self) -> &dyn Output {
        self.output.as_ref()
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn runtime(&self) -> Runtime {
        self.runtime
    }

    pub fn commands(&self) -> &dyn CommandRunner {
        self.commands.as_ref()
    }

    pub fn libraries(&self) -> &dyn Libraries {
        self.libraries.as_ref()
    }

    /// Unwrap a capability, reporting why it is missing.
    ///
    /// Verbose mode prints the reason as a single line to stderr.
    pub(crate) fn require<T>(&self, probe: &'static str, capability: Capability<T>) -> Option<T> {
        let reason = match capability {
            Capability::Available(value) => return Some(value),
            Capability::Unavailable(reason) => reason,
            Capability::Failed(err) => format!("{:#}", err),
        };

        if self.verbose {
            tracing::info!(probe, "{}", reason);
            (self.warn)(&reason);
        } else {
            tracing::debug!(probe, "capability unavailable: {}", reason);
        }
        None
    }

    /// Run an external command for `probe`, absorbing every failure.
    ///
    /// `None` covers both "not installed" and invocation errors.
    pub(crate) fn capture(&self, probe: &'static str, command: &str, args: &[&str]) -> Option<String> {
        match self.commands.run(command, args) {
            Ok(Some(output)) => Some(output),
            Ok(None) => {
                tracing::trace!(probe, command, "command not found");
                None
            }
            Err(e) => {
                log_io_error(probe, command, &e);
                None
            }
        }
    }
}

fn log_io_error(probe: &'static str, command: &str, err: &io::Error) {
    tracing::debug!(probe, command, "command failed: {}", err);
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("env", &self.env)
            .field("verbose", &self.verbose)
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Context`]. Anything left unset uses the real system.
#[derive(Default)]
pub struct ContextBuilder {
    output: Option<Arc<dyn Output>>,
    env: Option<Env>,
    verbose: bool,
    runtime: Option<Runtime>,
    commands: Option<Arc<dyn CommandRunner>>,
    libraries: Option<Arc<dyn Libraries>>,
    warn: Option<WarnSink>,
}

impl ContextBuilder {
    /// Stream to probe. Defaults to stderr.
    pub fn output(mut self, output: impl Output + 'static) -> Self {
        self.output = Some(Arc::new(output));
        self
    }

    pub fn shared_output(mut self, output: Arc<dyn Output>) -> Self {
        self.output = Some(output);
        self
    }

    /// Environment to read. Defaults to a snapshot of the process environment.
    pub fn env(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn runtime(mut self, runtime: Runtime) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn commands(mut self, commands: impl CommandRunner + 'static) -> Self {
        self.commands = Some(Arc::new(commands));
        self
    }

    pub fn shared_commands(mut self, commands: Arc<dyn CommandRunner>) -> Self {
        self.commands = Some(commands);
        self
    }

    pub fn libraries(mut self, libraries: impl Libraries + 'static) -> Self {
        self.libraries = Some(Arc::new(libraries));
        self
    }

    /// Where verbose diagnostics go. Defaults to stderr.
    pub fn warn_with(mut self, sink: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.warn = Some(Arc::new(sink));
        self
    }

    pub fn build(self) -> Context {
        let runtime = self.runtime.unwrap_or_else(Runtime::current);
        let env = self.env.unwrap_or_else(Env::from_process);
        let commands = self.commands.unwrap_or_else(|| {
            Arc::new(SystemCommands::with_path_extensions(
                &env,
                runtime.uses_path_ext(),
            ))
        });

        Context {
            output: self
                .output
                .unwrap_or_else(|| Arc::new(StdStream::default())),
            env,
            verbose: self.verbose,
            runtime,
            commands,
            libraries: self
                .libraries
                .unwrap_or_else(|| Arc::new(SystemLibraries::new(runtime))),
            warn: self
                .warn
                .unwrap_or_else(|| Arc::new(|line: &str| eprintln!("{}", line))),
        }
    }
}

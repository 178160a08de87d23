//! Fakes for every seam of [`Context`](crate::Context).

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use platform::{Capability, Curses, Libraries, LineEditor, Output, WindowSize};
use util::CommandRunner;

/// Scriptable output stream.
#[derive(Default)]
pub(crate) struct FakeOutput {
    tty: bool,
    descriptor: Option<i32>,
    window: Option<Result<WindowSize, io::ErrorKind>>,
    ioctl: HashMap<u64, (i32, [u8; 8])>,
    ioctl_calls: Mutex<Vec<u64>>,
}

impl FakeOutput {
    pub(crate) fn pipe() -> Self {
        Self::default()
    }

    pub(crate) fn tty() -> Self {
        Self {
            tty: true,
            ..Self::default()
        }
    }

    pub(crate) fn with_descriptor(mut self, fd: i32) -> Self {
        self.descriptor = Some(fd);
        self
    }

    pub(crate) fn with_window_size(mut self, rows: u16, cols: u16) -> Self {
        self.window = Some(Ok(WindowSize::new(rows, cols)));
        self
    }

    pub(crate) fn with_window_error(mut self, kind: io::ErrorKind) -> Self {
        self.window = Some(Err(kind));
        self
    }

    /// Answer `request` with return value `ret`, writing `buf`.
    pub(crate) fn with_ioctl(mut self, request: u64, ret: i32, buf: [u8; 8]) -> Self {
        self.ioctl.insert(request, (ret, buf));
        self
    }

    pub(crate) fn ioctl_calls(&self) -> Vec<u64> {
        self.ioctl_calls.lock().unwrap().clone()
    }
}

impl Output for FakeOutput {
    fn is_tty(&self) -> bool {
        self.tty
    }

    fn descriptor(&self) -> Option<i32> {
        self.descriptor
    }

    fn window_size(&self) -> Option<io::Result<WindowSize>> {
        self.window.map(|r| r.map_err(io::Error::from))
    }

    fn ioctl(&self, request: u64, buf: &mut [u8; 8]) -> io::Result<i32> {
        self.ioctl_calls.lock().unwrap().push(request);
        match self.ioctl.get(&request) {
            Some((ret, data)) => {
                *buf = *data;
                Ok(*ret)
            }
            None => Err(io::Error::from(io::ErrorKind::InvalidInput)),
        }
    }
}

/// Scriptable command runner recording every invocation.
#[derive(Default)]
pub(crate) struct FakeCommands {
    installed: HashSet<String>,
    responses: HashMap<String, Result<Option<String>, io::ErrorKind>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCommands {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn key(command: &str, args: &[&str]) -> String {
        std::iter::once(command)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub(crate) fn returning(mut self, command: &str, args: &[&str], output: &str) -> Self {
        self.installed.insert(command.to_string());
        self.responses
            .insert(Self::key(command, args), Ok(Some(output.to_string())));
        self
    }

    /// The command resolves, but the invocation produces no output at all.
    pub(crate) fn silent(mut self, command: &str, args: &[&str]) -> Self {
        self.installed.insert(command.to_string());
        self.responses.insert(Self::key(command, args), Ok(None));
        self
    }

    pub(crate) fn failing(mut self, command: &str, args: &[&str], kind: io::ErrorKind) -> Self {
        self.installed.insert(command.to_string());
        self.responses.insert(Self::key(command, args), Err(kind));
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeCommands {
    fn which(&self, name: &str) -> Option<PathBuf> {
        self.installed
            .contains(name)
            .then(|| PathBuf::from("/usr/bin").join(name))
    }

    fn run(&self, name: &str, args: &[&str]) -> io::Result<Option<String>> {
        if !self.installed.contains(name) {
            return Ok(None);
        }
        let key = Self::key(name, args);
        self.calls.lock().unwrap().push(key.clone());
        match self.responses.get(&key) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(kind)) => Err(io::Error::from(*kind)),
            None => Ok(Some(String::new())),
        }
    }
}

/// Curses double that records the calls made on it.
#[derive(Clone)]
pub(crate) struct FakeCurses {
    init: Result<(), io::ErrorKind>,
    has_colors: Result<bool, io::ErrorKind>,
    events: Arc<Mutex<Vec<&'static str>>>,
    screens: Arc<Mutex<Vec<(String, Option<i32>)>>>,
}

impl FakeCurses {
    pub(crate) fn with_colors(has_colors: bool) -> Self {
        Self {
            init: Ok(()),
            has_colors: Ok(has_colors),
            events: Arc::default(),
            screens: Arc::default(),
        }
    }

    pub(crate) fn failing_has_colors() -> Self {
        Self {
            has_colors: Err(io::ErrorKind::Other),
            ..Self::with_colors(false)
        }
    }

    pub(crate) fn failing_init() -> Self {
        Self {
            init: Err(io::ErrorKind::NotFound),
            ..Self::with_colors(true)
        }
    }

    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    /// `(term, descriptor)` of every `init_screen` call.
    pub(crate) fn screens(&self) -> Vec<(String, Option<i32>)> {
        self.screens.lock().unwrap().clone()
    }
}

impl Curses for FakeCurses {
    fn init_screen(&mut self, term: &str, fd: Option<i32>) -> io::Result<()> {
        self.events.lock().unwrap().push("init_screen");
        self.screens.lock().unwrap().push((term.to_string(), fd));
        self.init.map_err(io::Error::from)
    }

    fn has_colors(&mut self) -> io::Result<bool> {
        self.events.lock().unwrap().push("has_colors");
        self.has_colors.map_err(io::Error::from)
    }

    fn close_screen(&mut self) {
        self.events.lock().unwrap().push("close_screen");
    }
}

struct FakeLineEditor(Result<WindowSize, io::ErrorKind>);

impl LineEditor for FakeLineEditor {
    fn screen_size(&self) -> io::Result<WindowSize> {
        self.0.map_err(io::Error::from)
    }
}

/// Capability source with everything switched off unless enabled.
#[derive(Default)]
pub(crate) struct FakeLibraries {
    native_console: bool,
    line_editor: Option<Result<WindowSize, io::ErrorKind>>,
    curses: Option<FakeCurses>,
}

impl FakeLibraries {
    pub(crate) fn none() -> Self {
        Self::default()
    }

    pub(crate) fn with_native_console(mut self) -> Self {
        self.native_console = true;
        self
    }

    pub(crate) fn with_line_editor(mut self, screen_size: Result<WindowSize, io::ErrorKind>) -> Self {
        self.line_editor = Some(screen_size);
        self
    }

    pub(crate) fn with_curses(mut self, curses: FakeCurses) -> Self {
        self.curses = Some(curses);
        self
    }
}

impl Libraries for FakeLibraries {
    fn native_console(&self) -> Capability<()> {
        if self.native_console {
            Capability::Available(())
        } else {
            Capability::unavailable("no native console support")
        }
    }

    fn line_editor(&self) -> Capability<Box<dyn LineEditor>> {
        match self.line_editor {
            Some(result) => Capability::Available(Box::new(FakeLineEditor(result))),
            None => Capability::unavailable("no readline library loaded"),
        }
    }

    fn curses(&self) -> Capability<Box<dyn Curses>> {
        match &self.curses {
            Some(curses) => Capability::Available(Box::new(curses.clone())),
            None => Capability::unavailable("no native curses support"),
        }
    }
}

/// Collects verbose diagnostics instead of printing them.
#[derive(Clone, Default)]
pub(crate) struct WarnLog(Arc<Mutex<Vec<String>>>);

impl WarnLog {
    pub(crate) fn sink(&self) -> impl Fn(&str) + Send + Sync + 'static {
        let lines = Arc::clone(&self.0);
        move |line: &str| lines.lock().unwrap().push(line.to_string())
    }

    pub(crate) fn lines(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

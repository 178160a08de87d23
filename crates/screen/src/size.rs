//! Terminal size detection.
//!
//! A [`SizeDetector`] walks an ordered list of [`SizeProbe`]s and returns the
//! first valid answer. Each built-in strategy is also exposed as a free
//! function so it can be called on its own.

use std::fmt;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use settings::constants::{commands, ioctl, size, vars};
use settings::Env;

use crate::Context;

/// Terminal dimensions. Both components are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerminalSize {
    rows: u16,
    cols: u16,
}

/// Size reported when nothing else answers and `LINES`/`COLUMNS` are unset.
pub const DEFAULT_SIZE: TerminalSize = TerminalSize {
    rows: size::DEFAULT_ROWS,
    cols: size::DEFAULT_COLS,
};

impl TerminalSize {
    /// `None` unless both components are positive.
    pub fn new(rows: u16, cols: u16) -> Option<Self> {
        (rows > 0 && cols > 0).then_some(Self { rows, cols })
    }

    pub fn rows(self) -> u16 {
        self.rows
    }

    pub fn cols(self) -> u16 {
        self.cols
    }
}

impl From<TerminalSize> for (u16, u16) {
    fn from(size: TerminalSize) -> Self {
        (size.rows, size.cols)
    }
}

impl fmt::Display for TerminalSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.rows, self.cols)
    }
}

/// One way of finding out the terminal size.
#[cfg_attr(test, mockall::automock)]
pub trait SizeProbe {
    /// Stable kebab-case identifier, used in logs and skip lists.
    fn name(&self) -> &'static str;

    /// `None` means "declined"; the next probe gets a turn.
    fn probe(&self, ctx: &Context) -> Option<TerminalSize>;
}

/// The built-in size strategies, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeStrategy {
    NativeConsole,
    Ioctl,
    Readline,
    Tput,
    Stty,
    Env,
    Ansicon,
}

impl SizeStrategy {
    pub const ALL: [SizeStrategy; 7] = [
        Self::NativeConsole,
        Self::Ioctl,
        Self::Readline,
        Self::Tput,
        Self::Stty,
        Self::Env,
        Self::Ansicon,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::NativeConsole => "native-console",
            Self::Ioctl => "ioctl",
            Self::Readline => "readline",
            Self::Tput => "tput",
            Self::Stty => "stty",
            Self::Env => "env",
            Self::Ansicon => "ansicon",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl SizeProbe for SizeStrategy {
    fn name(&self) -> &'static str {
        SizeStrategy::name(*self)
    }

    fn probe(&self, ctx: &Context) -> Option<TerminalSize> {
        match self {
            Self::NativeConsole => from_native_console(ctx),
            Self::Ioctl => from_ioctl(ctx),
            Self::Readline => from_readline(ctx),
            Self::Tput => from_tput(ctx),
            Self::Stty => from_stty(ctx),
            Self::Env => from_env(ctx),
            Self::Ansicon => from_ansicon(ctx),
        }
    }
}

/// Ask the OS for the window size of the output stream.
pub fn from_native_console(ctx: &Context) -> Option<TerminalSize> {
    let probe = SizeStrategy::NativeConsole.name();
    ctx.require(probe, ctx.libraries().native_console())?;
    if !ctx.output().is_tty() {
        return None;
    }

    match ctx.output().window_size()? {
        Ok(ws) => TerminalSize::new(ws.rows, ws.cols),
        Err(e) => {
            tracing::debug!(probe, "window size query failed: {}", e);
            None
        }
    }
}

/// Issue the raw window-size request, trying each known control code.
///
/// The first code the driver accepts decides the outcome.
pub fn from_ioctl(ctx: &Context) -> Option<TerminalSize> {
    let probe = SizeStrategy::Ioctl.name();
    if !ctx.runtime().supports_ioctl() {
        return None;
    }

    let mut buf = [0u8; 8];
    let accepted = ioctl::WINDOW_SIZE_CODES.into_iter().find(|&code| {
        match ctx.output().ioctl(code, &mut buf) {
            Ok(ret) if ret >= 0 => true,
            Ok(ret) => {
                tracing::trace!(probe, code, ret, "request rejected");
                false
            }
            Err(e) => {
                tracing::trace!(probe, code, "request failed: {}", e);
                false
            }
        }
    })?;

    let (rows, cols) = decode_winsize(&buf, ByteOrder::NATIVE);
    tracing::trace!(probe, code = accepted, rows, cols, "decoded");
    TerminalSize::new(rows, cols)
}

/// Ask an already loaded line-editing library.
pub fn from_readline(ctx: &Context) -> Option<TerminalSize> {
    let probe = SizeStrategy::Readline.name();
    let editor = ctx.require(probe, ctx.libraries().line_editor())?;

    match editor.screen_size() {
        Ok(ws) => TerminalSize::new(ws.rows, ws.cols),
        Err(e) => {
            tracing::debug!(probe, "screen size query failed: {}", e);
            None
        }
    }
}

/// Run `tput lines` and `tput cols`.
pub fn from_tput(ctx: &Context) -> Option<TerminalSize> {
    let probe = SizeStrategy::Tput.name();
    if !runs_commands(ctx, commands::TPUT) {
        return None;
    }

    let lines = ctx.capture(probe, commands::TPUT, &["lines"])?;
    let cols = ctx.capture(probe, commands::TPUT, &["cols"])?;
    TerminalSize::new(dimension(&lines), dimension(&cols))
}

/// Run `stty size`, which prints `ROWS COLS`.
pub fn from_stty(ctx: &Context) -> Option<TerminalSize> {
    let probe = SizeStrategy::Stty.name();
    if !runs_commands(ctx, commands::STTY) {
        return None;
    }

    let output = ctx.capture(probe, commands::STTY, &["size"])?;
    let mut fields = output.split_whitespace().map(dimension);
    let rows = fields.next().unwrap_or(0);
    let cols = fields.next().unwrap_or(0);
    TerminalSize::new(rows, cols)
}

static COLUMNS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid columns regex"));

static ANSICON_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([0-9]+)x([0-9]+)\)").expect("valid ANSICON regex"));

/// Read `COLUMNS` together with `LINES` (or `ROWS`).
pub fn from_env(ctx: &Context) -> Option<TerminalSize> {
    let env = ctx.env();
    let columns = env.get(vars::COLUMNS).filter(|c| COLUMNS_PATTERN.is_match(c))?;
    let rows = env.get(vars::LINES).or_else(|| env.get(vars::ROWS)).unwrap_or("");
    TerminalSize::new(dimension(rows), dimension(columns))
}

/// Read the `(COLSxROWS)` window size ANSICON exports.
pub fn from_ansicon(ctx: &Context) -> Option<TerminalSize> {
    let caps = ANSICON_PATTERN.captures(ctx.env().get(vars::ANSICON)?)?;
    TerminalSize::new(dimension(&caps[2]), dimension(&caps[1]))
}

/// The compiled-in size, with positive `LINES`/`COLUMNS` taking precedence.
pub fn default_size(env: &Env) -> TerminalSize {
    let positive = |key| env.get(key).map(dimension).filter(|n| *n > 0);
    TerminalSize {
        rows: positive(vars::LINES).unwrap_or(DEFAULT_SIZE.rows),
        cols: positive(vars::COLUMNS).unwrap_or(DEFAULT_SIZE.cols),
    }
}

fn runs_commands(ctx: &Context, command: &str) -> bool {
    ctx.output().is_tty() && ctx.commands().command_exists(command)
}

/// Byte order of the 16-bit fields in a `struct winsize` buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    pub const NATIVE: ByteOrder = if cfg!(target_endian = "big") {
        ByteOrder::Big
    } else {
        ByteOrder::Little
    };
}

/// Decode `(ws_row, ws_col)` from the first two fields of a winsize buffer.
pub fn decode_winsize(buf: &[u8; 8], order: ByteOrder) -> (u16, u16) {
    let field = |i: usize| {
        let bytes = [buf[i], buf[i + 1]];
        match order {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    };
    (field(0), field(2))
}

/// Leading integer of `text`, if it starts with one.
///
/// Leading whitespace and a sign are accepted; anything after the digits is
/// ignored.
pub(crate) fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, rest) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    rest[..digits].parse::<i64>().ok().map(|n| sign * n)
}

/// Like [`leading_int`], reading 0 when there is no integer.
pub(crate) fn parse_leading_int(text: &str) -> i64 {
    leading_int(text).unwrap_or(0)
}

/// A size component parsed from text; 0 when absent or out of range.
fn dimension(text: &str) -> u16 {
    u16::try_from(parse_leading_int(text)).unwrap_or(0)
}

/// Runs the size probes in order and falls back to [`default_size`].
pub struct SizeDetector {
    ctx: Context,
    probes: Vec<Box<dyn SizeProbe>>,
    cache: Option<OnceCell<TerminalSize>>,
}

impl SizeDetector {
    /// Detector running every built-in strategy.
    pub fn new(ctx: Context) -> Self {
        let probes = SizeStrategy::ALL
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn SizeProbe>)
            .collect();
        Self::with_probes(ctx, probes)
    }

    pub fn with_probes(ctx: Context, probes: Vec<Box<dyn SizeProbe>>) -> Self {
        Self {
            ctx,
            probes,
            cache: None,
        }
    }

    /// Remember the first answer for the lifetime of the detector.
    pub fn cached(mut self) -> Self {
        self.cache = Some(OnceCell::new());
        self
    }

    /// Drop the probes whose name is listed.
    pub fn skip<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.probes
            .retain(|p| !names.iter().any(|n| n.as_ref() == p.name()));
        self
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn probe_names(&self) -> Vec<&'static str> {
        self.probes.iter().map(|p| p.name()).collect()
    }

    pub fn size(&self) -> TerminalSize {
        match &self.cache {
            Some(cell) => *cell.get_or_init(|| self.detect()),
            None => self.detect(),
        }
    }

    pub fn rows(&self) -> u16 {
        self.size().rows()
    }

    pub fn height(&self) -> u16 {
        self.rows()
    }

    pub fn cols(&self) -> u16 {
        self.size().cols()
    }

    pub fn width(&self) -> u16 {
        self.cols()
    }

    pub fn columns(&self) -> u16 {
        self.cols()
    }

    fn detect(&self) -> TerminalSize {
        for probe in &self.probes {
            let name = probe.name();
            tracing::trace!(probe = name, "probing size");
            if let Some(size) = probe.probe(&self.ctx) {
                tracing::debug!(probe = name, rows = size.rows, cols = size.cols, "size detected");
                return size;
            }
        }

        let size = default_size(self.ctx.env());
        tracing::debug!(rows = size.rows, cols = size.cols, "every probe declined, using default");
        size
    }
}

impl fmt::Debug for SizeDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeDetector")
            .field("probes", &self.probe_names())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeCommands, FakeLibraries, FakeOutput, WarnLog};
    use crate::ContextBuilder;
    use platform::{Runtime, WindowSize};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::io;
    use std::sync::Arc;
    use test_case::test_case;

    fn base() -> ContextBuilder {
        Context::builder()
            .env(Env::empty())
            .output(FakeOutput::pipe())
            .commands(FakeCommands::new())
            .libraries(FakeLibraries::none())
            .runtime(Runtime::Posix)
    }

    fn env_ctx(pairs: &[(&str, &str)]) -> Context {
        base()
            .env(pairs.iter().map(|&(k, v)| (k, v)).collect())
            .build()
    }

    fn size(rows: u16, cols: u16) -> Option<TerminalSize> {
        TerminalSize::new(rows, cols)
    }

    fn winsize(rows: u16, cols: u16) -> [u8; 8] {
        let mut buf = [0u8; 8];
        let (r, c) = match ByteOrder::NATIVE {
            ByteOrder::Little => (rows.to_le_bytes(), cols.to_le_bytes()),
            ByteOrder::Big => (rows.to_be_bytes(), cols.to_be_bytes()),
        };
        buf[..2].copy_from_slice(&r);
        buf[2..4].copy_from_slice(&c);
        buf
    }

    // ==================== TerminalSize ====================

    #[test_case(0, 80 ; "zero rows")]
    #[test_case(27, 0 ; "zero cols")]
    #[test_case(0, 0 ; "both zero")]
    fn terminal_size_rejects_zero(rows: u16, cols: u16) {
        assert_eq!(TerminalSize::new(rows, cols), None);
    }

    #[test]
    fn terminal_size_accessors() {
        let s = TerminalSize::new(51, 211).unwrap();
        assert_eq!((s.rows(), s.cols()), (51, 211));
        assert_eq!(<(u16, u16)>::from(s), (51, 211));
        assert_eq!(s.to_string(), "51 211");
        assert_eq!(DEFAULT_SIZE.to_string(), "27 80");
    }

    #[test]
    fn strategy_names_round_trip() {
        for strategy in SizeStrategy::ALL {
            assert_eq!(SizeStrategy::from_name(strategy.name()), Some(strategy));
        }
        assert_eq!(SizeStrategy::from_name("jvm"), None);
    }

    // ==================== Parsing ====================

    #[test_case("51\n", 51 ; "trailing newline")]
    #[test_case("  42abc", 42 ; "leading space and garbage")]
    #[test_case("-1", -1 ; "negative")]
    #[test_case("+7", 7 ; "explicit plus")]
    #[test_case("abc", 0 ; "no digits")]
    #[test_case("", 0 ; "empty")]
    fn parses_leading_int(text: &str, expected: i64) {
        assert_eq!(parse_leading_int(text), expected);
    }

    #[test_case("256\n", Some(256) ; "number")]
    #[test_case("-1", Some(-1) ; "negative")]
    #[test_case("", None ; "empty")]
    #[test_case("-", None ; "bare sign")]
    #[test_case("unknown terminal", None ; "words")]
    #[test_case("\u{0662}\u{0665}\u{0666}", None ; "non ascii digits")]
    fn leading_int_requires_digits(text: &str, expected: Option<i64>) {
        assert_eq!(leading_int(text), expected);
    }

    #[test]
    fn dimension_rejects_out_of_range() {
        assert_eq!(dimension("-5"), 0);
        assert_eq!(dimension("70000"), 0);
        assert_eq!(dimension("211"), 211);
    }

    #[test]
    fn decodes_winsize_in_either_byte_order() {
        let little = [51, 0, 211, 0, 0, 0, 0, 0];
        let big = [0, 51, 0, 211, 0, 0, 0, 0];
        assert_eq!(decode_winsize(&little, ByteOrder::Little), (51, 211));
        assert_eq!(decode_winsize(&big, ByteOrder::Big), (51, 211));
    }

    // ==================== Environment ====================

    #[test_case(&[("COLUMNS", "211"), ("LINES", "51")], size(51, 211) ; "columns and lines")]
    #[test_case(&[("COLUMNS", "211"), ("ROWS", "51")], size(51, 211) ; "rows fallback")]
    #[test_case(&[("COLUMNS", "211"), ("LINES", "51"), ("ROWS", "9")], size(51, 211) ; "lines wins over rows")]
    #[test_case(&[("COLUMNS", "0"), ("LINES", "51")], None ; "zero columns")]
    #[test_case(&[("COLUMNS", "21x"), ("LINES", "51")], None ; "non digit columns")]
    #[test_case(&[("COLUMNS", "211")], None ; "no rows")]
    #[test_case(&[("COLUMNS", "\u{0662}\u{0661}\u{0661}"), ("LINES", "51")], None ; "non ascii columns")]
    #[test_case(&[("LINES", "51")], None ; "no columns")]
    fn env_strategy(pairs: &[(&str, &str)], expected: Option<TerminalSize>) {
        assert_eq!(from_env(&env_ctx(pairs)), expected);
    }

    #[test_case("(211x51)", size(51, 211) ; "bare window")]
    #[test_case("80x300 (80x25)", size(25, 80) ; "buffer and window")]
    #[test_case("(0x51)", None ; "zero columns")]
    #[test_case("211x51", None ; "no parentheses")]
    fn ansicon_strategy(value: &str, expected: Option<TerminalSize>) {
        assert_eq!(from_ansicon(&env_ctx(&[("ANSICON", value)])), expected);
    }

    #[test_case(&[], (27, 80) ; "compiled in")]
    #[test_case(&[("LINES", "52"), ("COLUMNS", "200")], (52, 200) ; "both from env")]
    #[test_case(&[("LINES", "52")], (52, 80) ; "lines only")]
    #[test_case(&[("COLUMNS", "200"), ("LINES", "0")], (27, 200) ; "zero lines ignored")]
    #[test_case(&[("COLUMNS", "wide")], (27, 80) ; "garbage ignored")]
    fn default_size_substitutes_each_component(pairs: &[(&str, &str)], expected: (u16, u16)) {
        let env: Env = pairs.iter().map(|&(k, v)| (k, v)).collect();
        assert_eq!(<(u16, u16)>::from(default_size(&env)), expected);
    }

    // ==================== Native console ====================

    #[test]
    fn native_console_reads_window_size() {
        let ctx = base()
            .output(FakeOutput::tty().with_window_size(51, 211))
            .libraries(FakeLibraries::none().with_native_console())
            .build();
        assert_eq!(from_native_console(&ctx), size(51, 211));
    }

    #[test]
    fn native_console_declines_unsupported_operation() {
        let ctx = base()
            .output(FakeOutput::tty().with_window_error(io::ErrorKind::Unsupported))
            .libraries(FakeLibraries::none().with_native_console())
            .build();
        assert_eq!(from_native_console(&ctx), None);
    }

    #[test]
    fn native_console_ignores_non_tty() {
        let ctx = base()
            .output(FakeOutput::pipe().with_window_size(51, 211))
            .libraries(FakeLibraries::none().with_native_console())
            .build();
        assert_eq!(from_native_console(&ctx), None);
    }

    #[test]
    fn native_console_warns_when_verbose_and_missing() {
        let log = WarnLog::default();
        let ctx = base()
            .output(FakeOutput::tty().with_window_size(51, 211))
            .verbose(true)
            .warn_with(log.sink())
            .build();
        assert_eq!(from_native_console(&ctx), None);
        assert_eq!(log.lines(), vec!["no native console support".to_string()]);
    }

    // ==================== ioctl ====================

    #[test]
    fn ioctl_decodes_first_accepted_code() {
        let output = Arc::new(FakeOutput::tty().with_ioctl(0x5413, 0, winsize(51, 211)));
        let ctx = base().shared_output(output.clone()).build();
        assert_eq!(from_ioctl(&ctx), size(51, 211));
        assert_eq!(output.ioctl_calls(), vec![0x5413]);
    }

    #[test]
    fn ioctl_falls_back_to_alternate_codes() {
        let output = Arc::new(
            FakeOutput::tty()
                .with_ioctl(0x5413, -1, [0; 8])
                .with_ioctl(0x5468, 0, winsize(51, 211)),
        );
        let ctx = base().shared_output(output.clone()).build();
        assert_eq!(from_ioctl(&ctx), size(51, 211));
        assert_eq!(output.ioctl_calls(), vec![0x5413, 0x4008_7468, 0x5468]);
    }

    #[test]
    fn ioctl_declines_zero_columns() {
        let ctx = base()
            .output(FakeOutput::tty().with_ioctl(0x5413, 0, winsize(51, 0)))
            .build();
        assert_eq!(from_ioctl(&ctx), None);
    }

    #[test_case(Runtime::Windows ; "windows")]
    #[test_case(Runtime::Other ; "other")]
    fn ioctl_skipped_without_terminal_driver(runtime: Runtime) {
        let output = Arc::new(FakeOutput::tty().with_ioctl(0x5413, 0, winsize(51, 211)));
        let ctx = base().shared_output(output.clone()).runtime(runtime).build();
        assert_eq!(from_ioctl(&ctx), None);
        assert!(output.ioctl_calls().is_empty());
    }

    // ==================== readline ====================

    #[test]
    fn readline_reports_library_size() {
        let ctx = base()
            .libraries(FakeLibraries::none().with_line_editor(Ok(WindowSize::new(51, 211))))
            .build();
        assert_eq!(from_readline(&ctx), size(51, 211));
    }

    #[test]
    fn readline_declines_unimplemented_query() {
        let ctx = base()
            .libraries(FakeLibraries::none().with_line_editor(Err(io::ErrorKind::Unsupported)))
            .build();
        assert_eq!(from_readline(&ctx), None);
    }

    #[test]
    fn readline_absent_is_silent_unless_verbose() {
        let log = WarnLog::default();
        let ctx = base().warn_with(log.sink()).build();
        assert_eq!(from_readline(&ctx), None);
        assert!(log.lines().is_empty());
    }

    // ==================== External commands ====================

    #[test]
    fn tput_runs_lines_then_cols() {
        let commands = Arc::new(
            FakeCommands::new()
                .returning("tput", &["lines"], "51\n")
                .returning("tput", &["cols"], "211\n"),
        );
        let ctx = base()
            .output(FakeOutput::tty())
            .shared_commands(commands.clone())
            .build();
        assert_eq!(from_tput(&ctx), size(51, 211));
        assert_eq!(commands.calls(), vec!["tput lines", "tput cols"]);
    }

    #[test]
    fn tput_without_lines_output_skips_cols() {
        let commands = Arc::new(FakeCommands::new().silent("tput", &["lines"]));
        let ctx = base()
            .output(FakeOutput::tty())
            .shared_commands(commands.clone())
            .build();
        assert_eq!(from_tput(&ctx), None);
        assert_eq!(commands.calls(), vec!["tput lines"]);
    }

    #[test]
    fn tput_zero_lines_still_queries_cols() {
        let commands = Arc::new(
            FakeCommands::new()
                .returning("tput", &["lines"], "0\n")
                .returning("tput", &["cols"], "211\n"),
        );
        let ctx = base()
            .output(FakeOutput::tty())
            .shared_commands(commands.clone())
            .build();
        assert_eq!(from_tput(&ctx), None);
        assert_eq!(commands.calls(), vec!["tput lines", "tput cols"]);
    }

    #[test]
    fn tput_invocation_error_declines() {
        let commands = FakeCommands::new()
            .returning("tput", &["lines"], "51\n")
            .failing("tput", &["cols"], io::ErrorKind::NotFound);
        let ctx = base().output(FakeOutput::tty()).commands(commands).build();
        assert_eq!(from_tput(&ctx), None);
    }

    #[test]
    fn commands_not_run_for_pipes() {
        let commands = Arc::new(
            FakeCommands::new()
                .returning("tput", &["lines"], "51")
                .returning("stty", &["size"], "51 211"),
        );
        let ctx = base().shared_commands(commands.clone()).build();
        assert_eq!(from_tput(&ctx), None);
        assert_eq!(from_stty(&ctx), None);
        assert!(commands.calls().is_empty());
    }

    #[test_case("51 211\n", size(51, 211) ; "rows and cols")]
    #[test_case("51 0\n", None ; "zero cols")]
    #[test_case("51\n", None ; "missing cols")]
    #[test_case("", None ; "empty output")]
    fn stty_parses_size(output: &str, expected: Option<TerminalSize>) {
        let commands = FakeCommands::new().returning("stty", &["size"], output);
        let ctx = base().output(FakeOutput::tty()).commands(commands).build();
        assert_eq!(from_stty(&ctx), expected);
    }

    #[test]
    fn stty_missing_declines() {
        let ctx = base().output(FakeOutput::tty()).build();
        assert_eq!(from_stty(&ctx), None);
    }

    // ==================== Detector ====================

    fn mock(name: &'static str, result: Option<TerminalSize>, times: usize) -> Box<dyn SizeProbe> {
        let mut probe = MockSizeProbe::new();
        probe.expect_name().return_const(name);
        probe.expect_probe().times(times).return_const(result);
        Box::new(probe)
    }

    #[test]
    fn first_valid_answer_wins_and_later_probes_are_skipped() {
        let detector = SizeDetector::with_probes(
            base().build(),
            vec![
                mock("first", None, 1),
                mock("second", size(51, 211), 1),
                mock("third", size(10, 10), 0),
            ],
        );
        assert_eq!(detector.size(), size(51, 211).unwrap());
    }

    #[test]
    fn all_declining_falls_back_to_env_default() {
        let ctx = base()
            .env(Env::empty().with("LINES", "52").with("COLUMNS", "200"))
            .build();
        let detector = SizeDetector::with_probes(ctx, vec![mock("only", None, 1)]);
        assert_eq!((detector.rows(), detector.cols()), (52, 200));
    }

    #[test]
    fn full_chain_without_a_terminal_uses_env() {
        let detector = SizeDetector::new(env_ctx(&[("COLUMNS", "211"), ("LINES", "51")]));
        assert_eq!(detector.size(), size(51, 211).unwrap());
        assert_eq!(detector.height(), 51);
        assert_eq!(detector.width(), 211);
        assert_eq!(detector.columns(), 211);
    }

    #[test]
    fn full_chain_defaults_to_27_by_80() {
        assert_eq!(SizeDetector::new(base().build()).size(), DEFAULT_SIZE);
    }

    #[test]
    fn cached_detector_probes_once() {
        let detector =
            SizeDetector::with_probes(base().build(), vec![mock("once", size(51, 211), 1)]).cached();
        assert_eq!(detector.size(), detector.size());
    }

    #[test]
    fn uncached_detector_is_idempotent() {
        let detector = SizeDetector::new(env_ctx(&[("ANSICON", "(211x51)")]));
        let first = detector.size();
        assert_eq!(detector.size(), first);
        assert_eq!(first, size(51, 211).unwrap());
    }

    #[test]
    fn skip_removes_named_strategies() {
        let detector = SizeDetector::new(env_ctx(&[("COLUMNS", "211"), ("LINES", "51")]))
            .skip(&["env", "readline"]);
        assert_eq!(
            detector.probe_names(),
            vec!["native-console", "ioctl", "tput", "stty", "ansicon"]
        );
        // Only the default is left to read LINES/COLUMNS.
        assert_eq!(detector.size(), size(51, 211).unwrap());
    }

    // ==================== Property-Based Tests ====================

    proptest! {
        /// No strategy ever reports a zero column count.
        #[test]
        fn prop_env_never_reports_zero_columns(columns in "[0-9]{0,6}", lines in "[0-9 a-z-]{0,6}") {
            let ctx = env_ctx(&[("COLUMNS", columns.as_str()), ("LINES", lines.as_str())]);
            if let Some(size) = from_env(&ctx) {
                prop_assert!(size.cols() > 0);
                prop_assert_eq!(u64::from(size.cols()), columns.parse::<u64>().unwrap());
            }
        }

        #[test]
        fn prop_ioctl_never_reports_zero_columns(bytes in prop::array::uniform8(any::<u8>())) {
            let ctx = base().output(FakeOutput::tty().with_ioctl(0x5413, 0, bytes)).build();
            if let Some(size) = from_ioctl(&ctx) {
                prop_assert!(size.cols() > 0 && size.rows() > 0);
            }
        }
    }
}

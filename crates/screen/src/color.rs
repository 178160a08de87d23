//! Color support detection.
//!
//! Probes answer `Some(true)`, `Some(false)` or `None` (can't tell). The
//! first conclusive answer ends the chain.

use std::fmt;

use once_cell::sync::{Lazy, OnceCell};
use platform::Curses;
use regex::Regex;
use settings::constants::{commands, vars};

use crate::size::leading_int;
use crate::Context;

/// One way of finding out whether the terminal shows colors.
#[cfg_attr(test, mockall::automock)]
pub trait ColorProbe {
    fn name(&self) -> &'static str;

    /// `None` passes the question on to the next probe.
    fn probe(&self, ctx: &Context) -> Option<bool>;
}

/// The built-in color strategies, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorStrategy {
    Curses,
    Tput,
    Term,
    Env,
}

impl ColorStrategy {
    pub const ALL: [ColorStrategy; 4] = [Self::Curses, Self::Tput, Self::Term, Self::Env];

    pub fn name(self) -> &'static str {
        match self {
            Self::Curses => "curses",
            Self::Tput => "tput-colors",
            Self::Term => "term",
            Self::Env => "colorterm",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl ColorProbe for ColorStrategy {
    fn name(&self) -> &'static str {
        ColorStrategy::name(*self)
    }

    fn probe(&self, ctx: &Context) -> Option<bool> {
        match self {
            Self::Curses => from_curses(ctx),
            Self::Tput => from_tput(ctx),
            Self::Term => from_term(ctx),
            Self::Env => from_env(ctx),
        }
    }
}

/// Closes the curses screen however the query ends.
struct ScreenGuard(Box<dyn Curses>);

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        self.0.close_screen();
    }
}

/// Ask curses whether the terminal `$TERM` names has colors.
pub fn from_curses(ctx: &Context) -> Option<bool> {
    let probe = ColorStrategy::Curses.name();
    let curses = ctx.require(probe, ctx.libraries().curses())?;
    let Some(term) = ctx.env().get(vars::TERM) else {
        tracing::debug!(probe, "TERM is not set");
        return None;
    };

    let mut screen = ScreenGuard(curses);
    let fd = ctx.output().descriptor();
    match screen.0.init_screen(term, fd).and_then(|()| screen.0.has_colors()) {
        Ok(has_colors) => Some(has_colors),
        Err(e) => {
            tracing::debug!(probe, "curses query failed: {}", e);
            None
        }
    }
}

/// Run `tput colors`; more than two colors counts as color support.
///
/// Output that does not start with a number (an unknown terminal, for one)
/// leaves the question open.
pub fn from_tput(ctx: &Context) -> Option<bool> {
    let probe = ColorStrategy::Tput.name();
    if !ctx.commands().command_exists(commands::TPUT) {
        return None;
    }

    let output = ctx.capture(probe, commands::TPUT, &["colors"])?;
    match leading_int(&output) {
        Some(colors) => Some(colors > 2),
        None => {
            tracing::debug!(probe, output = output.trim(), "no color count");
            None
        }
    }
}

static TERM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^screen|^xterm|^vt100|color|ansi|cygwin|linux").expect("valid TERM regex")
});

/// Recognize well-known `$TERM` values.
pub fn from_term(ctx: &Context) -> Option<bool> {
    match ctx.env().get(vars::TERM)? {
        "dumb" => Some(false),
        term if TERM_PATTERN.is_match(term) => Some(true),
        _ => None,
    }
}

/// `COLORTERM` being set at all means color. Always conclusive.
pub fn from_env(ctx: &Context) -> Option<bool> {
    Some(ctx.env().contains(vars::COLORTERM))
}

/// Runs the color probes in order. Non-terminals never support color.
pub struct ColorDetector {
    ctx: Context,
    probes: Vec<Box<dyn ColorProbe>>,
    cache: Option<OnceCell<bool>>,
}

impl ColorDetector {
    pub fn new(ctx: Context) -> Self {
        let probes = ColorStrategy::ALL
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn ColorProbe>)
            .collect();
        Self::with_probes(ctx, probes)
    }

    pub fn with_probes(ctx: Context, probes: Vec<Box<dyn ColorProbe>>) -> Self {
        Self {
            ctx,
            probes,
            cache: None,
        }
    }

    pub fn cached(mut self) -> Self {
        self.cache = Some(OnceCell::new());
        self
    }

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

    pub fn supports(&self) -> bool {
        match &self.cache {
            Some(cell) => *cell.get_or_init(|| self.detect()),
            None => self.detect(),
        }
    }

    fn detect(&self) -> bool {
        if !self.ctx.output().is_tty() {
            tracing::debug!("output is not a terminal, no color");
            return false;
        }

        for probe in &self.probes {
            let name = probe.name();
            tracing::trace!(probe = name, "probing color support");
            if let Some(supported) = probe.probe(&self.ctx) {
                tracing::debug!(probe = name, supported, "color support decided");
                return supported;
            }
        }
        false
    }
}

impl fmt::Debug for ColorDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorDetector")
            .field("probes", &self.probe_names())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

//! Terminal size and color support detection.
//!
//! [`Screen`] bundles a [`SizeDetector`] and a [`ColorDetector`] over the
//! same [`Context`]. The free functions build a fresh default `Screen` for
//! every call.
//!
//! Detection never fails: when nothing answers, the size is 27x80 (or
//! whatever positive `LINES`/`COLUMNS` say) and color support is `false`.

mod color;
mod context;
mod size;

#[cfg(test)]
mod test_support;

pub use color::{
    from_curses as color_from_curses, from_env as color_from_env, from_term as color_from_term,
    from_tput as color_from_tput, ColorDetector, ColorProbe, ColorStrategy,
};
pub use context::{Context, ContextBuilder, WarnSink};
pub use size::{
    decode_winsize, default_size, from_ansicon, from_env, from_ioctl, from_native_console,
    from_readline, from_stty, from_tput, ByteOrder, SizeDetector, SizeProbe, SizeStrategy,
    TerminalSize, DEFAULT_SIZE,
};

use platform::StdStream;
use settings::{Config, OutputStream};

/// Size and color queries for one output stream.
#[derive(Debug)]
pub struct Screen {
    size: SizeDetector,
    color: ColorDetector,
}

impl Screen {
    /// Probe standard error using the real process environment.
    pub fn new() -> Self {
        Self::with_context(Context::builder().build())
    }

    pub fn with_context(ctx: Context) -> Self {
        Self {
            size: SizeDetector::new(ctx.clone()),
            color: ColorDetector::new(ctx),
        }
    }

    /// Build from a loaded configuration file.
    pub fn from_config(config: &Config) -> Self {
        let stream = std_stream(config.output);
        tracing::debug!(output = stream.name(), "probing standard stream");
        let ctx = Context::builder()
            .output(stream)
            .verbose(config.verbose)
            .build();
        Self::configured(ctx, config)
    }

    /// Apply the `cache` and `skip` settings of `config` on top of `ctx`.
    ///
    /// `output` and `verbose` are taken from `ctx`, not from `config`.
    pub fn configured(ctx: Context, config: &Config) -> Self {
        let screen = Self::with_context(ctx).skip(&config.skip);
        if config.cache {
            screen.cached()
        } else {
            screen
        }
    }

    pub fn cached(self) -> Self {
        Self {
            size: self.size.cached(),
            color: self.color.cached(),
        }
    }

    /// Leave the named strategies out of both chains.
    pub fn skip<S: AsRef<str>>(self, names: &[S]) -> Self {
        for name in names {
            let name: &str = name.as_ref();
            if !is_strategy(name) {
                tracing::warn!(strategy = name, "unknown strategy in skip list");
            }
        }
        Self {
            size: self.size.skip(names),
            color: self.color.skip(names),
        }
    }

    pub fn size_detector(&self) -> &SizeDetector {
        &self.size
    }

    pub fn color_detector(&self) -> &ColorDetector {
        &self.color
    }

    pub fn size(&self) -> TerminalSize {
        self.size.size()
    }

    pub fn height(&self) -> u16 {
        self.size.height()
    }

    pub fn rows(&self) -> u16 {
        self.size.rows()
    }

    pub fn width(&self) -> u16 {
        self.size.width()
    }

    pub fn columns(&self) -> u16 {
        self.size.columns()
    }

    pub fn supports_color(&self) -> bool {
        self.color.supports()
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `name` identifies a size or color strategy.
pub fn is_strategy(name: &str) -> bool {
    SizeStrategy::from_name(name).is_some() || ColorStrategy::from_name(name).is_some()
}

fn std_stream(output: OutputStream) -> StdStream {
    match output {
        OutputStream::Stdin => StdStream::Stdin,
        OutputStream::Stdout => StdStream::Stdout,
        OutputStream::Stderr => StdStream::Stderr,
    }
}

pub fn size() -> TerminalSize {
    Screen::new().size()
}

pub fn width() -> u16 {
    Screen::new().width()
}

pub fn height() -> u16 {
    Screen::new().height()
}

pub fn supports_color() -> bool {
    Screen::new().supports_color()
}

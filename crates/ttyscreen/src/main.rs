//! ttyscreen - report the size and color support of the attached terminal.
//!
//! Results go to stdout; logs and verbose diagnostics go to stderr.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use platform::Output;
use screen::{default_size, ColorProbe, ColorStrategy, Screen, SizeProbe, SizeStrategy};
use settings::{Config, OutputStream};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "ttyscreen",
    version,
    about = "Report terminal size and color support"
)]
struct Args {
    /// Config file (defaults to ~/.config/ttyscreen/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Stream to measure: stdin, stdout or stderr
    #[arg(long, global = true)]
    output: Option<OutputStream>,

    /// Print a notice when a native capability cannot be loaded
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Memoize results for the lifetime of the process
    #[arg(long, global = true)]
    cache: bool,

    /// Leave a strategy out of the chain (repeatable)
    #[arg(long, global = true, value_name = "STRATEGY")]
    skip: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Print `ROWS COLS`
    Size,
    /// Print the number of columns
    #[command(visible_alias = "columns")]
    Width,
    /// Print the number of rows
    #[command(visible_alias = "rows")]
    Height,
    /// Print `true` or `false`
    Color,
    /// Run every strategy on its own and print what each one reports
    Probes,
}

/// Check if debug mode is enabled via environment variable.
fn is_debug_mode() -> bool {
    std::env::var_os("TTYSCREEN_DEBUG").is_some()
}

/// Initialize the logging system. Everything is written to stderr.
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if is_debug_mode() {
        "ttyscreen=debug,screen=trace,platform=trace,util=trace,settings=debug,warn"
    } else {
        "warn"
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    debug!("ttyscreen v{} starting up", env!("CARGO_PKG_VERSION"));
}

/// Load the config file and apply command-line overrides on top.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => load_explicit(path)?,
        None => settings::load_config(),
    };

    if let Some(output) = args.output {
        config.output = output;
    }
    config.verbose |= args.verbose;
    config.cache |= args.cache;
    config.skip.extend(args.skip.iter().cloned());

    debug!(?config, "resolved configuration");
    Ok(config)
}

/// A config path given on the command line has to exist.
fn load_explicit(path: &Path) -> Result<Config> {
    if !path.is_file() {
        bail!("config file not found: {}", path.display());
    }
    Ok(settings::load_config_from(path))
}

fn run(command: Command, screen: &Screen, out: &mut impl Write) -> io::Result<()> {
    match command {
        Command::Size => writeln!(out, "{}", screen.size()),
        Command::Width => writeln!(out, "{}", screen.width()),
        Command::Height => writeln!(out, "{}", screen.height()),
        Command::Color => writeln!(out, "{}", screen.supports_color()),
        Command::Probes => print_probes(screen, out),
    }
}

/// One line per strategy: chain, name, answer.
fn print_probes(screen: &Screen, out: &mut impl Write) -> io::Result<()> {
    let sizes = screen.size_detector();
    let ctx = sizes.context();
    let enabled = sizes.probe_names();

    writeln!(
        out,
        "output {:<15} {}",
        "tty",
        if ctx.output().is_tty() { "yes" } else { "no" }
    )?;

    for strategy in SizeStrategy::ALL {
        let answer = if enabled.contains(&strategy.name()) {
            strategy
                .probe(ctx)
                .map_or_else(|| "declined".to_string(), |size| size.to_string())
        } else {
            "skipped".to_string()
        };
        writeln!(out, "size   {:<15} {}", strategy.name(), answer)?;
    }
    writeln!(out, "size   {:<15} {}", "default", default_size(ctx.env()))?;

    let colors = screen.color_detector();
    let enabled = colors.probe_names();
    for strategy in ColorStrategy::ALL {
        let answer = if enabled.contains(&strategy.name()) {
            match strategy.probe(colors.context()) {
                Some(supported) => supported.to_string(),
                None => "undetermined".to_string(),
            }
        } else {
            "skipped".to_string()
        };
        writeln!(out, "color  {:<15} {}", strategy.name(), answer)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let config = resolve_config(&args)?;
    let screen = Screen::from_config(&config);

    let stdout = io::stdout();
    run(args.command, &screen, &mut stdout.lock()).context("failed to write to stdout")?;
    Ok(())
}

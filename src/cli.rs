//! Plumbing shared by the three converter binaries: argument parsing with a
//! plain usage line on error, and logging setup.

use clap::error::ErrorKind;
use clap::{ArgAction, Args, Parser};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

#[derive(Args, Debug, Clone, Copy, Default)]
pub struct LogArgs {
    /// Log more (-v for progress, -vv for scanner details); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl LogArgs {
    pub fn level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            _ => LevelFilter::DEBUG,
        }
    }
}

/// Parses the command line into `A`. `--help` and `--version` behave as usual;
/// any other argument error prints `usage` to stdout and exits with status 1.
pub fn parse_or_usage<A: Parser>(usage: &str) -> A {
    match A::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                println!("{}", usage);
                std::process::exit(1)
            }
        },
    }
}

/// Installs a stderr `tracing` subscriber at the level requested by `log`.
pub fn init_tracing(log: &LogArgs) {
    let filter = EnvFilter::builder()
        .with_default_directive(log.level().into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

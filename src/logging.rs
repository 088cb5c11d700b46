//! Logging setup
//!
//! Flags and a one-shot initializer for `tracing`:
//!
//! ```text
//! tool --log-level {CRITICAL,ERROR,WARNING,INFO,DEBUG}
//! tool -vv        # WARNING raised two steps, i.e. DEBUG
//! tool --jsonl    # JSON lines on stderr
//! ```
//!
//! `RUST_LOG`, when set, overrides the computed level filter.

use clap::{value_parser, Arg, ArgAction, ArgMatches, ValueEnum};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::{EnvCommand, FlagGroup};

/// Log level ladder, quietest first
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
#[value(rename_all = "UPPER")]
pub enum LogLevel {
    Critical,
    Error,
    #[default]
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    const LADDER: [LogLevel; 5] = [
        LogLevel::Critical,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    /// Move `steps` rungs toward DEBUG, saturating
    pub fn raised(self, steps: u8) -> LogLevel {
        let index = Self::LADDER.iter().position(|l| *l == self).unwrap_or(0);
        let target = (index + steps as usize).min(Self::LADDER.len() - 1);
        Self::LADDER[target]
    }

    /// `tracing` has no level above ERROR, so CRITICAL shares it
    pub fn directive(self) -> &'static str {
        match self {
            LogLevel::Critical | LogLevel::Error => "error",
            LogLevel::Warning => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

/// Logging options, usually built from parsed flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub verbose: u8,
    pub jsonl: bool,
}

impl LoggingConfig {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            level: matches.get_one::<LogLevel>("log_level").copied().unwrap_or_default(),
            verbose: matches.get_one::<u8>("verbose").copied().unwrap_or(0),
            jsonl: matches.get_one::<bool>("jsonl").copied().unwrap_or(false),
        }
    }

    /// Level after applying verbosity
    ///
    /// `-v` only raises the level while it is still the default; an explicit
    /// `--log-level` wins.
    pub fn effective_level(&self) -> LogLevel {
        if self.level == LogLevel::default() {
            self.level.raised(self.verbose)
        } else {
            self.level
        }
    }
}

/// Add the logging flag group
pub fn configure_parser(command: EnvCommand) -> EnvCommand {
    command.group(
        FlagGroup::new("Logging")
            .arg(
                Arg::new("jsonl")
                    .long("jsonl")
                    .action(ArgAction::SetTrue)
                    .help("Emit JSON logs parsable by tools like logstash"),
            )
            .arg(
                Arg::new("log_level")
                    .long("log-level")
                    .value_name("LEVEL")
                    .value_parser(value_parser!(LogLevel))
                    .ignore_case(true)
                    .default_value("WARNING")
                    .help("Set the logging output level"),
            )
            .arg(
                Arg::new("verbose")
                    .short('v')
                    .long("verbose")
                    .action(ArgAction::Count)
                    .help("Enable verbose logging"),
            ),
    )
}

/// Install the global subscriber on stderr
///
/// Returns `false` if a subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let level = config.effective_level();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.directive()));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.jsonl {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .is_ok()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
            .is_ok()
    };

    if installed {
        debug!(level = ?level, jsonl = config.jsonl, "logging configured");
    }
    installed
}

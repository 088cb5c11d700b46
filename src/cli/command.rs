//! Env-aware command builder
//!
//! Wraps a clap [`Command`] so that every long flag also reads a default
//! from an environment variable derived from the flag name:
//!
//! ```text
//! PURIFIER_CONSUL_HOST=10.0.0.1 purifier
//! # is equivalent to
//! purifier --consul-host 10.0.0.1
//! ```
//!
//! Only clap's public extension points are used: [`Arg::env`] for value and
//! boolean flags, and [`Arg::default_value`] for counted flags.

use std::path::Path;

use clap::builder::FalseyValueParser;
use clap::{Arg, ArgAction, Command};

/// How a flag picks up its environment default
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EnvDefault {
    /// `<PREFIX>_<FLAG>`
    #[default]
    Prefixed,
    /// `<FLAG>` with no prefix
    Unprefixed,
    /// No environment lookup
    Disabled,
}

/// A titled set of flags shown under its own help heading
///
/// Suppressed groups only appear in `--help`, not in `-h`.
#[derive(Debug, Clone)]
pub struct FlagGroup {
    heading: String,
    suppressed: bool,
    args: Vec<(Arg, EnvDefault)>,
}

impl FlagGroup {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            suppressed: false,
            args: Vec::new(),
        }
    }

    pub fn suppressed(mut self, suppressed: bool) -> Self {
        self.suppressed = suppressed;
        self
    }

    pub fn arg(self, arg: Arg) -> Self {
        self.arg_with(arg, EnvDefault::Prefixed)
    }

    pub fn arg_with(mut self, arg: Arg, env: EnvDefault) -> Self {
        self.args.push((arg, env));
        self
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// Builder for a [`Command`] whose flags default from the environment
#[derive(Debug, Clone)]
pub struct EnvCommand {
    command: Command,
    prefix: String,
}

impl EnvCommand {
    /// Create a command named after the file stem of `name`
    ///
    /// The stem, uppercased, becomes the environment prefix. `"purifier.py"`
    /// yields the prefix `PURIFIER_`, and an empty name yields no prefix.
    pub fn new(name: &str) -> Self {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let prefix = normalize_prefix(&stem);
        let program = if stem.is_empty() {
            env!("CARGO_PKG_NAME").to_string()
        } else {
            stem.to_lowercase()
        };

        Self {
            command: Command::new(program),
            prefix,
        }
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.command = self.command.about(about.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.command = self.command.version(version.into());
        self
    }

    /// Environment prefix including the trailing `_`, or empty
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Environment variable name for a long flag
    ///
    /// `--consul-host` becomes `CONSUL_HOST`, prefixed when `use_prefix` is set.
    pub fn env_name(&self, long: &str, use_prefix: bool) -> String {
        let name = long.trim_start_matches('-').to_uppercase().replace('-', "_");
        if use_prefix {
            format!("{}{}", self.prefix, name)
        } else {
            name
        }
    }

    pub fn arg(self, arg: Arg) -> Self {
        self.arg_with(arg, EnvDefault::Prefixed)
    }

    pub fn arg_with(mut self, arg: Arg, env: EnvDefault) -> Self {
        let arg = self.with_env(arg, env);
        self.command = self.command.arg(arg);
        self
    }

    pub fn group(mut self, group: FlagGroup) -> Self {
        let FlagGroup {
            heading,
            suppressed,
            args,
        } = group;
        for (arg, env) in args {
            let arg = arg.help_heading(heading.clone()).hide_short_help(suppressed);
            self = self.arg_with(arg, env);
        }
        self
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn build(self) -> Command {
        self.command
    }

    fn with_env(&self, arg: Arg, env: EnvDefault) -> Arg {
        let long = match arg.get_long() {
            Some(long) => long.to_string(),
            None => return arg,
        };
        // Required flags and flags with a bare-flag value must come from the
        // command line
        if env == EnvDefault::Disabled
            || arg.is_required_set()
            || !format!("{arg:?}").contains("default_missing_vals: []")
            || long.ends_with("help")
            || long.ends_with("version")
        {
            return arg;
        }

        let name = self.env_name(&long, env == EnvDefault::Prefixed);
        match arg.get_action() {
            ArgAction::Count => {
                // clap has no env support for counters, so resolve it eagerly
                match std::env::var(&name).ok().and_then(|v| v.trim().parse::<u8>().ok()) {
                    Some(count) => arg.default_value(count.to_string()),
                    None => arg,
                }
            }
            ArgAction::SetTrue | ArgAction::SetFalse => {
                arg.env(name).value_parser(FalseyValueParser::new())
            }
            ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version => arg,
            _ => arg.env(name),
        }
    }
}

/// Uppercase the prefix and make sure it ends in exactly one `_`
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('_').to_uppercase();
    if trimmed.is_empty() {
        trimmed
    } else {
        format!("{}_", trimmed)
    }
}

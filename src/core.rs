use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgMatches, Command};
use tracing::{debug, info};

use crate::cli::EnvCommand;
use crate::config::{default_config_path, load_config_tree};
use crate::errors::{PlexiglassError, Result};
use crate::integrations::hashi::{self, configure_hashi, HashiOptions};
use crate::integrations::synapse::{self, cryotank_url, SynapseOptions};
use crate::integrations::{nats, services, settings_tree};
use crate::logging::{self, init_logging, LoggingConfig};
use crate::status::ExitStatus;
use crate::tree::AutoTree;
use crate::workspace::{self, Workspace};

/// Build the full parser: config, logging, workspace and every integration group
pub fn build_command() -> Command {
    let command = EnvCommand::new(env!("CARGO_PKG_NAME"))
        .about("Print the settings a plexiglass tool would run with")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("JSON or TOML settings file, layered under the command line"),
        );

    let command = logging::configure_parser(command);
    let command = workspace::configure_parser(command);
    let command = services::configure_parser(command);
    let command = hashi::configure_parser(command, HashiOptions::all());
    let command = nats::configure_parser(command, true);
    let command = synapse::configure_parser(command, SynapseOptions::all());
    command.build()
}

/// Main entry point for the CLI.
///
/// Parses flags, sets up logging and prints the merged settings tree.
pub fn run(args: Vec<String>) -> ExitStatus {
    let mut command = build_command();

    let matches = match command.try_get_matches_from_mut(&args) {
        Ok(matches) => matches,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion
            {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    let logging = LoggingConfig::from_matches(&matches);
    init_logging(&logging);

    match program(&command, &matches).and_then(|settings| settings.to_text_pretty()) {
        Ok(text) => {
            println!("{}", text);
            ExitStatus::Success
        }
        Err(e) => handle_error(e),
    }
}

/// Resolve the settings tree for already parsed flags
///
/// Layers, lowest first: flag defaults, the config file, then environment
/// and command line values.
pub fn program(command: &Command, matches: &ArgMatches) -> Result<AutoTree> {
    let file_tree = match matches.get_one::<PathBuf>("config") {
        Some(path) if !path.exists() => {
            return Err(PlexiglassError::Config(format!(
                "Config file not found: {}",
                path.display()
            )))
        }
        Some(path) => load_config_tree(path)?,
        None => load_config_tree(&default_config_path())?,
    };

    let workspace = Workspace::from_matches(matches, &[])?;
    configure_hashi(matches);

    let mut cli = settings_tree(command, matches);
    let masked: Vec<String> = cli
        .keys()
        .filter(|id| file_tree.contains_key(id))
        .filter(|id| matches.value_source(id) == Some(ValueSource::DefaultValue))
        .map(str::to_string)
        .collect();
    for id in masked {
        debug!(key = %id, "config file overrides flag default");
        cli.remove(&id);
    }

    if let Some(server) = nats::nats_server(matches) {
        cli.set_item("nats_server", server);
    }
    if let Some(url) = cryotank_url(matches) {
        cli.set_item("cryotank_url", url);
    }
    cli.set_item("synapse_tags", synapse::synapse_tags(matches));
    cli.set_item("owner_id", workspace.owner_id());
    cli.set_item("workspaces", workspace.dirs().clone());

    let settings = file_tree.snapshot_with(&cli)?;
    info!(keys = settings.len(), "settings resolved");
    Ok(settings)
}

fn handle_error(error: PlexiglassError) -> ExitStatus {
    eprintln!("Error: {}", error);
    ExitStatus::Error
}

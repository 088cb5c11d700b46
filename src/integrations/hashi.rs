//! HashiCorp Consul and Nomad integration

use clap::{Arg, ArgAction, ArgMatches};
use tracing::debug;

use super::host_port_group;
use crate::cli::EnvCommand;

/// Which HashiCorp groups to register
#[derive(Debug, Clone, Copy)]
pub struct HashiOptions {
    pub consul: bool,
    pub nomad: bool,
    pub suppress: bool,
}

impl Default for HashiOptions {
    fn default() -> Self {
        Self {
            consul: false,
            nomad: false,
            suppress: true,
        }
    }
}

impl HashiOptions {
    pub fn all() -> Self {
        Self {
            consul: true,
            nomad: true,
            ..Self::default()
        }
    }
}

pub fn configure_parser(mut command: EnvCommand, options: HashiOptions) -> EnvCommand {
    if options.consul {
        command = command.group(host_port_group("Consul", "consul", None, "8600", options.suppress));
    }
    if options.nomad {
        command = command.group(
            host_port_group("Nomad", "nomad", None, "4646", options.suppress).arg(
                Arg::new("nomad_secure")
                    .long("nomad-secure")
                    .action(ArgAction::SetTrue)
                    .help("Whether or not to use HTTPS"),
            ),
        );
    }
    command
}

/// Nomad agent address, if `--nomad-host` was given
pub fn nomad_addr(matches: &ArgMatches) -> Option<String> {
    let host = matches.try_get_one::<String>("nomad_host").ok().flatten()?;
    let port = matches
        .try_get_one::<String>("nomad_port")
        .ok()
        .flatten()
        .map(String::as_str)
        .unwrap_or("4646");
    let secure = matches.try_get_one::<bool>("nomad_secure").ok().flatten().copied().unwrap_or(false);

    let protocol = if secure { "https" } else { "http" };
    Some(format!("{}://{}:{}", protocol, host, port))
}

/// Export `NOMAD_ADDR` for Nomad clients
pub fn configure_hashi(matches: &ArgMatches) -> Option<String> {
    let addr = nomad_addr(matches)?;
    debug!(nomad_addr = %addr, "setting NOMAD_ADDR");
    std::env::set_var("NOMAD_ADDR", &addr);
    Some(addr)
}

//! NATS messaging integration

use clap::{Arg, ArgMatches};

use super::host_port_group;
use crate::cli::EnvCommand;

pub fn configure_parser(command: EnvCommand, suppress: bool) -> EnvCommand {
    command.group(
        host_port_group("NATS", "nats", None, "4222", suppress).arg(
            Arg::new("nats_channel")
                .long("nats-channel")
                .value_name("CHANNEL")
                .help("NATS channel to interact with"),
        ),
    )
}

/// `nats://host:port`, once a host is known
pub fn nats_server(matches: &ArgMatches) -> Option<String> {
    let host = matches.try_get_one::<String>("nats_host").ok().flatten()?;
    let port = matches.try_get_one::<String>("nats_port").ok().flatten()?;
    Some(format!("nats://{}:{}", host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nats_server() {
        let command = configure_parser(EnvCommand::new("natstest"), true).build();

        let matches = command.clone().try_get_matches_from(["natstest"]).unwrap();
        assert_eq!(nats_server(&matches), None);

        let matches = command
            .try_get_matches_from(["natstest", "--nats-host", "bus", "--nats-channel", "jobs"])
            .unwrap();
        assert_eq!(nats_server(&matches).as_deref(), Some("nats://bus:4222"));
        assert_eq!(matches.get_one::<String>("nats_channel").map(String::as_str), Some("jobs"));
    }

    #[test]
    fn test_unregistered_group() {
        let matches = EnvCommand::new("natstest").build().try_get_matches_from(["natstest"]).unwrap();
        assert_eq!(nats_server(&matches), None);
    }
}

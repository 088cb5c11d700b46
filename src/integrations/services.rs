//! Database, cache, search and tracing backends

use clap::{value_parser, Arg};

use super::host_port_group;
use crate::cli::{EnvCommand, FlagGroup};

pub fn dgraph_options(suppress: bool) -> FlagGroup {
    host_port_group("Dgraph", "dgraph", Some("127.0.0.1"), "9080", suppress)
}

pub fn redis_options(suppress: bool) -> FlagGroup {
    host_port_group("Redis", "redis", Some("127.0.0.1"), "6379", suppress).arg(
        Arg::new("redis_db")
            .long("redis-db")
            .value_name("DB")
            .value_parser(value_parser!(u32))
            .default_value("0")
            .help("Redis database number"),
    )
}

pub fn sonic_options(suppress: bool) -> FlagGroup {
    host_port_group("Sonic", "sonic", Some("127.0.0.1"), "1491", suppress)
}

pub fn tracing_options(suppress: bool) -> FlagGroup {
    host_port_group("Tracing", "tracing", Some("127.0.0.1"), "9080", suppress)
}

/// Register every backend group, suppressed
pub fn configure_parser(command: EnvCommand) -> EnvCommand {
    command
        .group(dgraph_options(true))
        .group(redis_options(true))
        .group(sonic_options(true))
        .group(tracing_options(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_defaults() {
        let command = configure_parser(EnvCommand::new("backends")).build();
        let matches = command.try_get_matches_from(["backends"]).unwrap();

        assert_eq!(matches.get_one::<String>("redis_port").map(String::as_str), Some("6379"));
        assert_eq!(matches.get_one::<u32>("redis_db"), Some(&0));
        assert_eq!(matches.get_one::<String>("sonic_port").map(String::as_str), Some("1491"));
        assert_eq!(matches.get_one::<String>("dgraph_host").map(String::as_str), Some("127.0.0.1"));
    }

    #[test]
    fn test_backends_hidden_from_short_help() {
        let mut command = configure_parser(EnvCommand::new("backends")).build();
        let short = command.render_help().to_string();
        assert!(!short.contains("--redis-host"));

        let long = command.render_long_help().to_string();
        assert!(long.contains("Redis"));
        assert!(long.contains("BACKENDS_REDIS_HOST"));
    }
}

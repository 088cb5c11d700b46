//! Synapse (axon, cortex and cryocell) integration flags

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgMatches};

use crate::cli::{EnvCommand, FlagGroup};

/// Which Synapse flags to register
#[derive(Debug, Clone, Copy, Default)]
pub struct SynapseOptions {
    pub axon: bool,
    pub cortex: bool,
    pub cryo: bool,
    pub dir: bool,
    pub tags: bool,
}

impl SynapseOptions {
    pub fn all() -> Self {
        Self {
            axon: true,
            cortex: true,
            cryo: true,
            dir: true,
            tags: true,
        }
    }
}

fn default_synapse_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".syn")
}

fn url_arg(id: &'static str, long: &'static str, default: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(long).value_name("URL").default_value(default).help(help)
}

pub fn configure_parser(command: EnvCommand, options: SynapseOptions) -> EnvCommand {
    let mut group = FlagGroup::new("Synapse").suppressed(true);

    if options.axon {
        group = group.arg(url_arg("axon_url", "axon-url", "axon", "URL/alias of an axon to interact with"));
    }
    if options.cortex {
        group = group.arg(url_arg("cortex_url", "cortex-url", "cortex", "URL/alias of a cortex to interact with"));
    }
    if options.cryo {
        group = group
            .arg(url_arg("cryocell_url", "cryocell-url", "cryo", "URL/alias of a cryocell to interact with"))
            .arg(
                Arg::new("cryotank_name")
                    .long("cryotank-name")
                    .value_name("NAME")
                    .default_value("virustotal:filefeed:2018:09")
                    .help("Name of the cryotank to process"),
            );
    }
    if options.dir {
        group = group.arg(
            Arg::new("synapse_dir")
                .long("synapse-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .default_value(default_synapse_dir().to_string_lossy().to_string())
                .help("Directory for Synapse-related data"),
        );
    }
    if options.tags {
        group = group.arg(
            Arg::new("synapse_tags")
                .long("synapse-tags")
                .value_name("TAG")
                .num_args(0..)
                .help("Synapse tags to apply to any uploaded Synapse nodes"),
        );
    }

    if group.is_empty() {
        command
    } else {
        command.group(group)
    }
}

/// `<cryocell>/<cryotank>` when the cryo flags are registered
pub fn cryotank_url(matches: &ArgMatches) -> Option<String> {
    let cell = matches.try_get_one::<String>("cryocell_url").ok().flatten()?;
    let tank = matches.try_get_one::<String>("cryotank_name").ok().flatten()?;
    Some(format!("{}/{}", cell, tank))
}

/// Tags given with `--synapse-tags`, empty if none
pub fn synapse_tags(matches: &ArgMatches) -> Vec<String> {
    matches
        .try_get_many::<String>("synapse_tags")
        .ok()
        .flatten()
        .map(|tags| tags.cloned().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cryotank_url() {
        let command = configure_parser(EnvCommand::new("syntest"), SynapseOptions::all()).build();
        let matches = command.try_get_matches_from(["syntest"]).unwrap();
        assert_eq!(cryotank_url(&matches).as_deref(), Some("cryo/virustotal:filefeed:2018:09"));
        assert_eq!(matches.get_one::<String>("axon_url").map(String::as_str), Some("axon"));
        assert_eq!(
            matches.get_one::<PathBuf>("synapse_dir").and_then(|p| p.file_name()).and_then(|n| n.to_str()),
            Some(".syn")
        );
        assert!(synapse_tags(&matches).is_empty());
    }

    #[test]
    fn test_selected_flags_only() {
        let options = SynapseOptions {
            tags: true,
            ..SynapseOptions::default()
        };
        let command = configure_parser(EnvCommand::new("syntest"), options).build();
        let matches = command
            .try_get_matches_from(["syntest", "--synapse-tags", "a", "b"])
            .unwrap();
        assert_eq!(synapse_tags(&matches), vec!["a", "b"]);
        assert_eq!(cryotank_url(&matches), None);
    }

    #[test]
    fn test_nothing_selected() {
        let command = configure_parser(EnvCommand::new("syntest"), SynapseOptions::default()).build();
        assert_eq!(command.get_arguments().count(), 0);
    }
}

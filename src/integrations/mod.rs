//! Flag groups for external service integrations
//!
//! Every group is registered on an [`EnvCommand`], so each flag can also be
//! supplied through `<PREFIX>_<FLAG>`. Groups are suppressed (shown only in
//! `--help`) unless stated otherwise.

pub mod hashi;
pub mod nats;
pub mod services;
pub mod synapse;

use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::cli::FlagGroup;
use crate::tree::{AutoTree, Node};

/// A `<name>-host` / `<name>-port` pair under one heading
pub(crate) fn host_port_group(
    heading: &str,
    name: &str,
    host_default: Option<&'static str>,
    port_default: &'static str,
    suppressed: bool,
) -> FlagGroup {
    let mut host = Arg::new(format!("{}_host", name))
        .long(format!("{}-host", name))
        .value_name("HOST")
        .help(format!("Address of a {} server", heading));
    if let Some(default) = host_default {
        host = host.default_value(default);
    }

    let port = Arg::new(format!("{}_port", name))
        .long(format!("{}-port", name))
        .value_name("PORT")
        .default_value(port_default)
        .help(format!("Port of a {} server", heading));

    FlagGroup::new(heading).suppressed(suppressed).arg(host).arg(port)
}

/// Collect every parsed flag into a tree keyed by argument id
///
/// Boolean flags become bools, counters become numbers, multi-value flags
/// become lists and everything else is kept as the raw string. Flags with no
/// value are skipped.
pub fn settings_tree(command: &Command, matches: &ArgMatches) -> AutoTree {
    let mut tree = AutoTree::new();

    for arg in command.get_arguments() {
        let id = arg.get_id().as_str();
        match arg.get_action() {
            ArgAction::Help
            | ArgAction::HelpShort
            | ArgAction::HelpLong
            | ArgAction::Version => continue,
            ArgAction::SetTrue | ArgAction::SetFalse => {
                if let Some(flag) = matches.get_one::<bool>(id) {
                    tree.set_item(id, *flag);
                }
            }
            ArgAction::Count => {
                if let Some(count) = matches.get_one::<u8>(id) {
                    tree.set_item(id, *count);
                }
            }
            action => {
                let Some(raw) = matches.get_raw(id) else {
                    continue;
                };
                let values: Vec<Node> = raw.map(|v| Node::from(v.to_string_lossy().to_string())).collect();
                let many = matches!(action, ArgAction::Append)
                    || arg.get_num_args().map(|r| r.max_values() > 1).unwrap_or(false);
                if many {
                    tree.set_item(id, values);
                } else if let Some(value) = values.into_iter().next() {
                    tree.set_item(id, value);
                }
            }
        }
    }

    tree
}

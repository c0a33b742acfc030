use anyhow::Result;

use crate::{cli::handlers, state::AppState};

/// Defines a system command, its aliases, and its handler.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>, &mut AppState) -> Result<()>,
}

/// The single source of truth for all built-in actions.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "add",
        aliases: &[],
        handler: handlers::add::handle,
    },
    CommandDefinition {
        name: "cmds",
        aliases: &[],
        handler: handlers::run::handle_list,
    },
    CommandDefinition {
        name: "context",
        aliases: &["ctx"],
        handler: handlers::context::handle,
    },
    CommandDefinition {
        name: "group",
        aliases: &[],
        handler: handlers::group::handle,
    },
    CommandDefinition {
        name: "ll",
        aliases: &[],
        handler: handlers::ll::handle,
    },
    CommandDefinition {
        name: "ls",
        aliases: &[],
        handler: handlers::ls::handle,
    },
    CommandDefinition {
        name: "rename",
        aliases: &[],
        handler: handlers::rename::handle,
    },
    CommandDefinition {
        name: "rm",
        aliases: &["remove"],
        handler: handlers::rm::handle,
    },
    CommandDefinition {
        name: "shell",
        aliases: &[],
        handler: handlers::run::handle_shell,
    },
    CommandDefinition {
        name: "super",
        aliases: &[],
        handler: handlers::run::handle_super,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// Routes `all_args` to a built-in action, or to a predefined command from `cmds.yml`.
///
/// With no arguments at all, `ll` is shown.
pub fn dispatch(mut all_args: Vec<String>, state: &mut AppState) -> Result<()> {
    log::debug!("Dispatching args: {:?}", all_args);

    if all_args.is_empty() {
        return handlers::ll::handle(Vec::new(), state);
    }
    let action = all_args.remove(0);

    match find_command(&action) {
        Some(command) => (command.handler)(all_args, state),
        None => handlers::run::handle_predefined(&action, all_args, state),
    }
}

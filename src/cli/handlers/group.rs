// src/cli/handlers/group.rs

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;

use crate::{constants::CONTEXT_NONE, core::group_store, state::AppState};

#[derive(Parser, Debug)]
#[command(no_binary_name = true, about = "Manages named groups of repos.")]
struct GroupArgs {
    #[command(subcommand)]
    action: Option<GroupAction>,
}

#[derive(Subcommand, Debug)]
enum GroupAction {
    /// List groups and their members.
    Ls,
    /// Add repos to a group, creating it if needed.
    Add {
        /// The group name.
        name: String,
        /// Repos to add.
        #[arg(required = true)]
        repos: Vec<String>,
    },
    /// Delete a group. The repos stay registered.
    Rm {
        /// The group name.
        name: String,
    },
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let group_args = GroupArgs::try_parse_from(&args)?;

    match group_args.action.unwrap_or(GroupAction::Ls) {
        GroupAction::Ls => {
            let groups = state.groups.load()?;
            if groups.is_empty() {
                println!("{}", "No groups defined.".dimmed());
            }
            for (name, members) in groups {
                println!("{}: {}", name.cyan(), members.join(" "));
            }
        }
        GroupAction::Add { name, repos } => {
            let known = state.registry.load()?.clone();
            if let Some(unknown) = repos.iter().find(|r| !known.contains_name(r)) {
                return Err(anyhow!("Repo '{}' not found.", unknown));
            }
            if known.contains_name(&name) {
                return Err(anyhow!("'{}' is already a repo name.", name));
            }
            let mut groups = state.groups.load()?.clone();
            group_store::add_to_group(&mut groups, &name, &repos);
            state.groups.save(&groups)?;
            println!("{} {}", "Updated group".green(), name.cyan());
        }
        GroupAction::Rm { name } => {
            let mut groups = state.groups.load()?.clone();
            group_store::remove_group(&mut groups, &name)?;
            state.groups.save(&groups)?;
            if state.context.active_group().as_deref() == Some(name.as_str()) {
                state.context.set_context(CONTEXT_NONE)?;
                println!("{}", "Context cleared.".dimmed());
            }
            println!("{} {}", "Removed group".green(), name.cyan());
        }
    }
    Ok(())
}

// src/cli/handlers/context.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;

use crate::{constants::CONTEXT_NONE, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Shows or sets the group used when no repos are named."
)]
struct ContextArgs {
    /// A group name, or `none` to clear the context.
    name: Option<String>,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let ctx_args = ContextArgs::try_parse_from(&args)?;

    let Some(name) = ctx_args.name else {
        match state.context.active_group() {
            Some(group) => println!("{}", group),
            None => println!("{}", "Context is not set.".dimmed()),
        }
        return Ok(());
    };

    if name != CONTEXT_NONE && !state.groups.load()?.contains_key(&name) {
        return Err(anyhow!("Group '{}' does not exist.", name));
    }
    state.context.set_context(&name)?;
    if name == CONTEXT_NONE {
        println!("{}", "Context cleared.".green());
    } else {
        println!("{} {}", "Context set to".green(), name.cyan());
    }
    Ok(())
}

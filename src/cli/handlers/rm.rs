// src/cli/handlers/rm.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;

use crate::{core::group_store, state::AppState};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Unregisters repos. Files on disk are untouched.")]
struct RmArgs {
    /// Names of the repos to unregister.
    #[arg(required = true)]
    names: Vec<String>,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let rm_args = RmArgs::try_parse_from(&args)?;

    let full = state.registry.load()?.clone();
    state
        .registry
        .remove(&full, &rm_args.names)
        .context("Failed to unregister repos")?;

    // Groups must not keep pointing at repos that are gone.
    let mut groups = state.groups.load()?.clone();
    let before = groups.clone();
    for name in &rm_args.names {
        group_store::purge_repo(&mut groups, name);
    }
    if groups != before {
        state.groups.save(&groups)?;
    }

    for name in &rm_args.names {
        println!("{} {}", "Removed".green(), name.cyan());
    }
    Ok(())
}

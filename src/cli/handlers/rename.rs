// src/cli/handlers/rename.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;

use crate::state::AppState;

// --- Command Argument Parsing ---

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Renames a registered repo.")]
struct RenameArgs {
    /// The current name of the repo.
    old_name: String,
    /// The new name for the repo.
    new_name: String,
}

// --- Main Handler ---

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let rename_args = RenameArgs::try_parse_from(&args)?;
    let (old_name, new_name) = (rename_args.old_name, rename_args.new_name);

    if old_name == new_name {
        println!("\n{}", format!("'{}' already has that name.", new_name).yellow());
        return Ok(());
    }

    let full = state.registry.load()?.clone();
    state
        .registry
        .rename(&full, &old_name, &new_name)
        .with_context(|| format!("Failed to rename '{}'", old_name))?;

    // Keep group memberships pointing at the same repo.
    let mut groups = state.groups.load()?.clone();
    let mut touched = false;
    for members in groups.values_mut() {
        for member in members.iter_mut().filter(|m| **m == old_name) {
            *member = new_name.clone();
            touched = true;
        }
    }
    if touched {
        state.groups.save(&groups)?;
    }

    println!("\n{}", "Success!".green().bold());
    println!("  {:<10} {}", "Old name:".blue(), old_name);
    println!("  {:<10} {}", "New name:".blue(), new_name.cyan());
    Ok(())
}

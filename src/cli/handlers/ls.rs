// src/cli/handlers/ls.rs

use anyhow::{Result, anyhow};
use clap::Parser;

use crate::state::AppState;

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Lists repo names, or prints the path of one repo.")]
struct LsArgs {
    /// Print only this repo's path.
    name: Option<String>,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let ls_args = LsArgs::try_parse_from(&args)?;
    let repos = state.registry.load()?;

    match ls_args.name {
        Some(name) => {
            let path = repos
                .get(&name)
                .ok_or_else(|| anyhow!("Repo '{}' not found.", name))?;
            println!("{}", path.display());
        }
        None => {
            let mut names: Vec<&str> = repos.names().collect();
            names.sort_unstable();
            println!("{}", names.join(" "));
        }
    }
    Ok(())
}

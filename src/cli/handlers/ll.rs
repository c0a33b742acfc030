// src/cli/handlers/ll.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{
    cli::handlers::commons::{self, EmptySelection},
    core::status,
    state::AppState,
    system::probe::GitProbe,
};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Shows one status line per repo.")]
struct LlArgs {
    /// Repos or groups to describe. Defaults to the context group, or all repos.
    names: Vec<String>,

    /// Print without ANSI colors.
    #[arg(long, short = 'C')]
    no_colors: bool,

    /// Query repos concurrently; lines are still printed in order.
    #[arg(long, short)]
    parallel: bool,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let ll_args = LlArgs::try_parse_from(&args)?;
    let selected = commons::select_repos(state, &ll_args.names, EmptySelection::ContextOrAll)?;
    if selected.is_empty() {
        println!("{}", "No repos registered. Use `repodeck add <path>`.".yellow());
        return Ok(());
    }

    let use_color = !ll_args.no_colors && colored::control::SHOULD_COLORIZE.should_colorize();
    let probe = GitProbe::new();
    let names: Vec<String> = selected.iter().map(|(n, _)| n.clone()).collect();

    let lines: Box<dyn Iterator<Item = _> + '_> = if ll_args.parallel {
        Box::new(status::describe_parallel(&selected, &probe, use_color).into_iter())
    } else {
        Box::new(status::describe(selected, &probe, use_color))
    };

    for (name, line) in names.iter().zip(lines) {
        match line {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("{} {}: {}", "Error".red(), name, e),
        }
    }
    Ok(())
}

// src/cli/handlers/run.rs

use anyhow::{Result, anyhow};
use colored::*;

use crate::{
    cli::handlers::commons::{self, EmptySelection},
    state::AppState,
    system::executor,
};

/// `repodeck super [names] -- <git args>`: a git command in every selected repo.
pub fn handle_super(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let (names, git_args) = commons::split_names_and_command(state, args)?;
    if git_args.is_empty() {
        return Err(anyhow!("Usage: repodeck super [names] -- <git args>"));
    }
    let mut argv = vec!["git".to_string()];
    argv.extend(git_args);
    fan_out(state, &names, &argv, EmptySelection::ContextOrAll)
}

/// `repodeck shell [names] -- <command>`: a shell command in every selected repo.
pub fn handle_shell(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let (names, words) = commons::split_names_and_command(state, args)?;
    if words.is_empty() {
        return Err(anyhow!("Usage: repodeck shell [names] -- <command>"));
    }
    let argv = vec!["sh".to_string(), "-c".to_string(), words.join(" ")];
    fan_out(state, &names, &argv, EmptySelection::ContextOrAll)
}

/// A command defined in `cmds.yml`, e.g. `repodeck fetch [names] [-- extra args]`.
pub fn handle_predefined(action: &str, args: Vec<String>, state: &mut AppState) -> Result<()> {
    let cmds = state.cmds()?;
    let definition = cmds.get(action).ok_or_else(|| {
        anyhow!(
            "Unknown action '{}'. Run `repodeck --help` or `repodeck cmds`.",
            action.cyan()
        )
    })?;

    let (names, extra) = commons::split_names_and_command(state, args)?;
    let argv = definition.to_argv(action, &extra)?;
    let empty = if definition.allow_all {
        EmptySelection::ContextOrAll
    } else {
        EmptySelection::Refuse
    };
    fan_out(state, &names, &argv, empty)
}

/// `repodeck cmds`: lists the predefined commands.
pub fn handle_list(_args: Vec<String>, state: &mut AppState) -> Result<()> {
    let cmds = state.cmds()?;
    let mut names: Vec<&String> = cmds.keys().collect();
    names.sort();
    for name in names {
        if let Some(def) = cmds.get(name) {
            println!("  {:<10} {} {}", name.cyan(), def.help, format!("[{}]", def.cmd).dimmed());
        }
    }
    Ok(())
}

fn fan_out(
    state: &mut AppState,
    names: &[String],
    argv: &[String],
    empty: EmptySelection,
) -> Result<()> {
    let selected = commons::select_repos(state, names, empty)?;
    if selected.is_empty() {
        println!("{}", "No repos selected.".yellow());
        return Ok(());
    }
    log::debug!("Running {:?} in {} repo(s).", argv, selected.len());

    let summary = executor::exec_tasks(commons::tasks_for(selected, argv))?;
    if summary.failed > 0 {
        log::warn!(
            "{} of {} task(s) failed.",
            summary.failed,
            summary.failed + summary.completed
        );
    }
    Ok(())
}

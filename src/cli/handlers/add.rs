// src/cli/handlers/add.rs

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;

use crate::{
    core::{paths, repo_registry},
    models::{RepoMap, RepoRecord},
    state::AppState,
    system::probe,
};

#[derive(Parser, Debug, Default)]
#[command(no_binary_name = true, about = "Registers git repos.")]
struct AddArgs {
    /// Paths of repos to register.
    #[arg(required = true)]
    paths: Vec<String>,

    /// Search each path recursively and register every repo found below it.
    #[arg(long, short)]
    recursive: bool,
}

pub fn handle(args: Vec<String>, state: &mut AppState) -> Result<()> {
    let add_args = AddArgs::try_parse_from(&args)?;

    let candidates: Vec<String> = if add_args.recursive {
        let mut found = Vec::new();
        for raw in &add_args.paths {
            let root = paths::normalize_path(raw)?;
            let repos = repo_registry::discover(&root, probe::is_git_root);
            log::debug!("Discovered {} repo(s) under '{}'.", repos.len(), root.display());
            found.extend(repos.into_iter().map(|p| p.display().to_string()));
        }
        found
    } else {
        add_args.paths
    };

    let existing = state.registry.load()?.clone();
    let added = state
        .registry
        .add(&existing, &candidates)
        .context("Failed to register repos")?;

    if added.is_empty() {
        println!("{}", "No new repos found!".yellow());
        return Ok(());
    }
    println!("{}", format!("Found {} new repo(s).", added.len()).green());
    for record in assigned_names(&existing, &added) {
        println!("  {:<18} {}", record.name.cyan(), record.path.display());
    }
    Ok(())
}

/// The names `added` will be listed under once loaded after `existing`,
/// with clashes already resolved.
fn assigned_names(existing: &RepoMap, added: &[RepoRecord]) -> Vec<RepoRecord> {
    let mut known = existing.clone();
    let mut named = Vec::with_capacity(added.len());
    for record in added {
        let name = repo_registry::disambiguate(&known, &record.name, &record.path)
            .unwrap_or_else(|| record.name.clone());
        known.insert(name.clone(), record.path.clone());
        named.push(RepoRecord::new(name, record.path.clone()));
    }
    named
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_assigned_names_match_what_load_would_show() {
        let existing: RepoMap = [("repo1", PathBuf::from("/a/bcd/repo1"))].into_iter().collect();
        let added = vec![
            RepoRecord::new("repo1", "/root/x/repo1"),
            RepoRecord::new("repo2", "/e/fgh/repo2"),
        ];
        let named = assigned_names(&existing, &added);
        assert_eq!(
            named,
            vec![
                RepoRecord::new("x/repo1", "/root/x/repo1"),
                RepoRecord::new("repo2", "/e/fgh/repo2"),
            ]
        );
    }
}

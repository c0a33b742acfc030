// src/cli/handlers/commons.rs

// Shared helpers for the handlers: turning user-supplied names into repos.

use anyhow::{Result, anyhow};
use colored::Colorize;
use std::path::PathBuf;

use crate::{models::CommandTask, state::AppState};

/// What to fall back to when the user names no repos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptySelection {
    /// The active context's group if set, otherwise every repo.
    ContextOrAll,
    /// Refuse: the action needs explicit names.
    Refuse,
}

/// Resolves repo and group names to `(name, path)` pairs, in the order given,
/// without duplicates.
pub fn select_repos(
    state: &mut AppState,
    names: &[String],
    empty: EmptySelection,
) -> Result<Vec<(String, PathBuf)>> {
    let repos = state.registry.load()?.clone();
    let groups = state.groups.load()?.clone();
    let all_sorted = || {
        let mut all: Vec<String> = repos.names().map(str::to_string).collect();
        all.sort();
        all
    };

    let requested: Vec<String> = if names.is_empty() {
        match empty {
            EmptySelection::Refuse => return Err(anyhow!("Please name at least one repo or group.")),
            EmptySelection::ContextOrAll => match state.context.active_group() {
                Some(group) if groups.contains_key(&group) => {
                    log::debug!("Using context group '{}'.", group);
                    vec![group]
                }
                Some(group) => {
                    log::warn!("Context group '{}' no longer exists, using all repos.", group);
                    all_sorted()
                }
                None => all_sorted(),
            },
        }
    } else {
        names.to_vec()
    };

    let mut selected: Vec<(String, PathBuf)> = Vec::new();
    let push = |name: &str, selected: &mut Vec<(String, PathBuf)>| -> bool {
        match repos.get(name) {
            Some(path) => {
                if !selected.iter().any(|(n, _)| n == name) {
                    selected.push((name.to_string(), path.to_path_buf()));
                }
                true
            }
            None => false,
        }
    };

    for name in &requested {
        if push(name, &mut selected) {
            continue;
        }
        match groups.get(name) {
            Some(members) => {
                for member in members {
                    if !push(member, &mut selected) {
                        eprintln!(
                            "{} group '{}' lists unknown repo '{}', skipped.",
                            "Warning:".yellow(),
                            name,
                            member
                        );
                    }
                }
            }
            None => return Err(anyhow!("'{}' is neither a repo nor a group.", name.cyan())),
        }
    }
    Ok(selected)
}

/// Splits `args` into leading repo/group names and the command that follows.
///
/// An explicit `--` ends the names. Without it, names are taken for as long as
/// they match a known repo or group.
pub fn split_names_and_command(
    state: &mut AppState,
    args: Vec<String>,
) -> Result<(Vec<String>, Vec<String>)> {
    if let Some(pos) = args.iter().position(|a| a == "--") {
        let mut names = args;
        let command = names.split_off(pos).into_iter().skip(1).collect();
        return Ok((names, command));
    }

    let repos = state.registry.load()?.clone();
    let groups = state.groups.load()?.clone();
    let count = args
        .iter()
        .take_while(|a| repos.contains_name(a) || groups.contains_key(a.as_str()))
        .count();
    let mut names = args;
    let command = names.split_off(count);
    Ok((names, command))
}

/// One task per selected repo, all running `argv`.
pub fn tasks_for(selected: Vec<(String, PathBuf)>, argv: &[String]) -> Vec<CommandTask> {
    selected
        .into_iter()
        .map(|(name, path)| CommandTask::new(name, path, argv.to_vec()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::handlers::group;
    use crate::models::GroupMap;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    /// A config dir plus real (`.git`-bearing) repo dirs `a`, `b`, `c`.
    fn fixture() -> (TempDir, AppState) {
        let dir = tempdir().unwrap();
        let config = dir.path().join("config");
        fs::create_dir_all(&config).unwrap();
        let mut lines = String::new();
        for name in ["a", "b", "c"] {
            let repo = dir.path().join("work").join(name);
            fs::create_dir_all(repo.join(".git")).unwrap();
            lines.push_str(&format!("{},{}\n", repo.display(), name));
        }
        fs::write(config.join("repo_path"), lines).unwrap();
        fs::write(config.join("groups.toml"), "pair = [\"c\", \"a\"]\n").unwrap();
        let state = AppState::new(config);
        (dir, state)
    }

    fn names(selected: &[(String, PathBuf)]) -> Vec<&str> {
        selected.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn test_empty_selection_defaults_to_all_sorted() {
        let (_dir, mut state) = fixture();
        let selected = select_repos(&mut state, &[], EmptySelection::ContextOrAll).unwrap();
        assert_eq!(names(&selected), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_selection_uses_context_group() {
        let (_dir, mut state) = fixture();
        state.context.set_context("pair").unwrap();
        let selected = select_repos(&mut state, &[], EmptySelection::ContextOrAll).unwrap();
        assert_eq!(names(&selected), vec!["c", "a"]);
    }

    #[test]
    fn test_context_naming_a_deleted_group_falls_back_to_all() {
        let (_dir, mut state) = fixture();
        state.context.set_context("pair").unwrap();
        state.groups.save(&GroupMap::new()).unwrap();
        let selected = select_repos(&mut state, &[], EmptySelection::ContextOrAll).unwrap();
        assert_eq!(names(&selected), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_group_rm_clears_matching_context() {
        let (_dir, mut state) = fixture();
        state.context.set_context("pair").unwrap();
        group::handle(vec!["rm".to_string(), "pair".to_string()], &mut state).unwrap();

        assert_eq!(state.context.active_group(), None);
        let selected = select_repos(&mut state, &[], EmptySelection::ContextOrAll).unwrap();
        assert_eq!(names(&selected), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_selection_can_be_refused() {
        let (_dir, mut state) = fixture();
        assert!(select_repos(&mut state, &[], EmptySelection::Refuse).is_err());
    }

    #[test]
    fn test_names_and_groups_mix_without_duplicates() {
        let (_dir, mut state) = fixture();
        let requested = vec!["a".to_string(), "pair".to_string(), "b".to_string()];
        let selected = select_repos(&mut state, &requested, EmptySelection::Refuse).unwrap();
        assert_eq!(names(&selected), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let (_dir, mut state) = fixture();
        let requested = vec!["nope".to_string()];
        assert!(select_repos(&mut state, &requested, EmptySelection::Refuse).is_err());
    }

    #[test]
    fn test_split_with_explicit_separator() {
        let (_dir, mut state) = fixture();
        let args: Vec<String> = ["a", "--", "log", "-1"].iter().map(|s| s.to_string()).collect();
        let (names, command) = split_names_and_command(&mut state, args).unwrap();
        assert_eq!(names, vec!["a"]);
        assert_eq!(command, vec!["log", "-1"]);
    }

    #[test]
    fn test_split_by_known_names() {
        let (_dir, mut state) = fixture();
        let args: Vec<String> = ["pair", "b", "status", "a"].iter().map(|s| s.to_string()).collect();
        let (names, command) = split_names_and_command(&mut state, args).unwrap();
        assert_eq!(names, vec!["pair", "b"]);
        assert_eq!(command, vec!["status", "a"]);
    }

    #[test]
    fn test_tasks_for_builds_one_task_per_repo() {
        let selected = vec![
            ("a".to_string(), PathBuf::from("/w/a")),
            ("b".to_string(), PathBuf::from("/w/b")),
        ];
        let argv = vec!["git".to_string(), "status".to_string()];
        let tasks = tasks_for(selected, &argv);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1], CommandTask::new("b", "/w/b", argv.clone()));
    }
}

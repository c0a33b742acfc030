// src/core/group_store.rs

use crate::core::paths::{self, PathError};
use crate::models::GroupMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroupError {
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    #[error("Failed to parse groups file: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize groups to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Group '{name}' not found.")]
    NotFound { name: String },
}

/// Memoized view of `groups.toml` (`name = ["repo", ...]`).
#[derive(Debug)]
pub struct GroupStore {
    file: PathBuf,
    cache: Option<GroupMap>,
}

impl GroupStore {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            cache: None,
        }
    }

    pub fn in_config_dir(config_dir: &Path) -> Self {
        Self::new(paths::groups_file(config_dir))
    }

    /// Loads (or returns the memoized) groups. A missing file means no groups.
    pub fn load(&mut self) -> Result<&GroupMap, GroupError> {
        if self.cache.is_none() {
            let groups = if self.file.is_file() {
                let content = fs::read_to_string(&self.file)?;
                toml::from_str(&content)?
            } else {
                GroupMap::new()
            };
            log::debug!("Loaded {} groups from '{}'.", groups.len(), self.file.display());
            self.cache = Some(groups);
        }
        Ok(self.cache.get_or_insert_with(GroupMap::new))
    }

    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    /// Rewrites the whole file from `groups` and refreshes the cache with it.
    pub fn save(&mut self, groups: &GroupMap) -> Result<(), GroupError> {
        if let Some(dir) = self.file.parent() {
            paths::ensure_dir(dir)?;
        }
        let toml_string = toml::to_string_pretty(groups)?;
        fs::write(&self.file, toml_string)?;
        self.cache = Some(groups.clone());
        Ok(())
    }
}

/// Appends `repos` to `group` (creating it), skipping names already in it.
pub fn add_to_group(groups: &mut GroupMap, group: &str, repos: &[String]) {
    let members = groups.entry(group.to_string()).or_default();
    for repo in repos {
        if !members.contains(repo) {
            members.push(repo.clone());
        }
    }
}

/// Deletes `group`. Fails if it does not exist.
pub fn remove_group(groups: &mut GroupMap, group: &str) -> Result<Vec<String>, GroupError> {
    groups.remove(group).ok_or_else(|| GroupError::NotFound {
        name: group.to_string(),
    })
}

/// Drops `repo` from every group, e.g. after the repo itself is unregistered.
pub fn purge_repo(groups: &mut GroupMap, repo: &str) {
    for members in groups.values_mut() {
        members.retain(|m| m != repo);
    }
}

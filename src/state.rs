// src/state.rs

use crate::core::cmd_loader::{self, CmdError};
use crate::core::context_store::ContextStore;
use crate::core::group_store::GroupStore;
use crate::core::paths::{self, PathError};
use crate::core::repo_registry::RepoRegistry;
use crate::models::CmdMap;
use std::path::{Path, PathBuf};

/// Everything a command handler needs, rooted at one config directory.
///
/// Each store loads lazily and keeps its own cache, so a handler only pays
/// for the files it actually touches.
#[derive(Debug)]
pub struct AppState {
    config_dir: PathBuf,
    pub registry: RepoRegistry,
    pub groups: GroupStore,
    pub context: ContextStore,
}

impl AppState {
    /// State rooted at `config_dir`.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        Self {
            registry: RepoRegistry::in_config_dir(&config_dir),
            groups: GroupStore::in_config_dir(&config_dir),
            context: ContextStore::new(&config_dir),
            config_dir,
        }
    }

    /// State rooted at the user's config directory.
    pub fn from_user_config() -> Result<Self, PathError> {
        Ok(Self::new(paths::get_config_dir()?))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Built-in command definitions merged with the user's `cmds.yml`.
    pub fn cmds(&self) -> Result<CmdMap, CmdError> {
        cmd_loader::get_cmds_from_files(&paths::cmds_file(&self.config_dir))
    }

    /// Forgets everything loaded so far.
    pub fn clear_caches(&mut self) {
        self.registry.clear_cache();
        self.groups.clear_cache();
        self.context.clear_cache();
    }
}

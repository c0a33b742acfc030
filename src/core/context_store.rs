// src/core/context_store.rs

use crate::constants::{CONTEXT_EXTENSION, CONTEXT_NONE};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Path error: {0}")]
    Path(#[from] crate::core::paths::PathError),
    #[error("Invalid context name '{0}'.")]
    InvalidName(String),
}

/// The active context: a `<name>.context` pointer file in the config root.
///
/// Lookups are memoized; `None` (no root, or no pointer file) is a normal
/// answer, not an error.
#[derive(Debug)]
pub struct ContextStore {
    config_dir: PathBuf,
    cache: Option<Option<PathBuf>>,
}

impl ContextStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            cache: None,
        }
    }

    /// Path of the active context file, if any.
    pub fn get_context(&mut self) -> Option<&Path> {
        if self.cache.is_none() {
            self.cache = Some(find_context_file(&self.config_dir));
        }
        self.cache.as_ref().and_then(|c| c.as_deref())
    }

    /// The context name, i.e. the group it selects.
    pub fn active_group(&mut self) -> Option<String> {
        self.get_context()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().into_owned())
    }

    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    /// Makes `name` the active context, replacing any previous one.
    /// The name `none` clears the context instead.
    pub fn set_context(&mut self, name: &str) -> Result<(), ContextError> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ContextError::InvalidName(name.to_string()));
        }
        if self.config_dir.is_dir() {
            for entry in fs::read_dir(&self.config_dir)? {
                let path = entry?.path();
                if is_context_file(&path) {
                    log::debug!("Removing old context pointer '{}'", path.display());
                    fs::remove_file(&path)?;
                }
            }
        }
        if name != CONTEXT_NONE {
            crate::core::paths::ensure_dir(&self.config_dir)?;
            let pointer = self
                .config_dir
                .join(format!("{}.{}", name, CONTEXT_EXTENSION));
            fs::write(&pointer, "")?;
        }
        self.clear_cache();
        Ok(())
    }
}

fn is_context_file(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == CONTEXT_EXTENSION)
}

fn find_context_file(config_dir: &Path) -> Option<PathBuf> {
    let entries = match fs::read_dir(config_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("No context: cannot read '{}': {}", config_dir.display(), e);
            return None;
        }
    };
    // With several stray pointers, pick the alphabetically first so the answer is stable.
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_context_file(path))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

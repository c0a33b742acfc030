// src/core/paths.rs

use crate::constants::{APP_DIR_NAME, CMDS_FILENAME, GROUPS_FILENAME, REPO_PATH_FILENAME};
use lazy_static::lazy_static;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not create config directory at '{path}': {source}")]
    ConfigDirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not expand path '{path}': {reason}")]
    Expansion { path: String, reason: String },
    #[error("Could not determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

/// Returns the path to the repodeck configuration directory.
///
/// `$XDG_CONFIG_HOME/repodeck` wins when the variable is set and non-empty,
/// otherwise the platform config dir is used. The directory is NOT created here;
/// readers treat a missing root as "nothing configured".
///
/// Memoized per process. Call [`clear_config_dir_cache`] to force a recompute.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached = CONFIG_DIR.lock().unwrap_or_else(|e| e.into_inner());

    if let Some(path) = &*cached {
        return Ok(path.clone());
    }

    let base = match env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => dirs::config_dir().ok_or(PathError::ConfigDirNotFound)?,
    };
    let config_path = base.join(APP_DIR_NAME);
    log::debug!("Resolved config dir to '{}'", config_path.display());

    *cached = Some(config_path.clone());
    Ok(config_path)
}

/// Forgets the memoized config directory.
pub fn clear_config_dir_cache() {
    let mut cached = CONFIG_DIR.lock().unwrap_or_else(|e| e.into_inner());
    *cached = None;
}

/// Creates `dir` (and parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), PathError> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| PathError::ConfigDirCreation {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

pub fn repo_path_file(config_dir: &Path) -> PathBuf {
    config_dir.join(REPO_PATH_FILENAME)
}

pub fn groups_file(config_dir: &Path) -> PathBuf {
    config_dir.join(GROUPS_FILENAME)
}

pub fn cmds_file(config_dir: &Path) -> PathBuf {
    config_dir.join(CMDS_FILENAME)
}

/// Expands `~` and environment variables, then makes the path absolute and
/// lexically normalized (`.` dropped, `..` folded, trailing separators gone).
///
/// Symlinks are not resolved, so the result matches what the user typed.
pub fn normalize_path(raw: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(raw).map_err(|e| PathError::Expansion {
        path: raw.to_string(),
        reason: e.to_string(),
    })?;
    let path = PathBuf::from(expanded.as_ref());
    let absolute = if path.is_absolute() {
        path
    } else {
        env::current_dir().map_err(PathError::CurrentDir)?.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(dunce::simplified(&normalized).to_path_buf())
}

/// The final component of a path as a repo name (`/home/me/proj/` → `proj`).
pub fn base_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_trailing_separator() {
        let p = normalize_path("/home/some/repo/").unwrap();
        assert_eq!(p, PathBuf::from("/home/some/repo"));
    }

    #[test]
    fn test_normalize_folds_dot_segments() {
        let p = normalize_path("/a/./b/../c").unwrap();
        assert_eq!(p, PathBuf::from("/a/c"));
    }

    #[test]
    fn test_normalize_makes_relative_absolute() {
        let p = normalize_path("some/repo").unwrap();
        assert!(p.is_absolute());
        assert!(p.ends_with("some/repo"));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name(Path::new("/home/some/repo1")).as_deref(), Some("repo1"));
        assert_eq!(base_name(Path::new("/")), None);
    }

    #[test]
    fn test_config_dir_is_memoized_until_cleared() {
        let first = get_config_dir();
        let second = get_config_dir();
        assert_eq!(first.ok(), second.ok());
        clear_config_dir_cache();
        assert!(get_config_dir().is_ok() || dirs::config_dir().is_none());
    }
}

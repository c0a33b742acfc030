// src/core/repo_registry.rs

use crate::core::paths::{self, PathError};
use crate::models::{RepoMap, RepoRecord};
use crate::system::probe;

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Represents errors that can occur while reading or mutating the repo registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A filesystem I/O error occurred on a backing file.
    #[error("Filesystem Error on '{path}': {source}")]
    Io {
        /// The file being read or written.
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// An error occurred related to filesystem paths (e.g., config directory not found).
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    /// A rename or removal targeted a name that is not registered.
    #[error("Repo '{name}' not found.")]
    NotFound {
        /// The missing name.
        name: String,
    },
    /// A rename would make two repos share a name.
    #[error("Repo name '{name}' is already in use.")]
    NameAlreadyExists {
        /// The conflicting name.
        name: String,
    },
}

type RegistryResult<T> = Result<T, RegistryError>;

/// How a backing file is opened for writing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Append,
    Truncate,
}

/// Memoized name → path registry over one or more `path,name` line files.
///
/// The first file is the writable one; any extra files are merged in at load
/// time, in order. Nothing is read until [`RepoRegistry::load`] is called, and
/// the loaded map is reused until [`RepoRegistry::clear_cache`] (or a mutation
/// through this object) drops it.
#[derive(Debug)]
pub struct RepoRegistry {
    files: Vec<PathBuf>,
    is_repo: fn(&Path) -> bool,
    cache: Option<RepoMap>,
}

impl RepoRegistry {
    /// A registry backed by `repo_path_file`, validating entries with [`probe::is_git_root`].
    pub fn new(repo_path_file: impl Into<PathBuf>) -> Self {
        Self {
            files: vec![repo_path_file.into()],
            is_repo: probe::is_git_root,
            cache: None,
        }
    }

    /// The registry stored in the standard location under `config_dir`.
    pub fn in_config_dir(config_dir: &Path) -> Self {
        Self::new(paths::repo_path_file(config_dir))
    }

    /// Adds read-only files merged after the primary one at load time.
    pub fn with_extra_files(mut self, extra: impl IntoIterator<Item = PathBuf>) -> Self {
        self.files.extend(extra);
        self.cache = None;
        self
    }

    /// Replaces the working-tree-root check (used by tests and by callers
    /// that already validated their paths).
    pub fn with_validator(mut self, is_repo: fn(&Path) -> bool) -> Self {
        self.is_repo = is_repo;
        self.cache = None;
        self
    }

    /// The writable backing file.
    pub fn primary_file(&self) -> &Path {
        // `files` is built non-empty in `new` and only ever extended.
        self.files.first().map(PathBuf::as_path).unwrap_or(Path::new(""))
    }

    /// Loads (or returns the memoized) registry.
    ///
    /// Invalid paths are skipped silently, repeated paths keep their first
    /// occurrence, and name clashes are resolved with [`disambiguate`].
    pub fn load(&mut self) -> RegistryResult<&RepoMap> {
        if self.cache.is_none() {
            let repos = self.read_all()?;
            log::debug!("Loaded {} repos from {} file(s).", repos.len(), self.files.len());
            self.cache = Some(repos);
        }
        Ok(self.cache.get_or_insert_with(RepoMap::new))
    }

    /// Drops the memoized map so the next `load` re-reads the files.
    pub fn clear_cache(&mut self) {
        self.cache = None;
    }

    fn read_all(&self) -> RegistryResult<RepoMap> {
        let mut repos = RepoMap::new();
        let mut seen_paths: HashSet<PathBuf> = HashSet::new();

        for file in &self.files {
            if !file.is_file() {
                log::debug!("Repo file '{}' does not exist, skipping.", file.display());
                continue;
            }
            let content = fs::read_to_string(file).map_err(|e| RegistryError::Io {
                path: file.display().to_string(),
                source: e,
            })?;

            for line in content.lines() {
                let Some((path, name)) = parse_line(line) else {
                    continue;
                };
                if !(self.is_repo)(&path) {
                    log::debug!("'{}' is not a repo root anymore, skipping.", path.display());
                    continue;
                }
                if !seen_paths.insert(path.clone()) {
                    log::debug!("Duplicate entry for '{}' ignored.", path.display());
                    continue;
                }
                match disambiguate(&repos, &name, &path) {
                    Some(final_name) => {
                        if final_name != name {
                            log::debug!("Name clash on '{}': using '{}'.", name, final_name);
                        }
                        repos.insert(final_name, path);
                    }
                    None => log::warn!(
                        "Could not find a unique name for '{}', skipping.",
                        path.display()
                    ),
                }
            }
        }
        Ok(repos)
    }

    /// Registers the repos among `new_paths` that are working-tree roots and not
    /// already in `existing`, named after their last path component.
    ///
    /// All accepted entries are written with a single append to the primary
    /// file; existing lines are never rewritten. Nothing is written when no path
    /// is accepted. Returns the accepted records.
    pub fn add<S: AsRef<str>>(
        &mut self,
        existing: &RepoMap,
        new_paths: &[S],
    ) -> RegistryResult<Vec<RepoRecord>> {
        let mut accepted: Vec<RepoRecord> = Vec::new();

        for raw in new_paths {
            let path = paths::normalize_path(raw.as_ref())?;
            if !(self.is_repo)(&path) {
                log::debug!("'{}' is not a repo root, ignored.", path.display());
                continue;
            }
            if existing.contains_path(&path) || accepted.iter().any(|r| r.path == path) {
                log::debug!("'{}' is already registered.", path.display());
                continue;
            }
            let Some(name) = paths::base_name(&path) else {
                log::warn!("Cannot derive a name for '{}', ignored.", path.display());
                continue;
            };
            accepted.push(RepoRecord::new(name, path));
        }

        if !accepted.is_empty() {
            if let Some(dir) = self.primary_file().parent() {
                paths::ensure_dir(dir)?;
            }
            write_records(self.primary_file(), &accepted, WriteMode::Append)?;
            self.clear_cache();
        }
        Ok(accepted)
    }

    /// Renames `old` to `new` and rewrites the whole primary file from `full`.
    ///
    /// Fails with `NotFound` if `old` is absent, or `NameAlreadyExists` if `new`
    /// belongs to another repo; in both cases nothing is written. Returns the
    /// mapping as persisted.
    pub fn rename(&mut self, full: &RepoMap, old: &str, new: &str) -> RegistryResult<RepoMap> {
        if !full.contains_name(old) {
            return Err(RegistryError::NotFound {
                name: old.to_string(),
            });
        }
        if old != new && full.contains_name(new) {
            return Err(RegistryError::NameAlreadyExists {
                name: new.to_string(),
            });
        }

        let mut renamed = full.clone();
        renamed.rename_key(old, new);
        self.rewrite(&renamed)?;
        log::debug!("Renamed repo '{}' to '{}'.", old, new);
        Ok(renamed)
    }

    /// Unregisters `names` and rewrites the primary file. Fails with `NotFound`
    /// on the first unknown name, before anything is written.
    pub fn remove<S: AsRef<str>>(&mut self, full: &RepoMap, names: &[S]) -> RegistryResult<RepoMap> {
        let mut remaining = full.clone();
        for name in names {
            let name = name.as_ref();
            if remaining.remove(name).is_none() && !full.contains_name(name) {
                return Err(RegistryError::NotFound {
                    name: name.to_string(),
                });
            }
        }
        self.rewrite(&remaining)?;
        Ok(remaining)
    }

    fn rewrite(&mut self, repos: &RepoMap) -> RegistryResult<()> {
        if let Some(dir) = self.primary_file().parent() {
            paths::ensure_dir(dir)?;
        }
        let records: Vec<RepoRecord> = repos.iter().cloned().collect();
        write_records(self.primary_file(), &records, WriteMode::Truncate)?;
        self.clear_cache();
        Ok(())
    }
}

/// Parses `path,name`. A line without a comma names the repo after its last
/// path component. Blank lines yield `None`.
fn parse_line(line: &str) -> Option<(PathBuf, String)> {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return None;
    }
    let (raw_path, name) = match line.rsplit_once(',') {
        Some((p, n)) if !n.trim().is_empty() => (p, Some(n.trim().to_string())),
        Some((p, _)) => (p, None),
        None => (line, None),
    };
    let expanded = shellexpand::tilde(raw_path.trim());
    let path = PathBuf::from(expanded.trim_end_matches('/'));
    let name = name.or_else(|| paths::base_name(&path))?;
    Some((path, name))
}

/// Picks the name `path` is registered under, given what `repos` already holds.
///
/// The bare `name` is used when free. Otherwise parent directories of `path`
/// are prefixed one segment at a time (`x/repo1`, `root/x/repo1`, ...) until
/// the result is unused. `None` if every prefix is taken.
pub fn disambiguate(repos: &RepoMap, name: &str, path: &Path) -> Option<String> {
    if !repos.contains_name(name) {
        return Some(name.to_string());
    }
    let mut candidate = name.to_string();
    for dir in path.ancestors().skip(1) {
        let Some(segment) = dir.file_name() else {
            break;
        };
        candidate = format!("{}/{}", segment.to_string_lossy(), candidate);
        if !repos.contains_name(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Returns every working-tree root under `root` (including `root` itself),
/// without descending into the repositories it finds.
pub fn discover(root: &Path, is_repo: fn(&Path) -> bool) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let walker = WalkDir::new(root).follow_links(false).into_iter();

    // Entries whose parent is a repo (its `.git` included) are pruned whole.
    let outside_repos = |e: &DirEntry| {
        e.depth() == 0 || !e.path().parent().is_some_and(is_repo)
    };
    for entry_result in walker.filter_entry(outside_repos) {
        match entry_result {
            Ok(entry) => {
                if entry.file_type().is_dir() && is_repo(entry.path()) {
                    found.push(entry.path().to_path_buf());
                }
            }
            Err(e) => log::debug!("Skipping unreadable entry during discovery: {}", e),
        }
    }
    found
}

fn write_records(file: &Path, records: &[RepoRecord], mode: WriteMode) -> RegistryResult<()> {
    let data: String = records.iter().map(RepoRecord::to_line).collect();
    let io_err = |e| RegistryError::Io {
        path: file.display().to_string(),
        source: e,
    };
    let mut handle = match mode {
        WriteMode::Append => OpenOptions::new().create(true).append(true).open(file),
        WriteMode::Truncate => OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(file),
    }
    .map_err(io_err)?;
    // One write call: appended entries land together.
    handle.write_all(data.as_bytes()).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn always(_: &Path) -> bool {
        true
    }

    fn registry_with(content: &str) -> (tempfile::TempDir, RepoRegistry) {
        let dir = tempdir().unwrap();
        let file = dir.path().join("repo_path");
        fs::write(&file, content).unwrap();
        let registry = RepoRegistry::new(file).with_validator(always);
        (dir, registry)
    }

    fn map(pairs: &[(&str, &str)]) -> RepoMap {
        pairs.iter().map(|(n, p)| (*n, PathBuf::from(p))).collect()
    }

    #[test]
    fn test_load_reads_names_from_file() {
        let (_dir, mut registry) =
            registry_with("/a/bcd/repo1,repo1\n/e/fgh/repo2,repo2\n/a/b/c/repo3,xxx\n");
        let repos = registry.load().unwrap();
        assert_eq!(
            *repos,
            map(&[
                ("repo1", "/a/bcd/repo1"),
                ("repo2", "/e/fgh/repo2"),
                ("xxx", "/a/b/c/repo3"),
            ])
        );
    }

    #[test]
    fn test_load_empty_file() {
        let (_dir, mut registry) = registry_with("");
        assert!(registry.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let mut registry = RepoRegistry::new(dir.path().join("nope")).with_validator(always);
        assert!(registry.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_resolves_clash_with_parent_segment() {
        let (_dir, mut registry) = registry_with(
            "/a/bcd/repo1,repo1\n/e/fgh/repo2,repo2\n/root/x/repo1,repo1\n",
        );
        let repos = registry.load().unwrap();
        assert_eq!(
            *repos,
            map(&[
                ("repo1", "/a/bcd/repo1"),
                ("repo2", "/e/fgh/repo2"),
                ("x/repo1", "/root/x/repo1"),
            ])
        );
    }

    #[test]
    fn test_clash_extends_until_unique() {
        let (_dir, mut registry) =
            registry_with("/a/x/repo1,repo1\n/b/x/repo1,repo1\n/c/x/repo1,repo1\n");
        let repos = registry.load().unwrap();
        assert_eq!(repos.get("repo1"), Some(Path::new("/a/x/repo1")));
        assert_eq!(repos.get("x/repo1"), Some(Path::new("/b/x/repo1")));
        assert_eq!(repos.get("c/x/repo1"), Some(Path::new("/c/x/repo1")));
    }

    #[test]
    fn test_load_dedups_identical_paths_and_skips_invalid() {
        fn only_real(p: &Path) -> bool {
            !p.starts_with("/gone")
        }
        let dir = tempdir().unwrap();
        let file = dir.path().join("repo_path");
        fs::write(&file, "/a/repo,repo\n/gone/old,old\n/a/repo/,other\n\n").unwrap();
        let mut registry = RepoRegistry::new(file).with_validator(only_real);
        assert_eq!(*registry.load().unwrap(), map(&[("repo", "/a/repo")]));
    }

    #[test]
    fn test_load_accepts_single_column_lines() {
        let (_dir, mut registry) = registry_with("/a/b/legacy\n");
        assert_eq!(registry.load().unwrap().get("legacy"), Some(Path::new("/a/b/legacy")));
    }

    #[test]
    fn test_load_merges_extra_files_in_order() {
        let dir = tempdir().unwrap();
        let primary = dir.path().join("repo_path");
        let extra = dir.path().join("more");
        fs::write(&primary, "/a/bcd/repo1,repo1\n").unwrap();
        fs::write(&extra, "/root/x/repo1,repo1\n").unwrap();
        let mut registry = RepoRegistry::new(primary)
            .with_extra_files(vec![extra])
            .with_validator(always);
        let repos = registry.load().unwrap();
        assert_eq!(
            *repos,
            map(&[("repo1", "/a/bcd/repo1"), ("x/repo1", "/root/x/repo1")])
        );
    }

    #[test]
    fn test_load_is_memoized_until_cleared() {
        let (dir, mut registry) = registry_with("/a/repo1,repo1\n");
        let first = registry.load().unwrap().clone();
        fs::write(dir.path().join("repo_path"), "/b/repo2,repo2\n").unwrap();
        assert_eq!(*registry.load().unwrap(), first);

        registry.clear_cache();
        assert_eq!(*registry.load().unwrap(), map(&[("repo2", "/b/repo2")]));
    }

    #[test]
    fn test_add_one_new_repo() {
        let (dir, mut registry) = registry_with("");
        let existing = map(&[("repo", "/nos/repo")]);
        let added = registry.add(&existing, &["/home/some/repo/"]).unwrap();
        assert_eq!(added, vec![RepoRecord::new("repo", "/home/some/repo")]);
        let content = fs::read_to_string(dir.path().join("repo_path")).unwrap();
        assert_eq!(content, "/home/some/repo,repo\n");
    }

    #[test]
    fn test_add_two_new_repos() {
        let (dir, mut registry) = registry_with("");
        let existing = map(&[("repo", "/nos/repo")]);
        registry
            .add(&existing, &["/home/some/repo1", "/repo2"])
            .unwrap();
        let content = fs::read_to_string(dir.path().join("repo_path")).unwrap();
        let mut lines: Vec<&str> = content.lines().collect();
        lines.sort();
        assert_eq!(lines, vec!["/home/some/repo1,repo1", "/repo2,repo2"]);
    }

    #[test]
    fn test_add_skips_known_paths_and_appends() {
        let (dir, mut registry) = registry_with("/nos/repo,repo\n");
        let existing = map(&[("repo", "/nos/repo")]);
        registry
            .add(&existing, &["/home/some/repo1", "/nos/repo", "/home/some/repo1/"])
            .unwrap();
        let content = fs::read_to_string(dir.path().join("repo_path")).unwrap();
        assert_eq!(content, "/nos/repo,repo\n/home/some/repo1,repo1\n");
    }

    #[test]
    fn test_add_filters_non_repos_and_writes_nothing() {
        fn never(_: &Path) -> bool {
            false
        }
        let dir = tempdir().unwrap();
        let file = dir.path().join("sub").join("repo_path");
        let mut registry = RepoRegistry::new(&file).with_validator(never);
        let added = registry.add(&RepoMap::new(), &["/tmp/whatever"]).unwrap();
        assert!(added.is_empty());
        assert!(!file.exists());
    }

    #[test]
    fn test_add_invalidates_cache() {
        let (_dir, mut registry) = registry_with("/nos/repo,repo\n");
        let existing = registry.load().unwrap().clone();
        registry.add(&existing, &["/home/some/repo1"]).unwrap();
        assert_eq!(registry.load().unwrap().len(), 2);
    }

    #[test]
    fn test_rename_rewrites_file() {
        let (dir, mut registry) = registry_with("/a/b,r1\n/c/c,r2\n");
        let full = map(&[("r1", "/a/b"), ("r2", "/c/c")]);
        let renamed = registry.rename(&full, "r2", "xxx").unwrap();
        assert_eq!(renamed, map(&[("r1", "/a/b"), ("xxx", "/c/c")]));
        let content = fs::read_to_string(dir.path().join("repo_path")).unwrap();
        assert_eq!(content, "/a/b,r1\n/c/c,xxx\n");
    }

    #[test]
    fn test_rename_unknown_name_fails_without_writing() {
        let (dir, mut registry) = registry_with("/a/b,r1\n");
        let full = map(&[("r1", "/a/b")]);
        let err = registry.rename(&full, "nope", "xxx").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { ref name } if name == "nope"));
        let content = fs::read_to_string(dir.path().join("repo_path")).unwrap();
        assert_eq!(content, "/a/b,r1\n");
    }

    #[test]
    fn test_rename_onto_existing_name_fails() {
        let (_dir, mut registry) = registry_with("");
        let full = map(&[("r1", "/a/b"), ("r2", "/c/c")]);
        let err = registry.rename(&full, "r1", "r2").unwrap_err();
        assert!(matches!(err, RegistryError::NameAlreadyExists { .. }));
    }

    #[test]
    fn test_remove_rewrites_without_entry() {
        let (dir, mut registry) = registry_with("/a/b,r1\n/c/c,r2\n");
        let full = map(&[("r1", "/a/b"), ("r2", "/c/c")]);
        let remaining = registry.remove(&full, &["r1"]).unwrap();
        assert_eq!(remaining, map(&[("r2", "/c/c")]));
        let content = fs::read_to_string(dir.path().join("repo_path")).unwrap();
        assert_eq!(content, "/c/c,r2\n");
        assert!(registry.remove(&remaining, &["r1"]).is_err());
    }

    #[test]
    fn test_discover_finds_nested_repos_but_not_inside_repos() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        for repo in ["a", "b/c", "a/vendored"] {
            fs::create_dir_all(root.join(repo).join(".git")).unwrap();
        }
        fs::create_dir_all(root.join("plain/dir")).unwrap();

        let mut found = discover(root, probe::is_git_root);
        found.sort();
        assert_eq!(found, vec![root.join("a"), root.join("b/c")]);
    }
}

// src/models.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

// --- REGISTRY MODELS ---

/// A single registered repository: its short name and absolute root path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRecord {
    pub name: String,
    pub path: PathBuf,
}

impl RepoRecord {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Renders the record as one line of the repo path file.
    pub fn to_line(&self) -> String {
        format!("{},{}\n", self.path.display(), self.name)
    }
}

/// Name → path mapping that remembers load order.
///
/// Names are unique keys. Lookups are linear, which is fine for the few hundred
/// repositories a person realistically tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMap {
    records: Vec<RepoRecord>,
}

impl RepoMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.path.as_path())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.records.iter().any(|r| r.name == name)
    }

    pub fn contains_path(&self, path: &Path) -> bool {
        self.records.iter().any(|r| r.path == path)
    }

    /// Appends a record. Returns `false` (and leaves the map untouched) if the
    /// name is already taken.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> bool {
        let name = name.into();
        if self.contains_name(&name) {
            return false;
        }
        self.records.push(RepoRecord::new(name, path));
        true
    }

    /// Replaces the key `old` with `new` in place, keeping position and path.
    /// Returns `false` if `old` is absent.
    pub fn rename_key(&mut self, old: &str, new: &str) -> bool {
        match self.records.iter_mut().find(|r| r.name == old) {
            Some(record) => {
                record.name = new.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<RepoRecord> {
        let pos = self.records.iter().position(|r| r.name == name)?;
        Some(self.records.remove(pos))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RepoRecord> {
        self.records.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }
}

impl<'a> IntoIterator for &'a RepoMap {
    type Item = &'a RepoRecord;
    type IntoIter = std::slice::Iter<'a, RepoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<N: Into<String>, P: Into<PathBuf>> FromIterator<(N, P)> for RepoMap {
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        let mut map = RepoMap::new();
        for (name, path) in iter {
            map.insert(name, path);
        }
        map
    }
}

// --- GROUP MODELS ---

/// Group name → ordered repo names, as stored in `groups.toml`.
pub type GroupMap = BTreeMap<String, Vec<String>>;

// --- EXECUTION MODELS ---

/// One unit of work for the command runner: run `argv` inside `cwd`, label output with `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTask {
    pub name: String,
    pub cwd: PathBuf,
    pub argv: Vec<String>,
}

impl CommandTask {
    pub fn new(name: impl Into<String>, cwd: impl Into<PathBuf>, argv: Vec<String>) -> Self {
        Self {
            name: name.into(),
            cwd: cwd.into(),
            argv,
        }
    }
}

// --- COMMAND DEFINITION MODELS (FOR cmds.yml) ---

/// A named command users can fan out across repos, e.g. `fetch: { cmd: git fetch, help: ... }`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CmdDefinition {
    pub cmd: String,
    pub help: String,
    /// When set, running the command with no repo names targets every repo
    /// instead of the active context.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub allow_all: bool,
    /// Run through `sh -c` rather than splitting into argv.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub shell: bool,
}

/// Command name → definition.
pub type CmdMap = HashMap<String, CmdDefinition>;

// src/system/probe.rs

use std::path::Path;
use std::process::{Command as StdCommand, Output, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Could not run '{command}' in '{repo}': {source}")]
    Spawn {
        command: String,
        repo: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{command}' failed in '{repo}' (exit code {code:?}): {stderr}")]
    Failed {
        command: String,
        repo: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Read-only queries against a repository's working tree.
///
/// Every call names the repository directory explicitly, so probes never depend
/// on (or change) the process working directory and may run from any thread.
pub trait VcsProbe {
    /// Current branch name, or a short commit id when HEAD is detached.
    fn head(&self, repo: &Path) -> Result<String, ProbeError>;

    /// Whether tracked files differ from HEAD (staged or not).
    fn is_dirty(&self, repo: &Path) -> Result<bool, ProbeError>;

    /// Whether untracked, non-ignored files exist.
    fn has_untracked(&self, repo: &Path) -> Result<bool, ProbeError>;

    /// Subject line of the last commit, empty when there are no commits yet.
    fn commit_message(&self, repo: &Path) -> Result<String, ProbeError>;

    /// Relative time of the last commit, in parentheses, e.g. `(3 days ago)`.
    /// Empty when there are no commits yet.
    fn commit_time(&self, repo: &Path) -> Result<String, ProbeError>;
}

/// Returns `true` if `path` is the top-level directory of a git working tree.
///
/// Only checks for a `.git` entry (directory for normal clones, file for
/// worktrees and submodules), so it is cheap enough to run on every load.
pub fn is_git_root(path: &Path) -> bool {
    path.is_dir() && path.join(".git").exists()
}

/// [`VcsProbe`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitProbe {
    program: String,
}

impl Default for GitProbe {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitProbe {
    pub fn new() -> Self {
        Self::default()
    }

    fn run(&self, repo: &Path, args: &[&str]) -> Result<Output, ProbeError> {
        log::trace!("probe: {} {} in '{}'", self.program, args.join(" "), repo.display());
        StdCommand::new(&self.program)
            .args(args)
            .current_dir(dunce::simplified(repo))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ProbeError::Spawn {
                command: self.describe_command(args),
                repo: repo.display().to_string(),
                source: e,
            })
    }

    fn run_capture(&self, repo: &Path, args: &[&str]) -> Result<String, ProbeError> {
        let output = self.run(repo, args)?;
        if !output.status.success() {
            return Err(self.failure(repo, args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn failure(&self, repo: &Path, args: &[&str], output: &Output) -> ProbeError {
        ProbeError::Failed {
            command: self.describe_command(args),
            repo: repo.display().to_string(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// `false` on a freshly initialized repo whose HEAD points at an unborn branch.
    fn has_commits(&self, repo: &Path) -> Result<bool, ProbeError> {
        let args = ["rev-parse", "--verify", "-q", "HEAD"];
        let output = self.run(repo, &args)?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(self.failure(repo, &args, &output)),
        }
    }

    /// Runs a `--quiet` diff: exit 0 means no changes, 1 means changes.
    fn quiet_diff(&self, repo: &Path, args: &[&str]) -> Result<bool, ProbeError> {
        let output = self.run(repo, args)?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(self.failure(repo, args, &output)),
        }
    }

    fn describe_command(&self, args: &[&str]) -> String {
        format!("{} {}", self.program, args.join(" "))
    }
}

impl VcsProbe for GitProbe {
    fn head(&self, repo: &Path) -> Result<String, ProbeError> {
        // symbolic-ref also works on an unborn branch; it fails only when detached.
        let output = self.run(repo, &["symbolic-ref", "--short", "-q", "HEAD"])?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }
        self.run_capture(repo, &["rev-parse", "--short", "HEAD"])
    }

    fn is_dirty(&self, repo: &Path) -> Result<bool, ProbeError> {
        if self.has_commits(repo)? {
            return self.quiet_diff(repo, &["diff", "--quiet", "HEAD"]);
        }
        // Unborn HEAD: anything staged, or edited after staging, is a change.
        Ok(self.quiet_diff(repo, &["diff", "--cached", "--quiet"])?
            || self.quiet_diff(repo, &["diff", "--quiet"])?)
    }

    fn has_untracked(&self, repo: &Path) -> Result<bool, ProbeError> {
        let listing = self.run_capture(repo, &["ls-files", "-zo", "--exclude-standard"])?;
        Ok(!listing.is_empty())
    }

    fn commit_message(&self, repo: &Path) -> Result<String, ProbeError> {
        if !self.has_commits(repo)? {
            return Ok(String::new());
        }
        self.run_capture(repo, &["log", "-1", "--format=%s"])
    }

    fn commit_time(&self, repo: &Path) -> Result<String, ProbeError> {
        if !self.has_commits(repo)? {
            return Ok(String::new());
        }
        let time = self.run_capture(repo, &["log", "-1", "--format=%cd", "--date=relative"])?;
        Ok(format!("({})", time))
    }
}

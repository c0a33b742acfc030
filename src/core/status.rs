// src/core/status.rs

use crate::constants::LABEL_WIDTH;
use crate::core::color::{self, AnsiColor};
use crate::system::probe::{ProbeError, VcsProbe};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Everything that goes into one status line, before any rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub name: String,
    pub head: String,
    pub dirty: bool,
    pub untracked: bool,
    pub commit_msg: String,
    pub commit_time: String,
}

impl StatusLine {
    /// Queries `probe` for the repository at `path`.
    ///
    /// The calls run one after another and all carry `path`; nothing here
    /// touches the process working directory.
    pub fn probe<P: VcsProbe + ?Sized>(
        probe: &P,
        name: &str,
        path: &Path,
    ) -> Result<Self, ProbeError> {
        let head = probe.head(path)?;
        let dirty = probe.is_dirty(path)?;
        let untracked = probe.has_untracked(path)?;
        let commit_msg = probe.commit_message(path)?;
        let commit_time = probe.commit_time(path)?;
        Ok(Self {
            name: name.to_string(),
            head,
            dirty,
            untracked,
            commit_msg,
            commit_time,
        })
    }

    /// Status markers: `*` dirty, `+` untracked, and always a closing `_`.
    pub fn markers(&self) -> String {
        let mut markers = String::with_capacity(3);
        if self.dirty {
            markers.push('*');
        }
        if self.untracked {
            markers.push('+');
        }
        markers.push('_');
        markers
    }

    /// Head plus markers, padded to the fixed label width. Never truncated.
    pub fn label(&self) -> String {
        let text = format!("{} {}", self.head, self.markers());
        format!("{:<width$}", text, width = LABEL_WIDTH)
    }

    pub fn label_color(&self) -> AnsiColor {
        if self.dirty {
            AnsiColor::Red
        } else {
            AnsiColor::Green
        }
    }

    /// `"<name> <label> <commit message> <commit time>"`, painted only when `use_color`.
    pub fn render(&self, use_color: bool) -> String {
        let label = if use_color {
            color::paint(&self.label(), self.label_color())
        } else {
            self.label()
        };
        format!(
            "{} {} {} {}",
            self.name, label, self.commit_msg, self.commit_time
        )
    }
}

/// Lazily describes each `(name, path)` pair, in the order given.
///
/// Each item is produced only when the iterator is advanced, with fresh probe
/// calls; re-describing means calling this again. A failing probe yields an
/// `Err` for that repository and the iteration carries on with the next one.
/// Paths are trusted to be working-tree roots.
pub fn describe<'a, P, I>(
    repos: I,
    probe: &'a P,
    use_color: bool,
) -> impl Iterator<Item = Result<String, ProbeError>> + 'a
where
    P: VcsProbe + ?Sized,
    I: IntoIterator<Item = (String, PathBuf)>,
    I::IntoIter: 'a,
{
    repos.into_iter().map(move |(name, path)| {
        log::debug!("Describing '{}' at '{}'", name, path.display());
        StatusLine::probe(probe, &name, &path).map(|line| line.render(use_color))
    })
}

/// Describes every pair on the rayon pool and returns the lines in input order.
pub fn describe_parallel<P>(
    repos: &[(String, PathBuf)],
    probe: &P,
    use_color: bool,
) -> Vec<Result<String, ProbeError>>
where
    P: VcsProbe + Sync + ?Sized,
{
    log::trace!("Describing {} repos in parallel.", repos.len());
    repos
        .par_iter()
        .map(|(name, path)| StatusLine::probe(probe, name, path).map(|l| l.render(use_color)))
        .collect()
}

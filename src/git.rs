//! Git integration for file discovery
//!
//! Candidate files for planning come from the repository index: either
//! what is staged for the next commit or everything that is tracked.

use anyhow::{Context, Result};
use git2::{Repository, Status, StatusOptions};
use std::path::Path;

pub struct GitOperations {
    repo: Repository,
}

impl GitOperations {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::open(path).context("Failed to open Git repository")?;
        Ok(Self { repo })
    }

    /// Discover and open the repository containing `path`
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path).context("No Git repository found")?;
        Ok(Self { repo })
    }

    /// Files added, modified, renamed or retyped in the index; deletions are left out
    pub fn staged_files(&self) -> Result<Vec<String>> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(false).include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .context("Failed to get repository status")?;

        let mut files: Vec<String> = statuses
            .iter()
            .filter(|entry| {
                entry.status().intersects(
                    Status::INDEX_NEW
                        | Status::INDEX_MODIFIED
                        | Status::INDEX_RENAMED
                        | Status::INDEX_TYPECHANGE,
                )
            })
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect();

        files.sort();
        Ok(files)
    }

    /// Every path in the index
    pub fn tracked_files(&self) -> Result<Vec<String>> {
        let index = self.repo.index().context("Failed to read repository index")?;

        Ok(index
            .iter()
            .filter_map(|entry| String::from_utf8(entry.path).ok())
            .collect())
    }
}

//! Hook pipeline descriptor
//!
//! This module holds the typed model of a `.pre-commit-config.yaml` document:
//! an ordered list of hook repositories, each pinned to a revision and
//! exposing an ordered list of hooks. Order is execution order.
//!
//! ```yaml
//! default_language_version:
//!   python: python3.12
//! repos:
//!   - repo: https://github.com/pre-commit/pre-commit-hooks
//!     rev: v4.6.0
//!     hooks:
//!       - id: check-json
//!       - id: check-added-large-files
//!         args: ["--maxkb=500"]
//! ```
//!
//! Loading is pure: [`PipelineConfig::from_yaml_str`] only checks structure.
//! Checking hook ids against what each source advertises is done by
//! [`PipelineConfig::resolve`] with a [`HookCatalog`](crate::catalog::HookCatalog).

mod load;
mod raw;
mod resolve;

pub use load::{load_and_resolve, load_file};
pub use resolve::{ResolvedHook, ResolvedPipeline};

use indexmap::IndexMap;
use fancy_regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Sentinel `repo` value for hooks defined inline in the config
pub const LOCAL_REPO: &str = "local";

/// Sentinel `repo` value for the built-in meta hooks
pub const META_REPO: &str = "meta";

/// A fully loaded pipeline descriptor
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    /// Default tool version pins, keyed by language/tool name
    pub default_language_version: IndexMap<String, String>,

    /// Stages used by hooks that do not set their own
    pub default_stages: Option<Vec<Stage>>,

    /// Global include filter applied before every hook's own filter
    pub files: Option<FilePattern>,

    /// Global exclude filter
    pub exclude: Option<FilePattern>,

    pub fail_fast: Option<bool>,

    pub minimum_pre_commit_version: Option<String>,

    /// Hook repositories in execution order
    pub repos: Vec<RepoEntry>,

    /// Keys this crate does not interpret, kept for round-tripping
    pub extra: IndexMap<String, serde_yml::Value>,
}

impl PipelineConfig {
    /// Total number of hook entries across all repositories
    pub fn hook_count(&self) -> usize {
        self.repos.iter().map(|repo| repo.hooks.len()).sum()
    }
}

/// One repository source and the hooks used from it
#[derive(Debug, Clone, PartialEq)]
pub struct RepoEntry {
    pub source: RepoSource,
    /// Hooks in execution order; ids are unique within the entry
    pub hooks: Vec<HookEntry>,
    pub extra: IndexMap<String, serde_yml::Value>,
}

impl RepoEntry {
    /// Find a hook entry by id
    pub fn hook(&self, id: &str) -> Option<&HookEntry> {
        self.hooks.iter().find(|hook| hook.id == id)
    }
}

/// Where a repo entry's hooks come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoSource {
    /// A fetchable hook repository pinned to a revision
    Remote { url: String, rev: Revision },
    /// Hooks fully defined in the config (`repo: local`)
    Local,
    /// Built-in hooks that check the config itself (`repo: meta`)
    Meta,
}

impl RepoSource {
    /// The `repo` value as written in the document
    pub fn repo(&self) -> &str {
        match self {
            RepoSource::Remote { url, .. } => url,
            RepoSource::Local => LOCAL_REPO,
            RepoSource::Meta => META_REPO,
        }
    }

    pub fn rev(&self) -> Option<&Revision> {
        match self {
            RepoSource::Remote { rev, .. } => Some(rev),
            RepoSource::Local | RepoSource::Meta => None,
        }
    }
}

impl fmt::Display for RepoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepoSource::Remote { url, rev } => write!(f, "{url}@{rev}"),
            other => f.write_str(other.repo()),
        }
    }
}

/// A single hook invocation inside a repo entry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HookEntry {
    /// Hook id, which must be advertised by the parent source
    pub id: String,
    pub alias: Option<String>,
    /// Display name override
    pub name: Option<String>,
    /// Command to run (local hooks only)
    pub entry: Option<String>,
    /// Language environment (local hooks only)
    pub language: Option<String>,
    pub language_version: Option<String>,
    pub args: Option<Vec<String>>,
    /// Restricts the paths this hook runs against
    pub files: Option<FilePattern>,
    pub exclude: Option<FilePattern>,
    pub stages: Option<Vec<Stage>>,
    pub always_run: Option<bool>,
    pub pass_filenames: Option<bool>,
    pub verbose: Option<bool>,
    /// Package specifiers installed alongside the hook, without duplicates
    pub additional_dependencies: Option<Vec<String>>,
    pub extra: IndexMap<String, serde_yml::Value>,
}

impl HookEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// An immutable revision pin (tag or commit); never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    /// Returns `None` for empty or whitespace-only input
    pub fn new(rev: impl Into<String>) -> Option<Self> {
        let rev = rev.into();
        if rev.trim().is_empty() {
            None
        } else {
            Some(Self(rev))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the pin looks like a tag or a commit id rather than a branch
    pub fn is_immutable(&self) -> bool {
        let rev = self.0.as_str();

        // v1.0.0, v2.1.3-beta
        if let Some(rest) = rev.strip_prefix('v') {
            if rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                return true;
            }
        }

        // Short or full commit id
        if (7..=40).contains(&rev.len()) && rev.chars().all(|c| c.is_ascii_hexdigit()) {
            return true;
        }

        // 1.0.0 without the prefix
        rev.chars().next().is_some_and(|c| c.is_ascii_digit()) && rev.contains('.')
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Git hook event a pipeline hook can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    #[serde(alias = "commit")]
    PreCommit,
    #[serde(alias = "merge-commit")]
    PreMergeCommit,
    #[serde(alias = "push")]
    PrePush,
    PrepareCommitMsg,
    CommitMsg,
    PostCheckout,
    PostCommit,
    PostMerge,
    PostRewrite,
    PreRebase,
    Manual,
}

impl Stage {
    pub const ALL: [Stage; 11] = [
        Stage::PreCommit,
        Stage::PreMergeCommit,
        Stage::PrePush,
        Stage::PrepareCommitMsg,
        Stage::CommitMsg,
        Stage::PostCheckout,
        Stage::PostCommit,
        Stage::PostMerge,
        Stage::PostRewrite,
        Stage::PreRebase,
        Stage::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::PreCommit => "pre-commit",
            Stage::PreMergeCommit => "pre-merge-commit",
            Stage::PrePush => "pre-push",
            Stage::PrepareCommitMsg => "prepare-commit-msg",
            Stage::CommitMsg => "commit-msg",
            Stage::PostCheckout => "post-checkout",
            Stage::PostCommit => "post-commit",
            Stage::PostMerge => "post-merge",
            Stage::PostRewrite => "post-rewrite",
            Stage::PreRebase => "pre-rebase",
            Stage::Manual => "manual",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "commit" => return Ok(Stage::PreCommit),
            "merge-commit" => return Ok(Stage::PreMergeCommit),
            "push" => return Ok(Stage::PrePush),
            _ => {}
        }
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("unknown stage `{s}`"))
    }
}

/// A path filter regex, compiled when the document is loaded
///
/// Matching is unanchored: the pattern may match anywhere in the path.
/// Look-around and backreferences are accepted, as in Python's `re`.
#[derive(Debug, Clone)]
pub struct FilePattern {
    source: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(source: impl Into<String>) -> Result<Self, fancy_regex::Error> {
        let source = source.into();
        let regex = Regex::new(&source)?;
        Ok(Self { source, regex })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// A match that exceeds the backtracking limit counts as no match
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path).unwrap_or_else(|err| {
            tracing::warn!("Pattern `{}` gave up on {}: {}", self.source, path, err);
            false
        })
    }
}

impl PartialEq for FilePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for FilePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for FilePattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        FilePattern::new(source.as_str()).map_err(|err| {
            serde::de::Error::custom(format!("invalid regex `{source}`: {err}"))
        })
    }
}

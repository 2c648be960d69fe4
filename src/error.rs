//! Error types for loading and resolving hook pipelines
//!
//! Every failure carries the [`Position`] of the entry that caused it so the
//! CLI can point the user at the offending repo or hook.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Location of an entry inside a pipeline document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// A point in the raw text, used for YAML syntax errors
    Text { line: usize, column: usize },
    /// The top-level mapping
    Root,
    /// `repos[repo]`
    Repo { repo: usize },
    /// `repos[repo].hooks[hook]`
    Hook { repo: usize, hook: usize },
}

impl Position {
    /// Index of the repo entry this position points into, if any
    pub fn repo_index(&self) -> Option<usize> {
        match self {
            Position::Repo { repo } | Position::Hook { repo, .. } => Some(*repo),
            _ => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Text { line, column } => write!(f, "line {line}, column {column}"),
            Position::Root => f.write_str("document root"),
            Position::Repo { repo } => write!(f, "repos[{repo}]"),
            Position::Hook { repo, hook } => write!(f, "repos[{repo}].hooks[{hook}]"),
        }
    }
}

/// Terminal errors raised while loading or resolving a pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Structural or syntax problem in the document
    #[error("malformed config at {position}: {message}")]
    MalformedConfig { position: Position, message: String },

    /// A hook id that its source does not advertise
    #[error(
        "unknown hook id `{id}` at {position}: not advertised by {repo} (available: {})",
        available_list(.available)
    )]
    UnknownHookId {
        position: Position,
        repo: String,
        id: String,
        available: Vec<String>,
    },

    /// A revision pin that could not be fetched or found
    #[error("unresolvable revision `{rev}` for {repo} at {position}: {reason}")]
    UnresolvableRevision {
        position: Position,
        repo: String,
        rev: String,
        reason: String,
    },

    /// The hook repository's manifest is missing or invalid at the pinned revision
    #[error("invalid hook manifest for {repo}@{rev} at {position}: {reason}")]
    InvalidManifest {
        position: Position,
        repo: String,
        rev: String,
        reason: String,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize pipeline as {format}: {message}")]
    Serialize {
        format: &'static str,
        message: String,
    },
}

impl PipelineError {
    pub(crate) fn malformed(position: Position, message: impl Into<String>) -> Self {
        PipelineError::MalformedConfig {
            position,
            message: message.into(),
        }
    }

    /// Position of the offending entry, when the error has one
    pub fn position(&self) -> Option<Position> {
        match self {
            PipelineError::MalformedConfig { position, .. }
            | PipelineError::UnknownHookId { position, .. }
            | PipelineError::UnresolvableRevision { position, .. }
            | PipelineError::InvalidManifest { position, .. } => Some(*position),
            PipelineError::Io { .. } | PipelineError::Serialize { .. } => None,
        }
    }
}

fn available_list(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display() {
        assert_eq!(Position::Repo { repo: 2 }.to_string(), "repos[2]");
        assert_eq!(
            Position::Hook { repo: 0, hook: 3 }.to_string(),
            "repos[0].hooks[3]"
        );
        assert_eq!(
            Position::Text { line: 4, column: 7 }.to_string(),
            "line 4, column 7"
        );
    }

    #[test]
    fn test_unknown_hook_message_lists_available_ids() {
        let err = PipelineError::UnknownHookId {
            position: Position::Hook { repo: 1, hook: 0 },
            repo: "https://example.com/hooks".to_string(),
            id: "check-jsn".to_string(),
            available: vec!["check-json".to_string(), "check-yaml".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("repos[1].hooks[0]"));
        assert!(message.contains("check-json, check-yaml"));
        assert_eq!(err.position().and_then(|p| p.repo_index()), Some(1));
    }
}

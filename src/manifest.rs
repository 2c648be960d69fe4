//! Hook repository manifests
//!
//! A hook repository advertises its hooks in `.pre-commit-hooks.yaml` at the
//! repository root, as a list of hook definitions.

use crate::catalog::CatalogError;
use crate::pipeline::{FilePattern, HookEntry, Stage};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// File name of the manifest inside a hook repository
pub const MANIFEST_FILE: &str = ".pre-commit-hooks.yaml";

/// A hook as advertised by its source repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookDefinition {
    pub id: String,
    pub name: String,
    pub entry: String,
    pub language: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<FilePattern>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<FilePattern>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Empty means every stage
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<Stage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_run: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_filenames: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_pre_commit_version: Option<String>,
}

impl HookDefinition {
    /// Minimal definition carrying only an id
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            entry: String::new(),
            language: "system".to_string(),
            description: None,
            files: None,
            exclude: None,
            args: Vec::new(),
            stages: Vec::new(),
            always_run: None,
            pass_filenames: None,
            minimum_pre_commit_version: None,
        }
    }

    /// Definition implied by a `repo: local` hook entry
    pub fn from_local(entry: &HookEntry) -> Self {
        Self {
            id: entry.id.clone(),
            name: entry.name.clone().unwrap_or_else(|| entry.id.clone()),
            entry: entry.entry.clone().unwrap_or_default(),
            language: entry.language.clone().unwrap_or_else(|| "system".to_string()),
            description: None,
            files: entry.files.clone(),
            exclude: entry.exclude.clone(),
            args: entry.args.clone().unwrap_or_default(),
            stages: entry.stages.clone().unwrap_or_default(),
            always_run: entry.always_run,
            pass_filenames: entry.pass_filenames,
            minimum_pre_commit_version: None,
        }
    }
}

/// Parse manifest text into hook definitions, in file order
pub fn parse_manifest(text: &str) -> Result<Vec<HookDefinition>, CatalogError> {
    let hooks: Vec<HookDefinition> =
        serde_yml::from_str(text).map_err(|err| CatalogError::Manifest {
            reason: format!("{MANIFEST_FILE}: {err}"),
        })?;

    let mut seen = HashSet::new();
    for hook in &hooks {
        if hook.id.trim().is_empty() {
            return Err(CatalogError::Manifest {
                reason: format!("{MANIFEST_FILE}: hook with empty id"),
            });
        }
        if !seen.insert(hook.id.as_str()) {
            return Err(CatalogError::Manifest {
                reason: format!("{MANIFEST_FILE}: duplicate hook id `{}`", hook.id),
            });
        }
    }

    Ok(hooks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let hooks = parse_manifest(
            r#"
- id: check-json
  name: check json
  description: checks json files for parseable syntax.
  entry: check-json
  language: python
  types: [json]
- id: trailing-whitespace
  name: trim trailing whitespace
  entry: trailing-whitespace-fixer
  language: python
  stages: [pre-commit, pre-push, manual]
  files: '\.(py|md)$'
"#,
        )
        .unwrap();

        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks[0].id, "check-json");
        assert!(hooks[0].stages.is_empty());
        assert_eq!(hooks[1].stages, [Stage::PreCommit, Stage::PrePush, Stage::Manual]);
        assert!(hooks[1].files.as_ref().unwrap().is_match("README.md"));
    }

    #[test]
    fn test_manifest_requires_core_fields() {
        let err = parse_manifest("- id: lonely\n").unwrap_err();
        assert!(matches!(err, CatalogError::Manifest { .. }));
    }

    #[test]
    fn test_manifest_rejects_duplicates_and_non_lists() {
        let dup = "- {id: a, name: a, entry: a, language: system}\n- {id: a, name: b, entry: b, language: system}\n";
        assert!(parse_manifest(dup).unwrap_err().to_string().contains("duplicate"));
        assert!(parse_manifest("hooks: {}\n").is_err());
    }

    #[test]
    fn test_definition_from_local_entry() {
        let mut entry = HookEntry::new("fmt");
        entry.entry = Some("cargo fmt --check".to_string());
        entry.language = Some("system".to_string());
        entry.pass_filenames = Some(false);

        let def = HookDefinition::from_local(&entry);
        assert_eq!(def.name, "fmt");
        assert_eq!(def.entry, "cargo fmt --check");
        assert_eq!(def.pass_filenames, Some(false));
    }
}

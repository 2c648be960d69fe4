//! Serde shapes of the on-disk document
//!
//! Every field is optional here; requiredness is checked in `load` where the
//! entry's position is known. Nested lists default to untyped YAML values so
//! each repo and hook can be deserialized on its own.

use super::{FilePattern, Stage};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yml::Value;

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RawDocument<R = Value> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_language_version: Option<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_stages: Option<Vec<Stage>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<FilePattern>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<FilePattern>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_fast: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_pre_commit_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repos: Option<Vec<R>>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RawRepo<H = Value> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Vec<H>>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct RawHook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<FilePattern>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<FilePattern>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stages: Option<Vec<Stage>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_run: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_filenames: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_dependencies: Option<Vec<String>>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

//! Hook catalogs
//!
//! A catalog answers which hooks a source repository advertises at a given
//! revision. [`RepoStore`](crate::store::RepoStore) is the git-backed catalog;
//! [`StaticCatalog`] is an in-memory one.

use crate::manifest::HookDefinition;
use crate::pipeline::{FilePattern, Revision};
use std::collections::HashMap;
use thiserror::Error;

/// Why a catalog could not produce hook definitions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The revision (or the repository) cannot be found or fetched
    #[error("{reason}")]
    Unresolvable { reason: String },

    /// The revision exists but its manifest is missing or invalid
    #[error("{reason}")]
    Manifest { reason: String },
}

/// Source of advertised hook definitions
pub trait HookCatalog {
    /// Hooks advertised by `url` at `rev`, in manifest order
    fn advertised_hooks(
        &self,
        url: &str,
        rev: &Revision,
    ) -> Result<Vec<HookDefinition>, CatalogError>;
}

impl<T: HookCatalog + ?Sized> HookCatalog for &T {
    fn advertised_hooks(
        &self,
        url: &str,
        rev: &Revision,
    ) -> Result<Vec<HookDefinition>, CatalogError> {
        (**self).advertised_hooks(url, rev)
    }
}

/// In-memory catalog keyed by repository and revision
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    repos: HashMap<String, HashMap<String, Vec<HookDefinition>>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: &str, rev: &str, hooks: Vec<HookDefinition>) {
        self.repos
            .entry(url.to_string())
            .or_default()
            .insert(rev.to_string(), hooks);
    }

    /// Builder form of [`insert`](Self::insert) taking bare hook ids
    pub fn with_ids(mut self, url: &str, rev: &str, ids: &[&str]) -> Self {
        self.insert(url, rev, ids.iter().map(|id| HookDefinition::new(*id)).collect());
        self
    }
}

impl HookCatalog for StaticCatalog {
    fn advertised_hooks(
        &self,
        url: &str,
        rev: &Revision,
    ) -> Result<Vec<HookDefinition>, CatalogError> {
        let revisions = self.repos.get(url).ok_or_else(|| CatalogError::Unresolvable {
            reason: format!("repository {url} is not known"),
        })?;

        revisions
            .get(rev.as_str())
            .cloned()
            .ok_or_else(|| CatalogError::Unresolvable {
                reason: format!("revision `{rev}` is not known for {url}"),
            })
    }
}

/// Hooks available under `repo: meta`
pub fn meta_hooks() -> Vec<HookDefinition> {
    let config_only = FilePattern::new(r"^\.pre-commit-config\.yaml$").ok();

    vec![
        HookDefinition {
            name: "Check hooks apply to the repository".to_string(),
            files: config_only.clone(),
            ..HookDefinition::new("check-hooks-apply")
        },
        HookDefinition {
            name: "Check for useless excludes".to_string(),
            files: config_only,
            ..HookDefinition::new("check-useless-excludes")
        },
        HookDefinition::new("identity"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_catalog_lookup() {
        let catalog = StaticCatalog::new().with_ids(
            "https://example.com/hooks",
            "v1.0.0",
            &["check-json", "check-yaml"],
        );
        let rev = Revision::new("v1.0.0").unwrap();

        let hooks = catalog
            .advertised_hooks("https://example.com/hooks", &rev)
            .unwrap();
        let ids: Vec<&str> = hooks.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, ["check-json", "check-yaml"]);
    }

    #[test]
    fn test_static_catalog_unknown_revision() {
        let catalog = StaticCatalog::new().with_ids("https://example.com/hooks", "v1.0.0", &["a"]);

        let err = catalog
            .advertised_hooks("https://example.com/hooks", &Revision::new("v9").unwrap())
            .unwrap_err();
        assert!(matches!(err, CatalogError::Unresolvable { .. }));

        let err = catalog
            .advertised_hooks("https://example.com/other", &Revision::new("v1.0.0").unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("not known"));
    }

    #[test]
    fn test_meta_hooks() {
        let ids: Vec<String> = meta_hooks().into_iter().map(|h| h.id).collect();
        assert_eq!(ids, ["check-hooks-apply", "check-useless-excludes", "identity"]);
        assert!(meta_hooks()[0].files.as_ref().unwrap().is_match(".pre-commit-config.yaml"));
    }
}

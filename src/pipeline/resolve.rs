use super::{HookEntry, PipelineConfig, RepoEntry, RepoSource};
use crate::catalog::{CatalogError, HookCatalog, meta_hooks};
use crate::error::{PipelineError, Position};
use crate::manifest::HookDefinition;
use std::collections::HashMap;

/// A pipeline whose hook ids have been checked against their sources
#[derive(Debug, Clone)]
pub struct ResolvedPipeline {
    config: PipelineConfig,
    /// Parallel to `config.repos[i].hooks[j]`; `None` when not looked up
    definitions: Vec<Vec<Option<HookDefinition>>>,
}

/// One hook entry together with its advertised definition
#[derive(Debug, Clone, Copy)]
pub struct ResolvedHook<'a> {
    pub repo_index: usize,
    pub hook_index: usize,
    pub repo: &'a RepoEntry,
    pub entry: &'a HookEntry,
    pub definition: Option<&'a HookDefinition>,
}

impl<'a> ResolvedHook<'a> {
    /// Name shown to users: entry override, then definition, then id
    pub fn display_name(&self) -> &'a str {
        self.entry
            .name
            .as_deref()
            .or(self.definition.map(|def| def.name.as_str()))
            .unwrap_or(&self.entry.id)
    }
}

impl PipelineConfig {
    /// Check every hook id against what its source advertises
    ///
    /// Sources are queried in declaration order and each `(repo, rev)` pair
    /// at most once. The first failure is returned.
    pub fn resolve(self, catalog: &dyn HookCatalog) -> Result<ResolvedPipeline, PipelineError> {
        let mut advertised: HashMap<(String, String), Vec<HookDefinition>> = HashMap::new();
        let meta = meta_hooks();
        let mut definitions = Vec::with_capacity(self.repos.len());

        for (repo_index, repo) in self.repos.iter().enumerate() {
            let available: &[HookDefinition] = match &repo.source {
                RepoSource::Remote { url, rev } => {
                    let key = (url.clone(), rev.as_str().to_string());
                    if !advertised.contains_key(&key) {
                        tracing::debug!("Looking up hooks for {}@{}", url, rev);
                        let hooks = catalog.advertised_hooks(url, rev).map_err(|err| {
                            catalog_error(err, Position::Repo { repo: repo_index }, repo)
                        })?;
                        advertised.insert(key.clone(), hooks);
                    }
                    &advertised[&key]
                }
                RepoSource::Meta => &meta,
                RepoSource::Local => {
                    definitions.push(
                        repo.hooks
                            .iter()
                            .map(|hook| Some(HookDefinition::from_local(hook)))
                            .collect(),
                    );
                    continue;
                }
            };

            definitions.push(match_hooks(repo_index, repo, available)?);
        }

        Ok(ResolvedPipeline {
            config: self,
            definitions,
        })
    }
}

impl ResolvedPipeline {
    /// Resolve without contacting any source
    ///
    /// Local and meta hooks are still checked; remote hooks carry no
    /// definition.
    pub fn offline(config: PipelineConfig) -> Result<Self, PipelineError> {
        let meta = meta_hooks();
        let mut definitions = Vec::with_capacity(config.repos.len());

        for (repo_index, repo) in config.repos.iter().enumerate() {
            definitions.push(match &repo.source {
                RepoSource::Remote { .. } => vec![None; repo.hooks.len()],
                RepoSource::Meta => match_hooks(repo_index, repo, &meta)?,
                RepoSource::Local => repo
                    .hooks
                    .iter()
                    .map(|hook| Some(HookDefinition::from_local(hook)))
                    .collect(),
            });
        }

        Ok(Self {
            config,
            definitions,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Whether every hook has a definition
    pub fn is_complete(&self) -> bool {
        self.definitions.iter().flatten().all(Option::is_some)
    }

    /// All hooks in execution order
    pub fn hooks(&self) -> impl Iterator<Item = ResolvedHook<'_>> {
        self.config
            .repos
            .iter()
            .zip(&self.definitions)
            .enumerate()
            .flat_map(|(repo_index, (repo, defs))| {
                repo.hooks
                    .iter()
                    .zip(defs)
                    .enumerate()
                    .map(move |(hook_index, (entry, definition))| ResolvedHook {
                        repo_index,
                        hook_index,
                        repo,
                        entry,
                        definition: definition.as_ref(),
                    })
            })
    }
}

fn match_hooks(
    repo_index: usize,
    repo: &RepoEntry,
    available: &[HookDefinition],
) -> Result<Vec<Option<HookDefinition>>, PipelineError> {
    repo.hooks
        .iter()
        .enumerate()
        .map(|(hook_index, hook)| {
            available
                .iter()
                .find(|def| def.id == hook.id)
                .cloned()
                .map(Some)
                .ok_or_else(|| PipelineError::UnknownHookId {
                    position: Position::Hook {
                        repo: repo_index,
                        hook: hook_index,
                    },
                    repo: repo.source.repo().to_string(),
                    id: hook.id.clone(),
                    available: available.iter().map(|def| def.id.clone()).collect(),
                })
        })
        .collect()
}

fn catalog_error(err: CatalogError, position: Position, repo: &RepoEntry) -> PipelineError {
    let url = repo.source.repo().to_string();
    let rev = repo
        .source
        .rev()
        .map(|rev| rev.as_str().to_string())
        .unwrap_or_default();

    match err {
        CatalogError::Unresolvable { reason } => PipelineError::UnresolvableRevision {
            position,
            repo: url,
            rev,
            reason,
        },
        CatalogError::Manifest { reason } => PipelineError::InvalidManifest {
            position,
            repo: url,
            rev,
            reason,
        },
    }
}

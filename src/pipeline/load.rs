use super::raw::{RawDocument, RawHook, RawRepo};
use super::{
    HookEntry, LOCAL_REPO, META_REPO, PipelineConfig, RepoEntry, RepoSource, ResolvedPipeline,
    Revision,
};
use crate::catalog::HookCatalog;
use crate::error::{PipelineError, Position};
use indexmap::IndexMap;
use serde_yml::Value;
use std::collections::HashSet;
use std::path::Path;

/// Read and structurally validate a pipeline file
pub fn load_file(path: impl AsRef<Path>) -> Result<PipelineConfig, PipelineError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Loading pipeline from {}", path.display());
    PipelineConfig::from_yaml_str(&text)
}

/// Parse a document and check every hook id against `catalog`
pub fn load_and_resolve(
    text: &str,
    catalog: &dyn HookCatalog,
) -> Result<ResolvedPipeline, PipelineError> {
    PipelineConfig::from_yaml_str(text)?.resolve(catalog)
}

impl PipelineConfig {
    /// Parse a YAML document into a pipeline without contacting any source
    pub fn from_yaml_str(text: &str) -> Result<Self, PipelineError> {
        if text.trim().is_empty() {
            return Err(PipelineError::malformed(Position::Root, "document is empty"));
        }

        let value: Value = serde_yml::from_str(text).map_err(|err| {
            let position = err
                .location()
                .map(|loc| Position::Text {
                    line: loc.line(),
                    column: loc.column(),
                })
                .unwrap_or(Position::Root);
            PipelineError::malformed(position, err.to_string())
        })?;

        match value {
            Value::Mapping(_) => {}
            Value::Null => {
                return Err(PipelineError::malformed(Position::Root, "document is empty"));
            }
            _ => {
                return Err(PipelineError::malformed(
                    Position::Root,
                    "top level must be a mapping",
                ));
            }
        }

        let raw: RawDocument = serde_yml::from_value(value)
            .map_err(|err| PipelineError::malformed(Position::Root, err.to_string()))?;

        let repos = raw.repos.ok_or_else(|| {
            PipelineError::malformed(Position::Root, "missing required field `repos`")
        })?;

        let default_language_version = raw.default_language_version.unwrap_or_default();
        if let Some((tool, _)) = default_language_version
            .iter()
            .find(|(_, version)| version.trim().is_empty())
        {
            return Err(PipelineError::malformed(
                Position::Root,
                format!("`default_language_version.{tool}` must not be empty"),
            ));
        }

        warn_unknown_keys(&raw.extra, Position::Root);

        let repos = repos
            .into_iter()
            .enumerate()
            .map(|(index, value)| parse_repo(index, value))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Loaded pipeline with {} repos and {} hooks",
            repos.len(),
            repos.iter().map(|repo| repo.hooks.len()).sum::<usize>()
        );

        Ok(PipelineConfig {
            default_language_version,
            default_stages: raw.default_stages,
            files: raw.files,
            exclude: raw.exclude,
            fail_fast: raw.fail_fast,
            minimum_pre_commit_version: raw.minimum_pre_commit_version,
            repos,
            extra: raw.extra,
        })
    }

    /// Serialize back to YAML, keeping repo and hook order
    pub fn to_yaml(&self) -> Result<String, PipelineError> {
        serde_yml::to_string(&self.to_raw()).map_err(|err| PipelineError::Serialize {
            format: "yaml",
            message: err.to_string(),
        })
    }

    pub fn to_json(&self) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(&self.to_raw()).map_err(|err| PipelineError::Serialize {
            format: "json",
            message: err.to_string(),
        })
    }

    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(&self.to_raw()).map_err(|err| PipelineError::Serialize {
            format: "toml",
            message: err.to_string(),
        })
    }

    fn to_raw(&self) -> RawDocument<RawRepo<RawHook>> {
        RawDocument {
            default_language_version: (!self.default_language_version.is_empty())
                .then(|| self.default_language_version.clone()),
            default_stages: self.default_stages.clone(),
            files: self.files.clone(),
            exclude: self.exclude.clone(),
            fail_fast: self.fail_fast,
            minimum_pre_commit_version: self.minimum_pre_commit_version.clone(),
            repos: Some(self.repos.iter().map(RepoEntry::to_raw).collect()),
            extra: self.extra.clone(),
        }
    }
}

impl RepoEntry {
    fn to_raw(&self) -> RawRepo<RawHook> {
        RawRepo {
            repo: Some(self.source.repo().to_string()),
            rev: self.source.rev().map(|rev| rev.as_str().to_string()),
            hooks: Some(self.hooks.iter().map(HookEntry::to_raw).collect()),
            extra: self.extra.clone(),
        }
    }
}

impl HookEntry {
    fn to_raw(&self) -> RawHook {
        RawHook {
            id: Some(self.id.clone()),
            alias: self.alias.clone(),
            name: self.name.clone(),
            entry: self.entry.clone(),
            language: self.language.clone(),
            language_version: self.language_version.clone(),
            args: self.args.clone(),
            files: self.files.clone(),
            exclude: self.exclude.clone(),
            stages: self.stages.clone(),
            always_run: self.always_run,
            pass_filenames: self.pass_filenames,
            verbose: self.verbose,
            additional_dependencies: self.additional_dependencies.clone(),
            extra: self.extra.clone(),
        }
    }
}

fn parse_repo(index: usize, value: Value) -> Result<RepoEntry, PipelineError> {
    let position = Position::Repo { repo: index };
    let raw: RawRepo = serde_yml::from_value(value)
        .map_err(|err| PipelineError::malformed(position, err.to_string()))?;

    let repo = raw
        .repo
        .ok_or_else(|| PipelineError::malformed(position, "missing required field `repo`"))?;

    let source = match repo.as_str() {
        LOCAL_REPO | META_REPO => {
            if raw.rev.is_some() {
                return Err(PipelineError::malformed(
                    position,
                    format!("`rev` is not allowed for `repo: {repo}`"),
                ));
            }
            if repo == LOCAL_REPO {
                RepoSource::Local
            } else {
                RepoSource::Meta
            }
        }
        url if url.trim().is_empty() => {
            return Err(PipelineError::malformed(position, "`repo` must not be empty"));
        }
        url => {
            let rev = raw.rev.ok_or_else(|| {
                PipelineError::malformed(
                    position,
                    format!("missing required field `rev` for {url}"),
                )
            })?;
            let rev = Revision::new(rev).ok_or_else(|| {
                PipelineError::malformed(position, format!("`rev` for {url} must not be empty"))
            })?;
            RepoSource::Remote {
                url: url.to_string(),
                rev,
            }
        }
    };

    let hooks = raw
        .hooks
        .ok_or_else(|| PipelineError::malformed(position, "missing required field `hooks`"))?;
    if hooks.is_empty() {
        return Err(PipelineError::malformed(position, "`hooks` must not be empty"));
    }

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(hooks.len());
    for (hook_index, value) in hooks.into_iter().enumerate() {
        let hook_position = Position::Hook {
            repo: index,
            hook: hook_index,
        };
        let hook = parse_hook(hook_position, value, &source)?;
        if !seen.insert(hook.id.clone()) {
            return Err(PipelineError::malformed(
                hook_position,
                format!("duplicate hook id `{}` in {}", hook.id, source.repo()),
            ));
        }
        entries.push(hook);
    }

    warn_unknown_keys(&raw.extra, position);

    Ok(RepoEntry {
        source,
        hooks: entries,
        extra: raw.extra,
    })
}

fn parse_hook(
    position: Position,
    value: Value,
    source: &RepoSource,
) -> Result<HookEntry, PipelineError> {
    let raw: RawHook = serde_yml::from_value(value)
        .map_err(|err| PipelineError::malformed(position, err.to_string()))?;

    let id = raw
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| PipelineError::malformed(position, "missing required field `id`"))?;

    if matches!(source, RepoSource::Local) {
        let missing: Vec<&str> = [
            ("name", raw.name.is_none()),
            ("entry", raw.entry.is_none()),
            ("language", raw.language.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();

        if !missing.is_empty() {
            return Err(PipelineError::malformed(
                position,
                format!("local hook `{id}` is missing `{}`", missing.join("`, `")),
            ));
        }
    }

    if let Some(deps) = &raw.additional_dependencies {
        let mut seen = HashSet::new();
        if let Some(duplicate) = deps.iter().find(|dep| !seen.insert(dep.as_str())) {
            return Err(PipelineError::malformed(
                position,
                format!("duplicate additional dependency `{duplicate}` in hook `{id}`"),
            ));
        }
    }

    warn_unknown_keys(&raw.extra, position);

    Ok(HookEntry {
        id,
        alias: raw.alias,
        name: raw.name,
        entry: raw.entry,
        language: raw.language,
        language_version: raw.language_version,
        args: raw.args,
        files: raw.files,
        exclude: raw.exclude,
        stages: raw.stages,
        always_run: raw.always_run,
        pass_filenames: raw.pass_filenames,
        verbose: raw.verbose,
        additional_dependencies: raw.additional_dependencies,
        extra: raw.extra,
    })
}

fn warn_unknown_keys(extra: &IndexMap<String, Value>, position: Position) {
    for key in extra.keys() {
        tracing::warn!("Unexpected key `{}` at {}", key, position);
    }
}

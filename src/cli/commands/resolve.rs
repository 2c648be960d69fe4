//! `hookpin resolve`

use super::Context;
use crate::error::{PipelineError, Position};
use crate::pipeline::RepoSource;
use anyhow::{Context as _, Result};

pub async fn execute(ctx: &Context) -> Result<()> {
    let output = &ctx.output;
    let config = ctx.load_config()?;
    let store = ctx.store();

    output.header("Resolving revision pins")?;
    output.verbose(&format!("Cache: {}", store.cache_dir().display()))?;

    for (index, repo) in config.repos.iter().enumerate() {
        let RepoSource::Remote { url, rev } = &repo.source else {
            output.table_row(repo.source.repo(), "no revision")?;
            continue;
        };

        let commit = store
            .resolve(url, rev)
            .map_err(|err| PipelineError::UnresolvableRevision {
                position: Position::Repo { repo: index },
                repo: url.clone(),
                rev: rev.to_string(),
                reason: err.to_string(),
            })
            .with_context(|| format!("Invalid pipeline {}", ctx.config_path().display()))?;

        output.table_row(url, &format!("{rev} -> {commit}"))?;
    }

    Ok(())
}

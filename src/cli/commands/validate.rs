//! `hookpin validate`

use super::Context;
use crate::pipeline::RepoSource;
use anyhow::Result;

pub async fn execute(ctx: &Context) -> Result<()> {
    let output = &ctx.output;
    output.header("Validating pipeline")?;

    let config = ctx.load_config()?;
    output.success(&format!(
        "Structure is valid ({} repos, {} hooks)",
        config.repos.len(),
        config.hook_count()
    ))?;

    let remote = config
        .repos
        .iter()
        .filter(|repo| matches!(repo.source, RepoSource::Remote { .. }))
        .count();

    let resolved = ctx.resolve(config)?;

    if resolved.is_complete() {
        output.success("Every hook id is advertised by its source")?;
    } else {
        output.warning(&format!(
            "Offline: hook ids of {remote} remote repositories were not checked"
        ))?;
    }
    output.table_row("Pipeline", &ctx.config_path().display().to_string())?;

    Ok(())
}

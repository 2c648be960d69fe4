//! `hookpin list`

use super::Context;
use anyhow::Result;

pub async fn execute(ctx: &Context) -> Result<()> {
    let output = &ctx.output;
    let config = ctx.load_config()?;

    output.count("Hook repositories", config.repos.len())?;

    if !config.default_language_version.is_empty() {
        output.section_header("Default language versions")?;
        for (tool, version) in &config.default_language_version {
            output.table_row(tool, version)?;
        }
    }

    for (index, repo) in config.repos.iter().enumerate() {
        output.section_header(&format!("{}. {}", index + 1, repo.source))?;

        for hook in &repo.hooks {
            match &hook.name {
                Some(name) => output.list_item(&format!("{} ({name})", hook.id))?,
                None => output.list_item(&hook.id)?,
            }
            if let Some(args) = &hook.args {
                output.indent(&format!("args: {}", args.join(" ")))?;
            }
            if let Some(files) = &hook.files {
                output.indent(&format!("files: {}", files.as_str()))?;
            }
            if let Some(exclude) = &hook.exclude {
                output.indent(&format!("exclude: {}", exclude.as_str()))?;
            }
            if let Some(stages) = &hook.stages {
                let stages: Vec<&str> = stages.iter().map(|stage| stage.as_str()).collect();
                output.indent(&format!("stages: {}", stages.join(", ")))?;
            }
            if let Some(deps) = &hook.additional_dependencies {
                output.indent(&format!("additional_dependencies: {}", deps.join(", ")))?;
            }
        }
    }

    Ok(())
}

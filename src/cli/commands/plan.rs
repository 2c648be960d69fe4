//! `hookpin plan`

use super::Context;
use crate::git::GitOperations;
use crate::pipeline::Stage;
use crate::plan::{Plan, SkipReason, StepOutcome};
use anyhow::Result;

pub async fn execute(
    ctx: &Context,
    stage: Option<Stage>,
    all_files: bool,
    json: bool,
    files: Vec<String>,
) -> Result<()> {
    let output = &ctx.output;
    let stage = stage.unwrap_or(ctx.settings.default_stage);

    let config = ctx.load_config()?;
    let resolved = ctx.resolve(config)?;

    let files = if !files.is_empty() {
        files
    } else {
        let git = GitOperations::discover(".")?;
        if all_files {
            git.tracked_files()?
        } else {
            git.staged_files()?
        }
    };

    let plan = Plan::build(&resolved, &files, stage);

    if json {
        output.document(&(serde_json::to_string_pretty(&plan)? + "\n"))?;
        return Ok(());
    }

    output.header(&format!("Plan for {stage}"))?;
    output.verbose(&format!("{} candidate files", files.len()))?;

    for step in &plan.steps {
        match &step.outcome {
            StepOutcome::Run { files } if files.is_empty() => {
                output.action_result(&step.name, "runs without file names", true)?;
            }
            StepOutcome::Run { files } => {
                output.action_result(&step.name, &format!("{} files", files.len()), true)?;
                for file in files {
                    output.verbose(&format!("  {file}"))?;
                }
            }
            StepOutcome::Skipped { reason } => {
                let reason = match reason {
                    SkipReason::StageMismatch => "skipped: not attached to this stage",
                    SkipReason::NoFiles => "skipped: no files to check",
                };
                output.action_result(&step.name, reason, false)?;
            }
        }
    }

    output.blank_line()?;
    output.info(&format!(
        "{} of {} hooks would run{}",
        plan.runnable().count(),
        plan.steps.len(),
        if plan.fail_fast { " (fail fast)" } else { "" }
    ))?;

    Ok(())
}

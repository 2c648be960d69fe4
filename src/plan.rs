//! Dry-run application of a pipeline to a file set
//!
//! The planner decides, for one stage, which hooks would run and against
//! which files. Nothing is executed.
//!
//! Filters apply in this order: the global `files`/`exclude`, then each
//! hook's own `files`/`exclude`. A hook field set in the config overrides
//! the value advertised by the hook's manifest.

use crate::pipeline::{FilePattern, ResolvedHook, ResolvedPipeline, Stage};
use serde::Serialize;

/// Why a hook would not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The hook is not attached to the planned stage
    StageMismatch,
    /// No candidate file matched and the hook is not `always_run`
    NoFiles,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// `files` is empty when the hook does not take file names
    Run { files: Vec<String> },
    Skipped { reason: SkipReason },
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanStep {
    pub repo: String,
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl PlanStep {
    pub fn runs(&self) -> bool {
        matches!(self.outcome, StepOutcome::Run { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub stage: Stage,
    pub fail_fast: bool,
    pub steps: Vec<PlanStep>,
}

impl Plan {
    /// Plan `stage` over `files` (paths relative to the repository root)
    pub fn build(resolved: &ResolvedPipeline, files: &[String], stage: Stage) -> Self {
        let config = resolved.config();

        let candidates: Vec<&str> = files
            .iter()
            .map(String::as_str)
            .filter(|path| matches_filters(path, config.files.as_ref(), config.exclude.as_ref()))
            .collect();

        tracing::debug!(
            "Planning {} with {} of {} files after global filters",
            stage,
            candidates.len(),
            files.len()
        );

        let steps = resolved
            .hooks()
            .map(|hook| PlanStep {
                repo: hook.repo.source.repo().to_string(),
                id: hook.entry.id.clone(),
                name: hook.display_name().to_string(),
                outcome: plan_hook(&hook, &candidates, stage, config.default_stages.as_deref()),
            })
            .collect();

        Plan {
            stage,
            fail_fast: config.fail_fast.unwrap_or(false),
            steps,
        }
    }

    /// Steps that would run, in order
    pub fn runnable(&self) -> impl Iterator<Item = &PlanStep> {
        self.steps.iter().filter(|step| step.runs())
    }
}

fn plan_hook(
    hook: &ResolvedHook<'_>,
    candidates: &[&str],
    stage: Stage,
    default_stages: Option<&[Stage]>,
) -> StepOutcome {
    let entry = hook.entry;
    let definition = hook.definition;

    let stages = entry
        .stages
        .as_deref()
        .or(definition.map(|def| def.stages.as_slice()).filter(|s| !s.is_empty()))
        .or(default_stages);
    if stages.is_some_and(|stages| !stages.contains(&stage)) {
        return StepOutcome::Skipped {
            reason: SkipReason::StageMismatch,
        };
    }

    let include = entry
        .files
        .as_ref()
        .or(definition.and_then(|def| def.files.as_ref()));
    let exclude = entry
        .exclude
        .as_ref()
        .or(definition.and_then(|def| def.exclude.as_ref()));
    let always_run = entry
        .always_run
        .or(definition.and_then(|def| def.always_run))
        .unwrap_or(false);
    let pass_filenames = entry
        .pass_filenames
        .or(definition.and_then(|def| def.pass_filenames))
        .unwrap_or(true);

    let matched: Vec<String> = candidates
        .iter()
        .filter(|path| matches_filters(path, include, exclude))
        .map(|path| path.to_string())
        .collect();

    if matched.is_empty() && !always_run {
        return StepOutcome::Skipped {
            reason: SkipReason::NoFiles,
        };
    }

    StepOutcome::Run {
        files: if pass_filenames { matched } else { Vec::new() },
    }
}

fn matches_filters(
    path: &str,
    include: Option<&FilePattern>,
    exclude: Option<&FilePattern>,
) -> bool {
    include.is_none_or(|pattern| pattern.is_match(path))
        && !exclude.is_some_and(|pattern| pattern.is_match(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::manifest::HookDefinition;
    use crate::pipeline::{FilePattern, PipelineConfig};

    const HOOKS: &str = "https://example.com/hooks";

    fn catalog() -> StaticCatalog {
        let mut catalog = StaticCatalog::new();
        catalog.insert(
            HOOKS,
            "v1.0.0",
            vec![
                HookDefinition {
                    files: FilePattern::new(r"\.json$").ok(),
                    ..HookDefinition::new("check-json")
                },
                HookDefinition {
                    files: FilePattern::new(r"\.ya?ml$").ok(),
                    ..HookDefinition::new("check-yaml")
                },
                HookDefinition::new("trailing-whitespace"),
                HookDefinition {
                    stages: vec![Stage::PrePush],
                    ..HookDefinition::new("no-commit-to-branch")
                },
            ],
        );
        catalog
    }

    fn plan(text: &str, files: &[&str], stage: Stage) -> Plan {
        let resolved = PipelineConfig::from_yaml_str(text)
            .unwrap()
            .resolve(&catalog())
            .unwrap();
        let files: Vec<String> = files.iter().map(|f| f.to_string()).collect();
        Plan::build(&resolved, &files, stage)
    }

    fn files_of(step: &PlanStep) -> &[String] {
        match &step.outcome {
            StepOutcome::Run { files } => files,
            StepOutcome::Skipped { reason } => panic!("{} skipped: {reason:?}", step.id),
        }
    }

    const FILES: &[&str] = &["app.json", "ci.yml", "vendor/lib.json", "src/main.py"];

    #[test]
    fn test_manifest_filters_apply() {
        let plan = plan(
            "repos:\n  - repo: https://example.com/hooks\n    rev: v1.0.0\n    hooks:\n      - id: check-json\n      - id: check-yaml\n      - id: trailing-whitespace\n",
            FILES,
            Stage::PreCommit,
        );

        assert_eq!(files_of(&plan.steps[0]), ["app.json", "vendor/lib.json"]);
        assert_eq!(files_of(&plan.steps[1]), ["ci.yml"]);
        assert_eq!(files_of(&plan.steps[2]).len(), 4);
        assert!(!plan.fail_fast);
    }

    #[test]
    fn test_global_and_entry_filters_override() {
        let plan = plan(
            "exclude: ^vendor/\nfail_fast: true\nrepos:\n  - repo: https://example.com/hooks\n    rev: v1.0.0\n    hooks:\n      - id: check-json\n      - id: trailing-whitespace\n        files: \\.py$\n",
            FILES,
            Stage::PreCommit,
        );

        assert_eq!(files_of(&plan.steps[0]), ["app.json"]);
        assert_eq!(files_of(&plan.steps[1]), ["src/main.py"]);
        assert!(plan.fail_fast);
    }

    #[test]
    fn test_no_matching_files_skips_unless_always_run() {
        let plan = plan(
            "repos:\n  - repo: https://example.com/hooks\n    rev: v1.0.0\n    hooks:\n      - id: check-json\n      - id: check-yaml\n        always_run: true\n        pass_filenames: false\n",
            &["README.md"],
            Stage::PreCommit,
        );

        assert_eq!(
            plan.steps[0].outcome,
            StepOutcome::Skipped {
                reason: SkipReason::NoFiles
            }
        );
        assert_eq!(plan.steps[1].outcome, StepOutcome::Run { files: vec![] });
        assert_eq!(plan.runnable().count(), 1);
    }

    #[test]
    fn test_stage_selection() {
        let text = "default_stages: [pre-commit]\nrepos:\n  - repo: https://example.com/hooks\n    rev: v1.0.0\n    hooks:\n      - id: check-json\n      - id: no-commit-to-branch\n        always_run: true\n      - id: trailing-whitespace\n        stages: [manual]\n";

        let commit = plan(text, FILES, Stage::PreCommit);
        let running: Vec<&str> = commit.runnable().map(|s| s.id.as_str()).collect();
        assert_eq!(running, ["check-json"]);

        let push = plan(text, FILES, Stage::PrePush);
        let running: Vec<&str> = push.runnable().map(|s| s.id.as_str()).collect();
        assert_eq!(running, ["no-commit-to-branch"]);

        let manual = plan(text, FILES, Stage::Manual);
        let running: Vec<&str> = manual.runnable().map(|s| s.id.as_str()).collect();
        assert_eq!(running, ["trailing-whitespace"]);
    }

    #[test]
    fn test_offline_plan_matches_everything_by_default() {
        let config = PipelineConfig::from_yaml_str(
            "repos:\n  - repo: https://example.com/other\n    rev: v3.0.0\n    hooks:\n      - id: anything\n",
        )
        .unwrap();
        let resolved = ResolvedPipeline::offline(config).unwrap();
        let files = vec!["a.txt".to_string(), "b.rs".to_string()];

        let plan = Plan::build(&resolved, &files, Stage::PreCommit);
        assert_eq!(files_of(&plan.steps[0]), ["a.txt", "b.rs"]);
    }

    #[test]
    fn test_plan_serializes_outcomes() {
        let plan = plan(
            "repos:\n  - repo: https://example.com/hooks\n    rev: v1.0.0\n    hooks:\n      - id: check-yaml\n",
            &["app.json"],
            Stage::PreCommit,
        );
        let json = serde_json::to_value(&plan).unwrap();
        assert_eq!(json["stage"], "pre-commit");
        assert_eq!(json["steps"][0]["outcome"], "skipped");
        assert_eq!(json["steps"][0]["reason"], "no_files");
    }
}

//! # hookpin - pinned hook pipelines for git
//!
//! hookpin loads `.pre-commit-config.yaml` style descriptors: an ordered
//! list of hook repositories, each pinned to an immutable revision, each
//! exposing hooks with arguments, file filters and extra dependencies.
//!
//! - **Load**: parse and structurally validate a descriptor, reporting the
//!   position of the offending entry
//! - **Resolve**: check every hook id against what its source advertises at
//!   the pinned revision, using a git-backed repository cache
//! - **Plan**: work out which hooks would run against which files for a
//!   given stage, without running anything
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use hookpin::catalog::StaticCatalog;
//! use hookpin::pipeline::{PipelineConfig, Stage};
//! use hookpin::plan::Plan;
//!
//! let config = PipelineConfig::from_yaml_str(
//!     "repos:\n  - repo: https://example.com/hooks\n    rev: v1.0.0\n    hooks:\n      - id: check-json\n",
//! )?;
//! let catalog = StaticCatalog::new()
//!     .with_ids("https://example.com/hooks", "v1.0.0", &["check-json"]);
//! let resolved = config.resolve(&catalog)?;
//!
//! let plan = Plan::build(&resolved, &["data.json".to_string()], Stage::PreCommit);
//! assert_eq!(plan.runnable().count(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod cli;
pub mod error;
pub mod git;
pub mod manifest;
pub mod pipeline;
pub mod plan;
pub mod settings;
pub mod store;

pub use cli::{Cli, Output, is_broken_pipe};
pub use error::{PipelineError, Position};
pub use pipeline::PipelineConfig;

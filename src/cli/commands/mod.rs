//! Command implementations for the hookpin CLI
//!
//! Each command is organized into its own module and receives a shared
//! [`Context`] holding the effective settings and the output handler.

use super::Output;
use crate::pipeline::{PipelineConfig, ResolvedPipeline, load_file};
use crate::settings::Settings;
use crate::store::RepoStore;
use anyhow::{Context as _, Result};
use std::io::{self, Read};
use std::path::Path;

pub mod list;
pub mod plan;
pub mod resolve;
pub mod show;
pub mod validate;

/// `--config` value that reads the pipeline from standard input
const STDIN_PATH: &str = "-";

pub struct Context {
    pub settings: Settings,
    pub output: Output,
}

impl Context {
    pub fn new(settings: Settings, output: Output) -> Self {
        Self { settings, output }
    }

    pub fn config_path(&self) -> &Path {
        &self.settings.config_file
    }

    fn reads_stdin(&self) -> bool {
        self.config_path() == Path::new(STDIN_PATH)
    }

    /// Pipeline text as written
    pub fn read_config_text(&self) -> Result<String> {
        let path = self.config_path();
        if self.reads_stdin() {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read pipeline from stdin")?;
            return Ok(text);
        }
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Load the pipeline file named by the settings
    pub fn load_config(&self) -> Result<PipelineConfig> {
        let path = self.config_path();
        if self.reads_stdin() {
            let text = self.read_config_text()?;
            return PipelineConfig::from_yaml_str(&text).context("Invalid pipeline from stdin");
        }
        load_file(path).with_context(|| format!("Invalid pipeline {}", path.display()))
    }

    pub fn store(&self) -> RepoStore {
        RepoStore::new(self.settings.cache_dir()).offline(self.settings.offline)
    }

    /// Check hook ids, fetching sources unless offline
    pub fn resolve(&self, config: PipelineConfig) -> Result<ResolvedPipeline> {
        let path = self.config_path();
        let resolved = if self.settings.offline {
            ResolvedPipeline::offline(config)
        } else {
            config.resolve(&self.store())
        };
        resolved.with_context(|| format!("Invalid pipeline {}", path.display()))
    }
}

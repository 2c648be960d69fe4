//! Command-line interface for hookpin
//!
//! This module provides the main CLI structure and command dispatch. It uses
//! clap for argument parsing; each subcommand lives in `commands`.

use crate::pipeline::Stage;
use crate::settings::Settings;
use anyhow::Result;
use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;
mod output;

pub use commands::Context;
pub use output::{Output, is_broken_pipe};

/// hookpin - validate, resolve and plan pinned hook pipelines
#[derive(Parser)]
#[command(name = "hookpin", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Run as if started in <DIR> instead of the current directory
    #[arg(short = 'C', long = "directory", value_name = "DIR", global = true)]
    pub directory: Option<PathBuf>,

    /// Pipeline file, `-` for stdin (defaults to .pre-commit-config.yaml)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Additional settings file for hookpin itself
    #[arg(long, value_name = "FILE", global = true)]
    pub settings: Option<PathBuf>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Do not fetch hook repositories
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check structure, hook ids and revision pins
    Validate,
    /// Print the normalized pipeline
    Show {
        /// Output format
        #[arg(long, value_enum, default_value_t = ShowFormat::Yaml)]
        format: ShowFormat,
        /// Print the file as written, with highlighting
        #[arg(long, conflicts_with = "format")]
        raw: bool,
    },
    /// List repositories and hooks in execution order
    List,
    /// Show which hooks would run against which files
    Plan {
        /// Stage to plan (defaults to the `default_stage` setting)
        #[arg(long)]
        stage: Option<Stage>,
        /// Use every tracked file instead of the staged ones
        #[arg(long, conflicts_with = "files")]
        all_files: bool,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
        /// Explicit candidate files
        files: Vec<String>,
    },
    /// Resolve every revision pin to a commit
    Resolve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShowFormat {
    Yaml,
    Json,
    Toml,
}

impl Cli {
    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        setup_logging(self.verbose, self.quiet);

        let mut settings = Settings::load_with_custom_settings(self.settings.as_deref())?;
        if let Some(config) = self.config {
            settings.config_file = config;
        }
        settings.offline |= self.offline;

        let ctx = Context::new(settings, Output::new(self.verbose > 0, self.quiet));

        match self.command {
            Some(Commands::Validate) => commands::validate::execute(&ctx).await,
            Some(Commands::Show { format, raw }) => {
                commands::show::execute(&ctx, format, raw).await
            }
            Some(Commands::List) => commands::list::execute(&ctx).await,
            Some(Commands::Plan {
                stage,
                all_files,
                json,
                files,
            }) => commands::plan::execute(&ctx, stage, all_files, json, files).await,
            Some(Commands::Resolve) => commands::resolve::execute(&ctx).await,
            None => {
                // Show help when no command is provided
                let mut cmd = Cli::command();
                cmd.print_help()?;
                Ok(())
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plan_arguments() {
        let cli = Cli::try_parse_from([
            "hookpin", "-vv", "--offline", "plan", "--stage", "push", "a.json", "b.yaml",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(cli.offline);
        match cli.command {
            Some(Commands::Plan { stage, files, .. }) => {
                assert_eq!(stage, Some(Stage::PrePush));
                assert_eq!(files, ["a.json", "b.yaml"]);
            }
            _ => panic!("expected plan"),
        }
    }

    #[test]
    fn test_all_files_conflicts_with_explicit_files() {
        assert!(Cli::try_parse_from(["hookpin", "plan", "--all-files", "a.json"]).is_err());
    }
}

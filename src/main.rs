use clap::Parser;
use hookpin::{Cli, Output, is_broken_pipe};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        // The reader went away, as with `hookpin show | head`
        Err(err) if is_broken_pipe(&err) => ExitCode::SUCCESS,
        Err(err) => {
            Output::new(false, false).error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

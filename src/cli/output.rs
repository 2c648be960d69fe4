//! Styled terminal output for hookpin
//!
//! Status lines go to stdout and errors to stderr. Quiet mode suppresses
//! everything except errors and machine-readable documents. Every writer
//! returns the I/O result so a closed pipe ends the command instead of
//! panicking.

use console::style;
use std::fmt::Display;
use std::io::{self, Write};

pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    fn line(&self, line: impl Display) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(io::stdout().lock(), "{line}")
    }

    /// A finished check, prefixed with a green tick
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.line(format_args!("{} {message}", style("✔").green()))
    }

    /// Report a failure on stderr, shown even in quiet mode
    pub fn error(&self, message: &str) {
        let _ = writeln!(io::stderr().lock(), "{} {message}", style("✖").red());
    }

    pub fn warning(&self, message: &str) -> io::Result<()> {
        self.line(format_args!("{} {message}", style("⚠").yellow()))
    }

    pub fn info(&self, message: &str) -> io::Result<()> {
        self.line(format_args!("{} {message}", style("ℹ").blue()))
    }

    /// Detail lines shown only with `-v`
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.line(format_args!("{} {}", style("ℹ").dim(), style(message).dim()))
    }

    pub fn header(&self, title: &str) -> io::Result<()> {
        self.line(format_args!("\n{}", style(title).bold().underlined()))
    }

    pub fn section_header(&self, title: &str) -> io::Result<()> {
        self.line(format_args!("\n{}", style(title).bold().cyan()))
    }

    /// Key and value, with the key padded to a column
    pub fn table_row(&self, key: &str, value: &str) -> io::Result<()> {
        self.line(format_args!("  {:<20} {value}", style(key).dim()))
    }

    pub fn list_item(&self, item: &str) -> io::Result<()> {
        self.line(format_args!("  • {item}"))
    }

    /// Detail nested under a list item
    pub fn indent(&self, message: &str) -> io::Result<()> {
        self.line(format_args!("    {message}"))
    }

    pub fn blank_line(&self) -> io::Result<()> {
        self.line("")
    }

    /// One plan step: a tick when the hook would run, a hollow circle when skipped
    pub fn action_result(&self, action: &str, result: &str, runs: bool) -> io::Result<()> {
        let icon = if runs {
            style("✓").green().bold()
        } else {
            style("○").dim()
        };
        self.line(format_args!(
            "{icon} {} {}",
            style(action).bold(),
            style(result).dim()
        ))
    }

    pub fn count(&self, message: &str, count: usize) -> io::Result<()> {
        self.line(format_args!(
            "{} {}",
            style(message).bold(),
            style(format!("({count})")).dim()
        ))
    }

    /// Write a rendered document as is, ignoring quiet mode
    pub fn document(&self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }
}

/// True when the error chain ends in a write to a closed pipe
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|err| err.kind() == io::ErrorKind::BrokenPipe)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_pipe_is_detected_through_context() {
        let err = anyhow::Error::new(io::Error::from(io::ErrorKind::BrokenPipe))
            .context("writing plan");
        assert!(is_broken_pipe(&err));

        let other = anyhow::Error::new(io::Error::from(io::ErrorKind::NotFound));
        assert!(!is_broken_pipe(&other));
    }

    #[test]
    fn test_quiet_output_writes_nothing() {
        let output = Output::new(true, true);
        assert!(output.info("hidden").is_ok());
        assert!(output.verbose("hidden").is_ok());
    }
}

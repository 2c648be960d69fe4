//! `hookpin show`
//!
//! Prints the round-tripped pipeline, or the file as written with YAML
//! highlighting when `--raw` is given.

use super::Context;
use crate::cli::ShowFormat;
use anyhow::Result;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::as_24_bit_terminal_escaped;

pub async fn execute(ctx: &Context, format: ShowFormat, raw: bool) -> Result<()> {
    if raw {
        let content = ctx.read_config_text()?;

        let highlighted = console::colors_enabled()
            .then(|| highlight_yaml(&content))
            .flatten();
        match highlighted {
            Some(highlighted) => ctx.output.document(&format!("{highlighted}\x1b[0m"))?,
            None => ctx.output.document(&content)?,
        }
        return Ok(());
    }

    let config = ctx.load_config()?;
    let rendered = match format {
        ShowFormat::Yaml => config.to_yaml(),
        ShowFormat::Json => config.to_json().map(|json| json + "\n"),
        ShowFormat::Toml => config.to_toml(),
    }?;

    ctx.output.document(&rendered)?;
    Ok(())
}

/// Highlight YAML content using syntect
fn highlight_yaml(content: &str) -> Option<String> {
    let syntax_set = SyntaxSet::load_defaults_newlines();
    let theme_set = ThemeSet::load_defaults();

    let syntax = syntax_set.find_syntax_by_extension("yaml")?;
    let theme = theme_set.themes.get("base16-eighties.dark")?;

    let mut highlighted = String::new();
    let mut highlighter = HighlightLines::new(syntax, theme);

    for line in content.lines() {
        let ranges = highlighter.highlight_line(line, &syntax_set).ok()?;
        highlighted.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
        highlighted.push('\n');
    }

    Some(highlighted)
}

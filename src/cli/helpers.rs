//! Shared helper functions for CLI commands

use clap::ValueEnum;
use miette::Result;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::ArticleStore;
use crate::core::{Config, Project};

/// An opened catalog: project, merged config and store
pub struct Catalog {
    pub project: Project,
    pub config: Config,
    pub store: ArticleStore,
}

/// Find the project, honouring `--project`
pub fn discover_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Discover the project, load its config and open the article database
pub fn open_catalog(global: &GlobalOpts) -> Result<Catalog> {
    let project = discover_project(global)?;
    let config = Config::load_for(Some(&project));
    let path = project.database_path(&config);
    tracing::debug!(database = %path.display(), "opening article store");
    let store = ArticleStore::open(&path)?.with_paging(config.paging_limits());

    Ok(Catalog {
        project,
        config,
        store,
    })
}

/// `--format`, falling back to the configured `default_format` when auto
pub fn effective_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if global.format != OutputFormat::Auto {
        return global.format;
    }
    config
        .default_format
        .as_deref()
        .and_then(|name| OutputFormat::from_str(name, true).ok())
        .unwrap_or(OutputFormat::Auto)
}

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Display an optional measurement, "-" when absent
pub fn format_measure(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Some(v) => format!("{}", v),
        None => "-".to_string(),
    }
}

/// Ask on stdin; anything but y/yes declines
pub fn confirm(prompt: &str) -> Result<bool> {
    use miette::IntoDiagnostic;
    use std::io::Write;

    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().into_diagnostic()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input).into_diagnostic()?;
    let answer = input.trim();
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

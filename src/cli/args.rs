//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    article::ArticleCommands, completions::CompletionsArgs, import::ImportArgs, init::InitArgs,
    seed::SeedArgs, serve::ServeArgs,
};

#[derive(Parser)]
#[command(name = "spokes")]
#[command(author, version, about = "Bicycle component article catalog")]
#[command(long_about = "Manage a catalog of bicycle component articles stored in SQLite, from the command line or over a JSON HTTP API.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .spokes/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new article catalog
    Init(InitArgs),

    /// Article management
    #[command(subcommand)]
    Article(ArticleCommands),

    /// Load the bundled sample articles
    Seed(SeedArgs),

    /// Import articles from a CSV file
    Import(ImportArgs),

    /// Run the JSON HTTP API
    Serve(ServeArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for list, details for show)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

//! Errors raised by article operations

use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while validating or persisting articles
#[derive(Debug, Error, Diagnostic)]
pub enum ArticleError {
    #[error("Article with ID {0} not found.")]
    #[diagnostic(
        code(spokes::article::not_found),
        help("run 'spokes article list' to see existing IDs")
    )]
    NotFound(i64),

    #[error("invalid article:\n{}", bullet_list(.0))]
    #[diagnostic(code(spokes::article::invalid))]
    Validation(Vec<String>),

    #[error("an article with number '{0}' already exists")]
    #[diagnostic(code(spokes::article::duplicate))]
    DuplicateArticleNumber(String),

    #[error("database schema version {0} is newer than this build supports")]
    #[diagnostic(
        code(spokes::store::schema_version),
        help("upgrade spokes to open this database")
    )]
    UnsupportedSchema(i32),

    #[error("database error: {0}")]
    #[diagnostic(code(spokes::store::database))]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    #[diagnostic(code(spokes::import::csv))]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(spokes::io))]
    Io(#[from] std::io::Error),
}

fn bullet_list(messages: &[String]) -> String {
    messages
        .iter()
        .map(|m| format!("  - {}", m))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ArticleError {
    /// Individual messages, one per violated rule
    pub fn messages(&self) -> Vec<String> {
        match self {
            ArticleError::Validation(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

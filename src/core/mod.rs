//! Core module - storage, configuration and project layout

pub mod config;
pub mod error;
pub mod import;
pub mod project;
pub mod seed;
pub mod store;

pub use config::Config;
pub use error::ArticleError;
pub use project::{Project, ProjectError};
pub use store::{ArticlePage, ArticleQuery, ArticleStore};

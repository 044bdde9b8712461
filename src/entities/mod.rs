//! Entity type definitions
//!
//! - [`Article`] - a bicycle component offered by a supplier

pub mod article;

pub use article::{Article, ArticleInput, ArticlePatch};

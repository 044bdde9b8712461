//! CLI command implementations

pub mod article;
pub mod completions;
pub mod import;
pub mod init;
pub mod seed;
pub mod serve;

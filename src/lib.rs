//! Spokes: bicycle component article catalog
//!
//! Articles live in a SQLite database inside a project directory marked by
//! `.spokes/`. They are managed from the `spokes` CLI or over the JSON HTTP
//! API in [`server`].

pub mod cli;
pub mod core;
pub mod entities;
pub mod logging;
pub mod server;

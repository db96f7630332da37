//! # meaning
//!
//! Command-line host for `meaning-core`.
//!
//! The engine itself never touches the filesystem. This crate supplies what
//! it needs from outside: world documents read from disk, catalog resolvers
//! backed by `std::fs` and `tokio::fs`, an optional TOML configuration, and
//! a CLI over the engine's read API.

pub mod cli;
pub mod config;
pub mod error;
pub mod sources;
pub mod world_file;

pub use config::{AppConfig, CatalogSettings};
pub use error::AppError;

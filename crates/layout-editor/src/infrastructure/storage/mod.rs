//! Storage infrastructure: local files.
//!
//! - `config` reads and writes the TOML editor configuration from the
//!   platform config directory, falling back to defaults on first run.
//! - `file_repository` stores layouts as `<id>.json` files in a directory,
//!   for offline use and tests.

pub mod config;
pub mod file_repository;

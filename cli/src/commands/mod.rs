//! CLI command implementations.

pub mod config;
pub mod kill;
pub mod list;

//! CLI layer for starterbed

pub mod commands;

pub use commands::{Cli, Commands, OutputFormat};

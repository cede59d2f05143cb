//! Configuration for starterbed
//!
//! XDG-compliant layered configuration with environment overrides.

pub mod loader;
pub mod model;

pub use loader::{config_paths, find_config_files, load_config};
pub use model::{Config, DockerConfig, WaitConfig};

//! Configuration loader with XDG-compliant path resolution
//!
//! Loads configuration from multiple locations with layered priority:
//! 1. `/etc/starterbed/config.toml` (lowest priority)
//! 2. `~/.config/starterbed/config.toml`
//! 3. `~/.starterbed.toml`
//! 4. `./.starterbed.toml` (highest priority)

use std::path::PathBuf;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use super::model::Config;

/// Application name used for XDG directories
const APP_NAME: &str = "starterbed";

/// Get XDG config search paths in priority order (lowest to highest)
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // System-wide config (lowest priority)
    paths.push(PathBuf::from(format!("/etc/{APP_NAME}/config.toml")));

    // XDG config home
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join(APP_NAME).join("config.toml"));
    }

    // Home directory (legacy/convenience)
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(format!(".{APP_NAME}.toml")));
    }

    // Current directory / suite root (highest priority)
    paths.push(PathBuf::from(format!(".{APP_NAME}.toml")));

    paths
}

/// Load configuration with XDG layering
///
/// Configurations are merged in priority order, with later files overriding
/// earlier ones. Environment variables with prefix `STARTERBED_` override all
/// file-based configuration, e.g. `STARTERBED_DOCKER__BINARY=podman` maps to
/// `docker.binary = "podman"`.
///
/// # Arguments
/// * `override_path` - Optional path to a config file that takes highest priority
pub fn load_config(override_path: Option<&str>) -> Result<Config> {
    let mut figment = Figment::new();

    figment = figment.merge(Serialized::defaults(Config::default()));

    for path in config_paths() {
        if path.exists() {
            tracing::debug!("Loading config from: {}", path.display());
            figment = figment.merge(Toml::file(&path));
        }
    }

    if let Some(path) = override_path {
        let path = PathBuf::from(path);
        if path.exists() {
            tracing::debug!("Loading override config from: {}", path.display());
            figment = figment.merge(Toml::file(&path));
        } else {
            tracing::warn!("Override config not found: {}", path.display());
        }
    }

    figment = figment.merge(Env::prefixed("STARTERBED_").split("__"));

    figment.extract().context("Failed to load configuration")
}

/// Find all existing config files (for debugging/introspection)
pub fn find_config_files() -> Vec<PathBuf> {
    config_paths().into_iter().filter(|p| p.exists()).collect()
}

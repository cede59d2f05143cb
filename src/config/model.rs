//! Configuration model for starterbed

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Container runtime settings
    #[serde(default)]
    pub docker: DockerConfig,

    /// Defaults for condition polling
    #[serde(default)]
    pub wait: WaitConfig,
}

/// Container runtime settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DockerConfig {
    /// Runtime binary to invoke (docker-compatible CLI)
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Label selecting containers created by the test suite, as `key=value`.
    /// Bulk cleanup removes everything matching it.
    #[serde(default = "default_cleanup_label")]
    pub cleanup_label: String,

    /// Per-command timeout in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Cap on captured output per stream, in bytes
    #[serde(default = "default_max_output")]
    pub max_output: usize,
}

fn default_binary() -> String {
    "docker".to_string()
}

fn default_cleanup_label() -> String {
    "created-by=cluster-starter".to_string()
}

fn default_command_timeout() -> u64 {
    30
}

fn default_max_output() -> usize {
    100_000
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            cleanup_label: default_cleanup_label(),
            command_timeout_secs: default_command_timeout(),
            max_output: default_max_output(),
        }
    }
}

impl DockerConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Defaults for condition polling
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaitConfig {
    /// Deadline for a wait, in seconds
    #[serde(default = "default_wait_timeout")]
    pub timeout_secs: u64,

    /// Spacing between probe retries, in milliseconds
    #[serde(default = "default_wait_interval")]
    pub interval_ms: u64,
}

fn default_wait_timeout() -> u64 {
    60
}

fn default_wait_interval() -> u64 {
    250
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_wait_timeout(),
            interval_ms: default_wait_interval(),
        }
    }
}

impl WaitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

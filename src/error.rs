//! Error types for starterbed
//!
//! Provides structured error types with suggestions for common docker issues.

use once_cell::sync::Lazy;
use thiserror::Error;

/// Main error type for harness operations
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Failed to spawn the command
    #[error("Failed to spawn command: {command}")]
    SpawnFailed { command: String, error: String },

    /// Command ran but exited non-zero
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
        suggestion: Option<String>,
    },

    /// Command exceeded its per-invocation timeout
    #[error("Command timed out after {timeout_secs}s: {command}")]
    CommandTimeout { command: String, timeout_secs: u64 },

    /// Container runtime binary is not installed or not on PATH
    #[error("Container runtime '{binary}' not found on PATH")]
    RuntimeNotFound { binary: String },

    /// Output of a command could not be parsed
    #[error("Unexpected output from {command}: {message}")]
    MalformedOutput { command: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Known stderr fragments paired with an actionable hint.
static DOCKER_HINTS: Lazy<Vec<(&str, &str)>> = Lazy::new(|| {
    vec![
        (
            "Cannot connect to the Docker daemon",
            "Docker daemon is not running. Start Docker Desktop or the docker service.",
        ),
        (
            "permission denied while trying to connect",
            "No access to the docker socket. Add your user to the 'docker' group or run with sudo.",
        ),
        (
            "No such container",
            "Container not found. It may already have been removed by a previous cleanup.",
        ),
        (
            "No such volume",
            "Volume not found. It may already have been removed by a previous cleanup.",
        ),
        (
            "volume is in use",
            "Volume is still attached to a container. Remove the container first (docker rm -f -v).",
        ),
        (
            "port is already allocated",
            "Port conflict. A leftover container is probably still running; try the cleanup command.",
        ),
        (
            "toomanyrequests",
            "Registry rate limit hit. Authenticate with the registry or retry later.",
        ),
    ]
});

/// Suggest a fix for common docker stderr patterns
pub fn suggest_fix(stderr: &str) -> Option<String> {
    DOCKER_HINTS
        .iter()
        .find(|(pattern, _)| stderr.contains(pattern))
        .map(|(_, hint)| (*hint).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_failed_display() {
        let err = HarnessError::SpawnFailed {
            command: "docker ps".to_string(),
            error: "No such file or directory".to_string(),
        };
        assert_eq!(err.to_string(), "Failed to spawn command: docker ps");
    }

    #[test]
    fn test_command_failed_display() {
        let err = HarnessError::CommandFailed {
            command: "docker rm -f -v abc".to_string(),
            exit_code: Some(1),
            stderr: "Error: No such container: abc".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "Command failed: docker rm -f -v abc");
    }

    #[test]
    fn test_command_timeout_display() {
        let err = HarnessError::CommandTimeout {
            command: "docker logs deadbeef".to_string(),
            timeout_secs: 30,
        };
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn test_runtime_not_found_display() {
        let err = HarnessError::RuntimeNotFound {
            binary: "podman".to_string(),
        };
        assert!(err.to_string().contains("podman"));
        assert!(err.to_string().contains("PATH"));
    }

    #[test]
    fn test_suggest_fix_daemon_down() {
        let suggestion =
            suggest_fix("Cannot connect to the Docker daemon at unix:///var/run/docker.sock");
        assert!(suggestion.is_some());
        assert!(suggestion.unwrap().contains("daemon"));
    }

    #[test]
    fn test_suggest_fix_socket_permission() {
        let suggestion =
            suggest_fix("permission denied while trying to connect to the Docker daemon socket");
        assert!(suggestion.is_some());
        assert!(suggestion.unwrap().contains("docker"));
    }

    #[test]
    fn test_suggest_fix_missing_container() {
        let suggestion = suggest_fix("Error response from daemon: No such container: abc123");
        assert!(suggestion.is_some());
    }

    #[test]
    fn test_suggest_fix_port_conflict() {
        let suggestion = suggest_fix("Bind for 0.0.0.0:8529 failed: port is already allocated");
        assert!(suggestion.unwrap().contains("cleanup"));
    }

    #[test]
    fn test_suggest_fix_no_match() {
        assert!(suggest_fix("some unrelated error").is_none());
    }
}

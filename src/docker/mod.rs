//! Container lifecycle helpers
//!
//! Thin client over a docker-compatible CLI: create/remove volumes and
//! containers, list and bulk-clean containers by label, and dump diagnostic
//! output when a fixture misbehaves. Every operation is a single command
//! invocation with captured output; nothing here supervises processes or
//! orchestrates containers.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::DockerConfig;
use crate::error::{suggest_fix, HarnessError};
use crate::process::{render_command, spawn_captured, CommandOutput, SpawnOptions};
use crate::wait::{self, ProbeOutcome, WaitError};

/// One row of `docker ps --format '{{json .}}'`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContainerSummary {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Image")]
    pub image: String,
    #[serde(rename = "Names")]
    pub names: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Labels", default)]
    pub labels: String,
}

/// Client for a docker-compatible CLI
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
    command_timeout: Duration,
    max_output: usize,
}

impl DockerCli {
    pub fn new(config: &DockerConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            command_timeout: config.command_timeout(),
            max_output: config.max_output,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Verify the runtime binary is reachable before shelling out.
    ///
    /// Accepts either a bare name resolved through PATH or an absolute path.
    pub fn ensure_available(&self) -> Result<PathBuf, HarnessError> {
        which::which(&self.binary).map_err(|_| HarnessError::RuntimeNotFound {
            binary: self.binary.clone(),
        })
    }

    /// `docker volume create <name>`
    pub async fn create_volume(&self, name: &str) -> Result<(), HarnessError> {
        self.run_checked(&["volume", "create", name]).await?;
        tracing::debug!("Created volume {name}");
        Ok(())
    }

    /// `docker volume rm -f <name>`
    pub async fn remove_volume(&self, name: &str) -> Result<(), HarnessError> {
        self.run_checked(&["volume", "rm", "-f", name]).await?;
        tracing::debug!("Removed volume {name}");
        Ok(())
    }

    /// `docker rm -f -v <id>` — removes the container together with its
    /// anonymous volumes.
    pub async fn remove_container(&self, id: &str) -> Result<(), HarnessError> {
        self.run_checked(&["rm", "-f", "-v", id]).await?;
        tracing::debug!("Removed container {id}");
        Ok(())
    }

    /// Dump diagnostics for a misbehaving container, then remove it.
    ///
    /// This is the teardown path for a failed test: the container list and
    /// the container's timestamped logs land in the test log before the
    /// evidence is deleted.
    pub async fn remove_container_with_diagnostics(&self, id: &str) -> Result<(), HarnessError> {
        self.dump_diagnostics(id).await;
        self.remove_container(id).await
    }

    /// Ids of running containers matching a `key=value` label.
    pub async fn list_container_ids(&self, label: &str) -> Result<Vec<String>, HarnessError> {
        let filter = label_filter(label);
        let out = self.run_checked(&["ps", "-q", "--filter", &filter]).await?;
        Ok(parse_id_lines(&out.stdout))
    }

    /// Summaries of all containers, optionally restricted by label.
    pub async fn list_containers(
        &self,
        label: Option<&str>,
    ) -> Result<Vec<ContainerSummary>, HarnessError> {
        let mut args = vec!["ps", "-a", "--format", "{{json .}}"];
        let filter = label.map(label_filter);
        if let Some(ref filter) = filter {
            args.push("--filter");
            args.push(filter);
        }
        let command = render_command(&self.binary, &args);
        let out = self.run_checked(&args).await?;
        parse_summaries(&command, &out.stdout)
    }

    /// `docker logs [--timestamps] <id>`, both streams combined.
    pub async fn container_logs(&self, id: &str, timestamps: bool) -> Result<String, HarnessError> {
        let mut args = vec!["logs"];
        if timestamps {
            args.push("--timestamps");
        }
        args.push(id);
        let out = self.run_checked(&args).await?;
        // docker logs writes the container's streams to matching fds
        let mut text = out.stdout;
        text.push_str(&out.stderr);
        Ok(text)
    }

    /// Whether the container's state reports it as running.
    pub async fn is_running(&self, id: &str) -> Result<bool, HarnessError> {
        let out = self
            .run_checked(&["inspect", "--format", "{{.State.Running}}", id])
            .await?;
        Ok(out.stdout.trim() == "true")
    }

    /// Poll until the container reports running, on the harness wait loop.
    ///
    /// A container that disappears or a daemon error ends the wait with that
    /// reason; otherwise the wait times out after `timeout`.
    pub async fn wait_until_running(
        &self,
        id: &str,
        timeout: Duration,
        interval: Duration,
    ) -> Result<(), WaitError> {
        wait::wait_until(
            || async move {
                match self.is_running(id).await {
                    Ok(running) => ProbeOutcome::from_ready(running),
                    Err(err) => ProbeOutcome::Failed(err.into()),
                }
            },
            timeout,
            interval,
        )
        .await
    }

    /// Bulk cleanup: remove every running container matching the label.
    /// Returns how many containers were removed.
    pub async fn remove_containers_by_label(&self, label: &str) -> Result<usize, HarnessError> {
        let ids = self.list_container_ids(label).await?;
        if ids.is_empty() {
            tracing::debug!("No containers matching {label}");
            return Ok(0);
        }
        for id in &ids {
            tracing::info!("Removing leftover container {id} ({label})");
            self.remove_container(id).await?;
        }
        Ok(ids.len())
    }

    /// Best-effort diagnostics dump: the full container list followed by the
    /// container's timestamped logs, one tracing event per line. Failures
    /// here are logged and swallowed so teardown keeps going.
    pub async fn dump_diagnostics(&self, id: &str) {
        match self.run(&["ps", "-a"]).await {
            Ok(out) => {
                for line in out.lines() {
                    tracing::info!(target: "starterbed::diagnostics", "containers: {line}");
                }
            }
            Err(err) => tracing::warn!("Failed to list containers for diagnostics: {err}"),
        }

        match self.run(&["logs", "--timestamps", id]).await {
            Ok(out) => {
                for line in out.lines() {
                    tracing::info!(target: "starterbed::diagnostics", container = %id, "{line}");
                }
            }
            Err(err) => tracing::warn!("Failed to fetch logs of {id} for diagnostics: {err}"),
        }
    }

    fn options(&self) -> SpawnOptions {
        SpawnOptions::default()
            .with_timeout(self.command_timeout)
            .with_max_output(self.max_output)
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput, HarnessError> {
        spawn_captured(&self.binary, args, &self.options()).await
    }

    /// Run and turn a non-zero exit into `CommandFailed`, with a hint for
    /// recognizable docker stderr.
    async fn run_checked(&self, args: &[&str]) -> Result<CommandOutput, HarnessError> {
        let out = self.run(args).await?;
        if out.success() {
            return Ok(out);
        }
        let stderr = out.stderr.trim().to_string();
        Err(HarnessError::CommandFailed {
            command: render_command(&self.binary, args),
            exit_code: out.exit_code,
            suggestion: suggest_fix(&stderr),
            stderr,
        })
    }
}

/// Random fixture id: prefix plus a short hex suffix, unique per call.
pub fn scratch_id(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &suffix[..8])
}

fn label_filter(label: &str) -> String {
    format!("label={label}")
}

fn parse_id_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_summaries(command: &str, stdout: &str) -> Result<Vec<ContainerSummary>, HarnessError> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| HarnessError::MalformedOutput {
                command: command.to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_id_shape() {
        let id = scratch_id("vol-");
        assert!(id.starts_with("vol-"));
        assert_eq!(id.len(), "vol-".len() + 8);
        assert!(id["vol-".len()..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_scratch_id_unique() {
        assert_ne!(scratch_id("c"), scratch_id("c"));
    }

    #[test]
    fn test_label_filter() {
        assert_eq!(
            label_filter("created-by=cluster-starter"),
            "label=created-by=cluster-starter"
        );
    }

    #[test]
    fn test_parse_id_lines() {
        let ids = parse_id_lines("abc123\n\n  def456 \n");
        assert_eq!(ids, vec!["abc123", "def456"]);
        assert!(parse_id_lines("").is_empty());
        assert!(parse_id_lines("\n\n").is_empty());
    }

    #[test]
    fn test_parse_summaries() {
        let line = r#"{"ID":"abc123","Image":"postgres:16","Names":"db1","Status":"Up 5 seconds","Labels":"created-by=cluster-starter","Command":"postgres"}"#;
        let parsed = parse_summaries("docker ps", line).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].id, "abc123");
        assert_eq!(parsed[0].image, "postgres:16");
        assert_eq!(parsed[0].labels, "created-by=cluster-starter");
    }

    #[test]
    fn test_parse_summaries_rejects_garbage() {
        let result = parse_summaries("docker ps", "not-json");
        assert!(matches!(result, Err(HarnessError::MalformedOutput { .. })));
    }

    #[test]
    fn test_docker_cli_from_config() {
        let config = DockerConfig::default();
        let docker = DockerCli::new(&config);
        assert_eq!(docker.binary(), "docker");
        assert_eq!(docker.command_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_ensure_available_missing_binary() {
        let config = DockerConfig {
            binary: "starterbed-no-such-runtime".to_string(),
            ..Default::default()
        };
        let docker = DockerCli::new(&config);
        assert!(matches!(
            docker.ensure_available(),
            Err(HarnessError::RuntimeNotFound { .. })
        ));
    }
}

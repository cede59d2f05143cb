//! Common test utilities for starterbed tests

use std::path::PathBuf;

use tempfile::TempDir;

use starterbed::config::DockerConfig;

/// Stub docker script: records every invocation to a log file and answers
/// each subcommand with canned output.
const STUB_SCRIPT: &str = r#"#!/bin/sh
printf '%s\n' "$*" >> "__LOG__"
case "$1" in
  volume)
    echo "$3"
    ;;
  rm)
    echo removed
    ;;
  ps)
    case " $* " in
      *" -q "*)
        printf 'abc123\ndef456\n'
        ;;
      *)
        printf '%s\n' '{"ID":"abc123","Image":"postgres:16","Names":"db1","Status":"Up 5 seconds","Labels":"created-by=ci"}'
        printf '%s\n' '{"ID":"def456","Image":"cluster-starter:dev","Names":"starter1","Status":"Exited (0) 2 minutes ago","Labels":"created-by=ci"}'
        ;;
    esac
    ;;
  logs)
    printf 'line one\nline two\n'
    ;;
  inspect)
    echo true
    ;;
esac
exit 0
"#;

/// Variant that fails every invocation with a fixed stderr message.
const FAILING_SCRIPT: &str = r#"#!/bin/sh
printf '%s\n' "$*" >> "__LOG__"
echo "__MSG__" >&2
exit 1
"#;

/// A fake docker binary living in a temp dir
pub struct StubDocker {
    // Held for its Drop; the script lives inside
    _dir: TempDir,
    pub binary: PathBuf,
    log: PathBuf,
}

impl StubDocker {
    /// Stub that answers every subcommand successfully
    pub fn new() -> Self {
        Self::from_template(STUB_SCRIPT)
    }

    /// Stub that fails every invocation with `stderr_message`
    pub fn failing(stderr_message: &str) -> Self {
        Self::from_template(&FAILING_SCRIPT.replace("__MSG__", stderr_message))
    }

    fn from_template(template: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let binary = dir.path().join("docker");
        let log = dir.path().join("invocations.log");

        let script = template.replace("__LOG__", &log.display().to_string());
        std::fs::write(&binary, script).expect("Failed to write stub script");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&binary)
                .expect("Failed to get metadata")
                .permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&binary, perms).expect("Failed to set permissions");
        }

        Self {
            _dir: dir,
            binary,
            log,
        }
    }

    /// Recorded invocations, one argv line per call
    pub fn invocations(&self) -> Vec<String> {
        match std::fs::read_to_string(&self.log) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Docker config pointing at the stub
    pub fn config(&self) -> DockerConfig {
        DockerConfig {
            binary: self.binary.display().to_string(),
            ..Default::default()
        }
    }
}

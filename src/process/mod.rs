//! Subprocess spawning with output capture
//!
//! Runs a command, captures stdout/stderr concurrently with a size cap, and
//! enforces an optional per-invocation timeout. The child is killed if the
//! calling future is dropped.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::HarnessError;

/// Default cap on captured output per stream (in bytes)
const DEFAULT_MAX_OUTPUT: usize = 100_000;

/// Marker appended when captured output hits the cap
const TRUNCATION_MARKER: &str = "\n... [output truncated] ...\n";

/// Options for a single spawned command
#[derive(Debug, Clone)]
pub struct SpawnOptions {
    /// Working directory for the command
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables
    pub env: HashMap<String, String>,
    /// Timeout for the whole invocation (None = wait forever)
    pub timeout: Option<Duration>,
    /// Cap on captured bytes per stream
    pub max_output: usize,
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self {
            working_dir: None,
            env: HashMap::new(),
            timeout: None,
            max_output: DEFAULT_MAX_OUTPUT,
        }
    }
}

impl SpawnOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_max_output(mut self, size: usize) -> Self {
        self.max_output = size;
        self
    }
}

/// Captured result of a finished command
#[derive(Debug)]
pub struct CommandOutput {
    /// Exit code if the process exited normally
    pub exit_code: Option<i32>,
    /// Captured standard output (may be truncated)
    pub stdout: String,
    /// Captured standard error (may be truncated)
    pub stderr: String,
    pub stdout_truncated: bool,
    pub stderr_truncated: bool,
    /// Wall-clock duration of the invocation
    pub duration: Duration,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Combined output for line-by-line diagnostic dumps
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .filter(|line| !line.is_empty())
    }
}

/// Render a program and its arguments the way a shell invocation would look.
/// Used in errors and log lines only.
pub fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Spawn a command and wait for it, capturing both streams.
///
/// # Errors
/// * `HarnessError::SpawnFailed` - the program could not be started
/// * `HarnessError::CommandTimeout` - the invocation exceeded `options.timeout`
///
/// A non-zero exit is not an error at this layer; callers inspect
/// [`CommandOutput::success`].
pub async fn spawn_captured(
    program: &str,
    args: &[&str],
    options: &SpawnOptions,
) -> Result<CommandOutput, HarnessError> {
    let start = Instant::now();
    let rendered = render_command(program, args);

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    // Abandoned invocation must not leave the child running
    cmd.kill_on_drop(true);

    if let Some(ref dir) = options.working_dir {
        cmd.current_dir(dir);
    }
    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    tracing::debug!("Spawning: {rendered}");

    let child = cmd.spawn().map_err(|e| HarnessError::SpawnFailed {
        command: rendered.clone(),
        error: e.to_string(),
    })?;

    let collected = if let Some(limit) = options.timeout {
        match timeout(limit, collect_output(child, options.max_output)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(HarnessError::CommandTimeout {
                    command: rendered,
                    timeout_secs: limit.as_secs(),
                })
            }
        }
    } else {
        collect_output(child, options.max_output).await?
    };

    Ok(CommandOutput {
        exit_code: collected.exit_code,
        stdout: collected.stdout,
        stderr: collected.stderr,
        stdout_truncated: collected.stdout_truncated,
        stderr_truncated: collected.stderr_truncated,
        duration: start.elapsed(),
    })
}

struct Collected {
    exit_code: Option<i32>,
    stdout: String,
    stderr: String,
    stdout_truncated: bool,
    stderr_truncated: bool,
}

/// Wait for the child while draining both pipes concurrently. Draining must
/// happen alongside the wait, otherwise a chatty child can fill a pipe and
/// deadlock.
async fn collect_output(
    mut child: tokio::process::Child,
    max_output: usize,
) -> Result<Collected, HarnessError> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout_task = tokio::spawn(async move {
        match stdout {
            Some(pipe) => read_capped(pipe, max_output).await,
            None => (String::new(), false),
        }
    });
    let stderr_task = tokio::spawn(async move {
        match stderr {
            Some(pipe) => read_capped(pipe, max_output).await,
            None => (String::new(), false),
        }
    });

    let status = child.wait().await.map_err(HarnessError::Io)?;

    let (stdout, stdout_truncated) = stdout_task
        .await
        .map_err(|e| HarnessError::Io(std::io::Error::other(format!("stdout task failed: {e}"))))?;
    let (stderr, stderr_truncated) = stderr_task
        .await
        .map_err(|e| HarnessError::Io(std::io::Error::other(format!("stderr task failed: {e}"))))?;

    Ok(Collected {
        exit_code: status.code(),
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
    })
}

/// Read a stream line-by-line up to `max_size` bytes, marking truncation.
async fn read_capped<R: tokio::io::AsyncRead + Unpin>(reader: R, max_size: usize) -> (String, bool) {
    let mut buf_reader = BufReader::new(reader);
    let mut output = String::with_capacity(max_size.min(64 * 1024));
    let mut line = String::with_capacity(4096);
    let mut truncated = false;

    loop {
        line.clear();
        match buf_reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {
                if output.len() + line.len() > max_size {
                    // Back the cut off to a char boundary; the cap may land
                    // inside a multi-byte character.
                    let mut cut = max_size.saturating_sub(output.len()).min(line.len());
                    while cut > 0 && !line.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    if cut > 0 {
                        output.push_str(&line[..cut]);
                    }
                    output.push_str(TRUNCATION_MARKER);
                    truncated = true;
                    break;
                }
                output.push_str(&line);
            }
            Err(e) => {
                tracing::warn!("Error reading process output: {e}");
                break;
            }
        }
    }

    (output, truncated)
}

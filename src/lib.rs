//! starterbed - Container test-harness utilities
//!
//! Support tooling for the integration suite that exercises the clustered
//! database starter inside containers. Two independent facilities:
//!
//! - **Container helpers** ([`docker`]) - create/remove volumes and
//!   containers through a docker-compatible CLI, bulk-clean containers by
//!   label, and dump diagnostic logs when a fixture fails.
//! - **Condition polling** ([`wait`]) - run a probe on a fixed interval
//!   until it settles or a deadline elapses, with a cooperative cancellation
//!   signal.
//!
//! The binary exposes the same helpers for manual cleanup between test runs.

pub mod cli;
pub mod config;
pub mod docker;
pub mod error;
pub mod process;
pub mod wait;

pub use cli::{Cli, Commands};
pub use config::{load_config, Config};
pub use docker::{scratch_id, ContainerSummary, DockerCli};
pub use error::HarnessError;
pub use process::{spawn_captured, CommandOutput, SpawnOptions};
pub use wait::{require_until, wait_until, ProbeOutcome, WaitError};

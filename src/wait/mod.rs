//! Polling with a deadline
//!
//! `wait_until` runs a probe on a fixed interval until it reports that the
//! watched condition is settled, or a deadline elapses. Integration tests use
//! it to wait for containers to come up, ports to open, or log lines to
//! appear.
//!
//! A probe reports one of four outcomes:
//!
//! - [`ProbeOutcome::Pending`] keeps the loop going;
//! - [`ProbeOutcome::Ready`] ends the wait with success;
//! - [`ProbeOutcome::Cancel`] also ends the wait with success — it lets a
//!   probe short-circuit the wait (the condition became moot) without the
//!   caller telling the two apart;
//! - [`ProbeOutcome::Failed`] ends the wait with the probe's own reason,
//!   returned to the caller verbatim. A failure is terminal whether it
//!   happens on the immediate first call or on a later tick; there is no
//!   retry-on-failure.
//!
//! The deadline timer and the interval ticker are owned by the call's stack
//! frame, so both are dropped on every exit path. There is no way to abort a
//! probe that blocks indefinitely: the executor only multiplexes its own two
//! timers and never interrupts an in-flight probe invocation.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Result of a single probe invocation.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// Condition not satisfied yet; invoke again on the next interval tick.
    Pending,
    /// Condition satisfied; stop polling.
    Ready,
    /// Stop polling and report success without the condition being observed.
    Cancel,
    /// Terminal failure; polling stops and the reason is handed back as-is.
    Failed(anyhow::Error),
}

impl ProbeOutcome {
    /// Map a boolean check to `Ready`/`Pending`.
    pub fn from_ready(ready: bool) -> Self {
        if ready {
            ProbeOutcome::Ready
        } else {
            ProbeOutcome::Pending
        }
    }
}

impl From<anyhow::Error> for ProbeOutcome {
    fn from(reason: anyhow::Error) -> Self {
        ProbeOutcome::Failed(reason)
    }
}

/// Why a wait did not end with success.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The deadline elapsed without the probe settling.
    #[error("timed out after {0:?} waiting for condition")]
    Timeout(Duration),
    /// The probe reported a terminal failure; the reason is unchanged.
    #[error(transparent)]
    Probe(anyhow::Error),
}

/// Poll `probe` every `interval` until it settles or `timeout` elapses.
///
/// The probe runs once immediately, then once per tick. When a tick and the
/// deadline mature in the same instant, which one is observed first is a
/// race; either way exactly one outcome is produced. Missed ticks are made
/// up rather than skipped, so a probe that stays pending is invoked about
/// `ceil(timeout / interval)` times.
pub async fn wait_until<F, Fut>(
    mut probe: F,
    timeout: Duration,
    interval: Duration,
) -> Result<(), WaitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeOutcome>,
{
    match probe().await {
        ProbeOutcome::Ready | ProbeOutcome::Cancel => return Ok(()),
        ProbeOutcome::Failed(reason) => return Err(WaitError::Probe(reason)),
        ProbeOutcome::Pending => {}
    }

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    // First tick fires one interval from now, not immediately; the immediate
    // invocation already happened above.
    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        tokio::select! {
            _ = &mut deadline => return Err(WaitError::Timeout(timeout)),
            _ = ticker.tick() => match probe().await {
                ProbeOutcome::Ready | ProbeOutcome::Cancel => return Ok(()),
                ProbeOutcome::Failed(reason) => return Err(WaitError::Probe(reason)),
                ProbeOutcome::Pending => {}
            },
        }
    }
}

/// Test-assertion variant of [`wait_until`]: panics (failing the enclosing
/// test) with the error text when the wait does not end in success.
pub async fn require_until<F, Fut>(probe: F, timeout: Duration, interval: Duration)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ProbeOutcome>,
{
    if let Err(err) = wait_until(probe, timeout, interval).await {
        panic!("condition was not met: {err}");
    }
}

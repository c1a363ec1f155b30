use std::time::Duration;

use tracing::{debug, error, info};

use crate::clock::Clock;

/// The outcome of a single status check for an asynchronous job
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job reached its terminal, successful state
    Completed,
    /// The job is still running or reported a state that may still change
    Retryable,
    /// The service reported the job as failed
    Failed,
    /// The job could not be found by any of the lookup paths
    Unknown,
}

impl PollOutcome {
    /// Whether this outcome ends a poll sequence on its own.
    ///
    /// Only [`PollOutcome::Completed`] does, the poller keeps checking on every
    /// other outcome until the timeout is reached
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollOutcome::Completed)
    }
}

/// Timing settings for [`wait_until_terminal`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollConfig {
    /// Grace period before the first status check
    pub startup_delay: Duration,
    /// Maximum time spent checking, measured after the startup delay
    pub timeout: Duration,
    /// Fixed delay between two status checks
    pub backoff_interval: Duration,
}

impl PollConfig {
    /// Creates a new config from the three durations
    pub const fn new(startup_delay: Duration, timeout: Duration, backoff_interval: Duration) -> Self {
        Self {
            startup_delay,
            timeout,
            backoff_interval,
        }
    }

    /// The defaults used when waiting for a transfer request
    pub const fn transfer() -> Self {
        Self::new(
            Duration::from_secs(0),
            Duration::from_secs(300),
            Duration::from_secs(30),
        )
    }
}

/// Defaults used when waiting for an indexing task
impl Default for PollConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_secs(0),
            Duration::from_secs(600),
            Duration::from_secs(30),
        )
    }
}

/// Repeatedly calls `fetch_status` until it reports [`PollOutcome::Completed`]
/// or the timeout in `config` is reached.
///
/// Sleeps `startup_delay` once before the first check and `backoff_interval`
/// between checks. Returns `Ok(true)` once the job completed and `Ok(false)`
/// when the next check would only happen after the timeout. Errors returned by
/// `fetch_status` abort the wait immediately and are handed back to the caller.
///
/// Every outcome other than `Completed` is handled the same way, a `Failed`
/// job is checked again until the timeout.
pub fn wait_until_terminal<F, E, C>(
    mut fetch_status: F,
    config: &PollConfig,
    clock: &C,
) -> Result<bool, E>
where
    F: FnMut() -> Result<PollOutcome, E>,
    C: Clock + ?Sized,
{
    clock.sleep(config.startup_delay);

    let start = clock.now();
    let mut attempt: u32 = 0;
    info!(
        timeout_secs = config.timeout.as_secs(),
        backoff_secs = config.backoff_interval.as_secs(),
        "Waiting for job to finish"
    );

    loop {
        attempt += 1;
        let outcome = fetch_status()?;
        if outcome.is_terminal() {
            debug!(attempt, "Job completed");
            return Ok(true);
        }

        let elapsed = clock.now().saturating_duration_since(start);
        if elapsed.saturating_add(config.backoff_interval) > config.timeout {
            error!(
                attempt,
                timeout_secs = config.timeout.as_secs(),
                "Timeout waiting for job to finish"
            );
            return Ok(false);
        }

        debug!(attempt, ?outcome, "Job not finished yet, waiting");
        clock.sleep(config.backoff_interval);
    }
}

use std::fmt;

use crate::clock::Clock;
use crate::poller::{self, PollConfig, PollOutcome};
use crate::Error;

/// Identifies one asynchronous job that was triggered on a service
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct JobHandle {
    /// The id the service returned when the job was triggered
    pub job_id: String,
    /// The tenant or dataspace the job runs in, needed to look up its status
    pub scope: String,
}

impl JobHandle {
    /// Creates a new handle for the given job in the given scope
    pub fn new(job_id: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            scope: scope.into(),
        }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}@{}", self.job_id, self.scope)
    }
}

/// Maps the job-status representation of one service onto a [`PollOutcome`]
pub trait JobStatusResolver {
    /// Looks up the current status of `job`, issuing one request per call
    /// (plus the fallback lookup, if the service needs one)
    fn resolve(&self, job: &JobHandle) -> Result<PollOutcome, Error>;

    /// Waits for `job` to complete, see [`poller::wait_until_terminal`]
    fn wait_for(
        &self,
        job: &JobHandle,
        config: &PollConfig,
        clock: &dyn Clock,
    ) -> Result<bool, Error> {
        poller::wait_until_terminal(|| self.resolve(job), config, clock)
    }
}

use tracing::debug;

use super::TransferClient;
use crate::job::{JobHandle, JobStatusResolver};
use crate::poller::PollOutcome;
use crate::Error;

/// The execution status of a finished transfer request, matched case-sensitively
pub const COMPLETED_STATUS: &str = "Completed";

/// Resolves the status of transfer requests, the scope of the handle is the
/// dataspace
pub struct TransferJobResolver<'a> {
    client: &'a TransferClient,
}

impl<'a> TransferJobResolver<'a> {
    /// Creates a resolver that looks up the requests through `client`
    pub fn new(client: &'a TransferClient) -> Self {
        Self { client }
    }
}

impl JobStatusResolver for TransferJobResolver<'_> {
    fn resolve(&self, job: &JobHandle) -> Result<PollOutcome, Error> {
        let status = self.client.check_request_status(&job.scope, &job.job_id)?;
        Ok(outcome_for(status.as_deref()))
    }
}

/// Maps the `executionStatus` of a request onto the poll outcome
pub fn outcome_for(status: Option<&str>) -> PollOutcome {
    match status {
        Some(COMPLETED_STATUS) => PollOutcome::Completed,
        other => {
            debug!(status = ?other, "Mapping request status to retry");
            PollOutcome::Retryable
        }
    }
}

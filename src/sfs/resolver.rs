use tracing::debug;

use super::models::LoadingLog;
use super::SfsClient;
use crate::job::{JobHandle, JobStatusResolver};
use crate::poller::PollOutcome;
use crate::Error;

/// The execution status of a finished loading
pub const COMPLETED_STATUS: &str = "completed";

/// Resolves the status of indexing jobs, the scope of the handle is the tenant
pub struct IndexingJobResolver<'a> {
    client: &'a SfsClient,
}

impl<'a> IndexingJobResolver<'a> {
    /// Creates a resolver that looks up the jobs through `client`
    pub fn new(client: &'a SfsClient) -> Self {
        Self { client }
    }
}

impl JobStatusResolver for IndexingJobResolver<'_> {
    fn resolve(&self, job: &JobHandle) -> Result<PollOutcome, Error> {
        let log = self.client.get_log(&job.scope, &job.job_id)?;
        Ok(outcome_for(log.as_ref()))
    }
}

/// Maps a loading log onto the poll outcome, a missing log is `Unknown`
pub fn outcome_for(log: Option<&LoadingLog>) -> PollOutcome {
    let log = match log {
        None => return PollOutcome::Unknown,
        Some(l) => l,
    };

    match log.execution_status.as_deref() {
        Some(COMPLETED_STATUS) => PollOutcome::Completed,
        other => {
            debug!(id = %log.id, status = ?other, "Mapping loading status to retry");
            PollOutcome::Retryable
        }
    }
}

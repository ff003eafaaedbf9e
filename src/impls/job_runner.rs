use crate::services::DownloadWorker;
use async_trait::async_trait;
use download_jobs::{JobPayload, JobRunner, JobRunnerError};

#[async_trait]
impl JobRunner for DownloadWorker {
    async fn enqueue(&self, payload: JobPayload) -> Result<(), JobRunnerError> {
        DownloadWorker::enqueue(self, payload).map_err(|error| JobRunnerError(Box::new(error)))
    }
}

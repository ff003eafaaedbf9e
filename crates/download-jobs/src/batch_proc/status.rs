use crate::batch_proc::types::{JobState, JobStatus, StatusSnapshot};
use crate::JobId;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Finished jobs kept on the board before the oldest ones are dropped.
pub const FINISHED_JOBS_CAPACITY: usize = 100;

enum StatusCommand {
    Update(JobStatus),
    Snapshot(oneshot::Sender<StatusSnapshot>),
    ClearFinished,
}

#[derive(Debug, thiserror::Error)]
pub enum StatusChannelError {
    #[error("Status board is not running")]
    BoardStopped,
}

/// Sending half of the job status board. Cheap to clone, shared by the job
/// submitter and the job runner.
#[derive(Clone)]
pub struct StatusChannel {
    sender: mpsc::UnboundedSender<StatusCommand>,
}

/// Single owner of job statuses. Must be spawned with [`StatusBoard::run`].
pub struct StatusBoard {
    receiver: mpsc::UnboundedReceiver<StatusCommand>,
    jobs: Vec<JobStatus>,
    finished_capacity: usize,
}

impl StatusChannel {
    pub fn create() -> (StatusChannel, StatusBoard) {
        Self::with_finished_capacity(FINISHED_JOBS_CAPACITY)
    }

    pub fn with_finished_capacity(finished_capacity: usize) -> (StatusChannel, StatusBoard) {
        let (sender, receiver) = mpsc::unbounded_channel();

        (
            StatusChannel { sender },
            StatusBoard {
                receiver,
                jobs: Vec::new(),
                finished_capacity,
            },
        )
    }

    pub fn update(&self, job_id: &JobId, title: &str, state: JobState) {
        let status = JobStatus {
            job_id: *job_id,
            title: title.to_string(),
            state,
        };

        if self.sender.send(StatusCommand::Update(status)).is_err() {
            warn!(%job_id, "Status board has stopped, dropping job status update");
        }
    }

    pub async fn snapshot(&self) -> Result<StatusSnapshot, StatusChannelError> {
        let (reply, response) = oneshot::channel();

        self.sender
            .send(StatusCommand::Snapshot(reply))
            .map_err(|_| StatusChannelError::BoardStopped)?;

        response.await.map_err(|_| StatusChannelError::BoardStopped)
    }

    pub fn clear_finished(&self) {
        if self.sender.send(StatusCommand::ClearFinished).is_err() {
            warn!("Status board has stopped, unable to clear finished jobs");
        }
    }
}

impl StatusBoard {
    pub async fn run(mut self) {
        while let Some(command) = self.receiver.recv().await {
            self.handle(command);
        }

        debug!("Status board stopped");
    }

    fn handle(&mut self, command: StatusCommand) {
        match command {
            StatusCommand::Update(status) => {
                self.apply(status);
                self.evict_finished();
            }
            StatusCommand::Snapshot(reply) => {
                let _ = reply.send(self.jobs.clone());
            }
            StatusCommand::ClearFinished => self.jobs.retain(|job| !job.state.is_finished()),
        }
    }

    fn apply(&mut self, status: JobStatus) {
        match self.jobs.iter_mut().find(|job| job.job_id == status.job_id) {
            Some(job) if job.state.accepts(&status.state) => {
                job.state = status.state;
            }
            Some(job) => {
                debug!(
                    job_id = %job.job_id,
                    state = ?status.state,
                    "Ignoring stale job status update"
                );
            }
            None => self.jobs.push(status),
        }
    }

    fn evict_finished(&mut self) {
        let capacity = self.finished_capacity;
        let mut finished = self
            .jobs
            .iter()
            .filter(|job| job.state.is_finished())
            .count();

        if finished <= capacity {
            return;
        }

        self.jobs.retain(|job| {
            if finished > capacity && job.state.is_finished() {
                finished -= 1;
                false
            } else {
                true
            }
        });
    }
}

use crate::batch_proc::naming::{archive_output_name, track_output_name};
use crate::batch_proc::status::StatusChannel;
use crate::batch_proc::traits::JobRunner;
use crate::batch_proc::types::{AlbumInfo, DownloadSettings, JobKind, JobPayload, JobState, Track};
use crate::JobId;
use std::sync::Arc;
use tracing::{debug, error};

/// Turns tracks and albums into download jobs and hands them to the job runner.
///
/// Submission is fire-and-forget: the runner reports progress through the
/// same status channel on its own.
pub struct JobSubmitter {
    job_runner: Arc<dyn JobRunner>,
    status_channel: StatusChannel,
    settings: DownloadSettings,
}

impl JobSubmitter {
    pub fn new(
        job_runner: Arc<dyn JobRunner>,
        status_channel: StatusChannel,
        settings: DownloadSettings,
    ) -> Self {
        Self {
            job_runner,
            status_channel,
            settings,
        }
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    pub async fn submit_track(&self, track: Track) -> Option<JobId> {
        let payload = JobPayload {
            job_id: JobId::new(),
            title: track.format_title(),
            output_name: track_output_name(&track, &self.settings),
            settings: self.settings.clone(),
            kind: JobKind::Track { track },
        };

        self.submit(payload).await
    }

    pub async fn submit_archive(&self, album: AlbumInfo) -> Option<JobId> {
        let payload = JobPayload {
            job_id: JobId::new(),
            title: album.format_title(),
            output_name: archive_output_name(&album, &self.settings),
            settings: self.settings.clone(),
            kind: JobKind::Archive { album },
        };

        self.submit(payload).await
    }

    async fn submit(&self, payload: JobPayload) -> Option<JobId> {
        let job_id = payload.job_id;
        let title = payload.title.clone();

        self.status_channel.update(&job_id, &title, JobState::Queued);

        match self.job_runner.enqueue(payload).await {
            Ok(()) => {
                debug!(%job_id, %title, "Download job has been queued");
                Some(job_id)
            }
            Err(error) => {
                error!(?error, %job_id, %title, "Job runner rejected download job");
                self.status_channel.update(
                    &job_id,
                    &title,
                    JobState::Failed {
                        reason: error.to_string(),
                    },
                );
                None
            }
        }
    }
}

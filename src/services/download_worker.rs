use crate::services::archive::{pack_files, ArchiveError};
use download_jobs::{
    resolve_album, track_output_name, AlbumCache, AlbumDetail, AlbumInfo, AudioQuality,
    CatalogProvider, CatalogProviderError, JobKind, JobPayload, JobState, StatusChannel, Track,
};
use futures_lite::StreamExt;
use qobuz_client::{QobuzClient, QobuzClientError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub(crate) enum DownloadJobError {
    #[error(transparent)]
    Qobuz(#[from] QobuzClientError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogProviderError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error("Album has no streamable tracks")]
    NothingToDownload,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum DownloadWorkerError {
    #[error("Download worker has stopped")]
    Stopped,
}

/// Runs download jobs in the background, at most `max_concurrent_jobs` at once
/// and in the order they were enqueued.
pub(crate) struct DownloadWorker {
    sender: mpsc::UnboundedSender<JobPayload>,
}

struct JobContext {
    qobuz_client: Arc<QobuzClient>,
    catalog: Arc<dyn CatalogProvider>,
    album_cache: Arc<dyn AlbumCache>,
    status_channel: StatusChannel,
    download_directory: PathBuf,
}

impl DownloadWorker {
    pub(crate) fn start(
        qobuz_client: Arc<QobuzClient>,
        catalog: Arc<dyn CatalogProvider>,
        album_cache: Arc<dyn AlbumCache>,
        status_channel: StatusChannel,
        download_directory: PathBuf,
        max_concurrent_jobs: usize,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let context = Arc::new(JobContext {
            qobuz_client,
            catalog,
            album_cache,
            status_channel,
            download_directory,
        });
        let permits = Arc::new(Semaphore::new(max_concurrent_jobs.max(1)));

        actix_rt::spawn(dispatch(receiver, context, permits));

        Self { sender }
    }

    pub(crate) fn enqueue(&self, payload: JobPayload) -> Result<(), DownloadWorkerError> {
        self.sender
            .send(payload)
            .map_err(|_| DownloadWorkerError::Stopped)
    }
}

async fn dispatch(
    mut receiver: mpsc::UnboundedReceiver<JobPayload>,
    context: Arc<JobContext>,
    permits: Arc<Semaphore>,
) {
    while let Some(payload) = receiver.recv().await {
        let permit = match Arc::clone(&permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(error) => {
                error!(?error, "Unable to acquire download slot");
                break;
            }
        };

        actix_rt::spawn({
            let context = Arc::clone(&context);

            async move {
                context.run(payload).await;
                drop(permit);
            }
        });
    }

    debug!("Download worker stopped");
}

fn file_name(output_name: &str, quality: AudioQuality) -> String {
    format!("{}.{}", output_name, quality.extension())
}

impl JobContext {
    async fn run(&self, payload: JobPayload) {
        let job_id = payload.job_id;
        let title = payload.title.clone();

        info!(%job_id, %title, "Starting download job");

        let result = match &payload.kind {
            JobKind::Track { track } => self.run_track(&payload, track).await,
            JobKind::Archive { album } => self.run_archive(&payload, album).await,
        };

        let state = match result {
            Ok(path) => {
                info!(%job_id, %title, path = %path.display(), "Download job completed");
                JobState::Completed {
                    path: path.display().to_string(),
                }
            }
            Err(error) => {
                error!(?error, %job_id, %title, "Download job failed");
                JobState::Failed {
                    reason: error.to_string(),
                }
            }
        };

        self.report(&payload, state);
    }

    fn report(&self, payload: &JobPayload, state: JobState) {
        self.status_channel
            .update(&payload.job_id, &payload.title, state);
    }

    async fn run_track(
        &self,
        payload: &JobPayload,
        track: &Track,
    ) -> Result<PathBuf, DownloadJobError> {
        tokio::fs::create_dir_all(&self.download_directory).await?;

        let quality = payload.settings.quality;
        let path = self
            .download_directory
            .join(file_name(&payload.output_name, quality));

        let result = self
            .download_track(track, quality, &path, |progress| {
                self.report(payload, JobState::Downloading { progress })
            })
            .await;

        if let Err(error) = result {
            tokio::fs::remove_file(&path).await.ok();
            return Err(error);
        }

        Ok(path)
    }

    async fn run_archive(
        &self,
        payload: &JobPayload,
        album: &AlbumInfo,
    ) -> Result<PathBuf, DownloadJobError> {
        let AlbumDetail { info, tracks } =
            resolve_album(self.catalog.as_ref(), self.album_cache.as_ref(), album).await?;

        let tracks = tracks
            .into_iter()
            .filter(|track| track.streamable)
            .map(|track| track.with_album(info.clone()))
            .collect::<Vec<_>>();

        if tracks.is_empty() {
            return Err(DownloadJobError::NothingToDownload);
        }

        let staging_directory = self
            .download_directory
            .join(format!(".{}", payload.job_id));
        tokio::fs::create_dir_all(&staging_directory).await?;

        let result = self
            .download_and_pack(payload, &tracks, &staging_directory)
            .await;

        if let Err(error) = tokio::fs::remove_dir_all(&staging_directory).await {
            warn!(?error, job_id = %payload.job_id, "Unable to remove staging directory");
        }

        result
    }

    async fn download_and_pack(
        &self,
        payload: &JobPayload,
        tracks: &[Track],
        staging_directory: &Path,
    ) -> Result<PathBuf, DownloadJobError> {
        let quality = payload.settings.quality;
        let mut files = Vec::with_capacity(tracks.len());

        for (index, track) in tracks.iter().enumerate() {
            let name = file_name(&track_output_name(track, &payload.settings), quality);
            let path = staging_directory
                .join(format!("{:03}.{}", index + 1, quality.extension()));

            self.download_track(track, quality, &path, |progress| {
                let overall = (index * 100 + usize::from(progress)) / tracks.len();
                self.report(
                    payload,
                    JobState::Downloading {
                        progress: overall as u8,
                    },
                )
            })
            .await?;

            files.push((path, name));
        }

        self.report(payload, JobState::Packaging);

        let archive_path = self
            .download_directory
            .join(format!("{}.zip", payload.output_name));

        tokio::task::spawn_blocking({
            let archive_path = archive_path.clone();
            move || pack_files(&files, &archive_path)
        })
        .await??;

        Ok(archive_path)
    }

    async fn download_track(
        &self,
        track: &Track,
        quality: AudioQuality,
        path: &Path,
        on_progress: impl Fn(u8),
    ) -> Result<(), DownloadJobError> {
        let file_url = self
            .qobuz_client
            .get_track_file_url(track.id.0, quality.format_id())
            .await?;
        let url = file_url
            .url
            .ok_or(QobuzClientError::MissingUrl(track.id.0))?;

        if file_url.sample {
            warn!(track_id = %track.id, "Only a sample of the track is available");
        }

        let response = self.qobuz_client.open_stream(&url).await?;
        let total = response.content_length().filter(|total| *total > 0);
        let mut stream = response.bytes_stream();
        let mut file = tokio::fs::File::create(path).await?;
        let mut received = 0u64;
        let mut last_progress = 0u8;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(QobuzClientError::from)?;
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;

            if let Some(total) = total {
                let progress = (received.saturating_mul(100) / total).min(100) as u8;

                if progress > last_progress {
                    last_progress = progress;
                    on_progress(progress);
                }
            }
        }

        file.flush().await?;

        debug!(track_id = %track.id, bytes = received, "Track downloaded");

        Ok(())
    }
}

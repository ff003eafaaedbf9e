use crate::batch_proc::pacer::SubmissionPacer;
use crate::batch_proc::submitter::JobSubmitter;
use crate::batch_proc::traits::{AlbumCache, CatalogProvider, CatalogProviderError, Notifier};
use crate::batch_proc::types::{
    AlbumDetail, AlbumInfo, BatchReport, CatalogResult, Notification, ResultKind, Track,
};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Unable to fetch tracks of '{title}': {source}")]
    Expansion {
        title: String,
        #[source]
        source: CatalogProviderError,
    },
    #[error("Archive download is not offered for playlists")]
    ArchiveNotOffered,
}

/// Returns the full album detail, fetching it only when the cache has no
/// entry for this album.
pub async fn resolve_album(
    catalog: &dyn CatalogProvider,
    album_cache: &dyn AlbumCache,
    album: &AlbumInfo,
) -> Result<AlbumDetail, CatalogProviderError> {
    if let Some(cached) = album_cache.get(&album.id).await {
        debug!(album_id = %album.id, "Using cached album detail");
        return Ok(cached);
    }

    let detail = catalog.get_album(&album.id).await?;
    album_cache.put(detail.clone()).await;

    Ok(detail)
}

pub struct BatchSequencer {
    catalog: Arc<dyn CatalogProvider>,
    album_cache: Arc<dyn AlbumCache>,
    submitter: Arc<JobSubmitter>,
    pacer: Arc<dyn SubmissionPacer>,
    notifier: Arc<dyn Notifier>,
}

/// A resolved track list, ready to be submitted.
pub struct Batch {
    title: String,
    kind: ResultKind,
    tracks: Vec<Track>,
    submitter: Arc<JobSubmitter>,
    pacer: Arc<dyn SubmissionPacer>,
    notifier: Arc<dyn Notifier>,
}

impl BatchSequencer {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        album_cache: Arc<dyn AlbumCache>,
        submitter: Arc<JobSubmitter>,
        pacer: Arc<dyn SubmissionPacer>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            catalog,
            album_cache,
            submitter,
            pacer,
            notifier,
        }
    }

    pub async fn run(&self, result: &CatalogResult) -> Result<BatchReport, BatchError> {
        let batch = self.prepare(result).await?;

        Ok(batch.submit_all().await)
    }

    /// Expands the result into its ordered track list. Album tracks carry the
    /// parent album metadata.
    pub async fn prepare(&self, result: &CatalogResult) -> Result<Batch, BatchError> {
        let title = result.format_title();

        let tracks = match result {
            CatalogResult::Playlist(playlist) => {
                self.catalog
                    .get_playlist(&playlist.id)
                    .await
                    .map_err(|source| BatchError::Expansion {
                        title: title.clone(),
                        source,
                    })?
                    .tracks
            }
            CatalogResult::Album(album) => {
                let detail = resolve_album(&*self.catalog, &*self.album_cache, album)
                    .await
                    .map_err(|source| BatchError::Expansion {
                        title: title.clone(),
                        source,
                    })?;
                let info = detail.info;

                detail
                    .tracks
                    .into_iter()
                    .map(|track| track.with_album(info.clone()))
                    .collect()
            }
        };

        info!(%title, tracks = tracks.len(), "Batch has been prepared");

        Ok(Batch {
            title,
            kind: result.kind(),
            tracks,
            submitter: Arc::clone(&self.submitter),
            pacer: Arc::clone(&self.pacer),
            notifier: Arc::clone(&self.notifier),
        })
    }

    /// Submits the whole album as a single archive job, without expanding it.
    pub async fn run_archive(&self, result: &CatalogResult) -> Result<BatchReport, BatchError> {
        let album = match result {
            CatalogResult::Album(album) => album,
            CatalogResult::Playlist(_) => return Err(BatchError::ArchiveNotOffered),
        };
        let title = album.format_title();

        self.submitter.submit_archive(album.clone()).await;
        self.notifier.notify(Notification {
            title: format!("Added '{}'", title),
            description: ResultKind::Album.queued_description().into(),
        });

        info!(%title, "Album archive has been submitted");

        Ok(BatchReport {
            title,
            kind: ResultKind::Album,
            submitted: 1,
            skipped: 0,
        })
    }
}

impl Batch {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    pub fn streamable_count(&self) -> usize {
        self.tracks.iter().filter(|track| track.streamable).count()
    }

    /// Submits streamable tracks in order, pacing between submissions, then
    /// emits a single notification for the whole batch.
    pub async fn submit_all(self) -> BatchReport {
        let mut submitted = 0;
        let mut skipped = 0;

        for track in self.tracks {
            if !track.streamable {
                debug!(track_id = %track.id, "Skipping track which is not streamable");
                skipped += 1;
                continue;
            }

            self.submitter.submit_track(track).await;
            submitted += 1;

            self.pacer.pace().await;
        }

        self.notifier.notify(Notification {
            title: format!("Added '{}'", self.title),
            description: self.kind.queued_description().into(),
        });

        info!(title = %self.title, submitted, skipped, "Batch has been submitted");

        BatchReport {
            title: self.title,
            kind: self.kind,
            submitted,
            skipped,
        }
    }
}

use crate::batch_proc::types::{AlbumDetail, JobPayload, Notification, PlaylistDetail};
use crate::{AlbumId, PlaylistId};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct CatalogProviderError(pub Box<dyn std::error::Error + Send + Sync>);

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn get_album(&self, album_id: &AlbumId) -> Result<AlbumDetail, CatalogProviderError>;
    async fn get_playlist(
        &self,
        playlist_id: &PlaylistId,
    ) -> Result<PlaylistDetail, CatalogProviderError>;
}

/// Previously fetched album details, owned by the caller.
#[async_trait]
pub trait AlbumCache: Send + Sync {
    async fn get(&self, album_id: &AlbumId) -> Option<AlbumDetail>;
    async fn put(&self, album: AlbumDetail);
}

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct JobRunnerError(pub Box<dyn std::error::Error + Send + Sync>);

/// Owns the lifecycle of a download job once it has been handed over.
#[async_trait]
pub trait JobRunner: Send + Sync {
    async fn enqueue(&self, payload: JobPayload) -> Result<(), JobRunnerError>;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

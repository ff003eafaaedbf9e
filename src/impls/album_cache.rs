use crate::storage::InMemoryStorage;
use async_trait::async_trait;
use download_jobs::{AlbumCache, AlbumDetail, AlbumId};
use tracing::debug;

#[async_trait]
impl AlbumCache for InMemoryStorage<AlbumId, AlbumDetail> {
    async fn get(&self, album_id: &AlbumId) -> Option<AlbumDetail> {
        InMemoryStorage::get(self, album_id).await
    }

    async fn put(&self, album: AlbumDetail) {
        let album_id = album.info.id.clone();
        self.save(album_id.clone(), album).await;

        let cached_albums = self.len().await;
        debug!(%album_id, cached_albums, "Album detail cached");
    }
}

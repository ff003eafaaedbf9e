use async_trait::async_trait;
use download_jobs::{
    AlbumDetail, AlbumId, AlbumInfo, CatalogProvider, CatalogProviderError, PlaylistDetail,
    PlaylistId, PlaylistInfo, Track, TrackId,
};
use qobuz_client::QobuzClient;
use std::sync::Arc;

const UNKNOWN_ARTIST: &str = "Unknown Artist";

pub(crate) struct QobuzCatalog(pub(crate) Arc<QobuzClient>);

fn album_info(album: &qobuz_client::Album) -> AlbumInfo {
    AlbumInfo {
        id: AlbumId(album.id.clone()),
        title: album.title.clone(),
        version: album.version.clone(),
        artist: album.artist.name.clone(),
        image: album
            .image
            .as_ref()
            .and_then(|image| image.large.clone().or_else(|| image.small.clone())),
        release_date: album.release_date_original.clone(),
        tracks_count: album.tracks_count,
    }
}

fn track(track: qobuz_client::Track, album_artist: Option<&str>) -> Track {
    let album = track.album.as_deref().map(album_info);
    let performer = track
        .performer
        .map(|performer| performer.name)
        .or_else(|| album.as_ref().map(|album| album.artist.clone()))
        .or_else(|| album_artist.map(ToString::to_string))
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    Track {
        id: TrackId(track.id),
        title: track.title,
        version: track.version,
        performer,
        track_number: track.track_number,
        media_number: track.media_number.unwrap_or(1),
        duration: track.duration,
        streamable: track.streamable,
        album,
    }
}

pub(crate) fn album_detail(album: qobuz_client::Album) -> AlbumDetail {
    let info = album_info(&album);
    let tracks = album
        .tracks
        .unwrap_or_default()
        .items
        .into_iter()
        .map(|item| track(item, Some(&info.artist)))
        .collect();

    AlbumDetail { info, tracks }
}

pub(crate) fn playlist_detail(playlist: qobuz_client::Playlist) -> PlaylistDetail {
    let info = PlaylistInfo {
        id: PlaylistId(playlist.id),
        name: playlist.name,
        owner: playlist.owner.map(|owner| owner.name),
        tracks_count: playlist.tracks_count,
    };
    let tracks = playlist
        .tracks
        .unwrap_or_default()
        .items
        .into_iter()
        .map(|item| track(item, None))
        .collect();

    PlaylistDetail { info, tracks }
}

#[async_trait]
impl CatalogProvider for QobuzCatalog {
    async fn get_album(&self, album_id: &AlbumId) -> Result<AlbumDetail, CatalogProviderError> {
        let album = self
            .0
            .get_album(album_id)
            .await
            .map_err(|error| CatalogProviderError(Box::new(error)))?;

        Ok(album_detail(album))
    }

    async fn get_playlist(
        &self,
        playlist_id: &PlaylistId,
    ) -> Result<PlaylistDetail, CatalogProviderError> {
        let playlist = self
            .0
            .get_playlist(**playlist_id)
            .await
            .map_err(|error| CatalogProviderError(Box::new(error)))?;

        Ok(playlist_detail(playlist))
    }
}

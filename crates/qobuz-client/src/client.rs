use crate::{Album, FileUrl, Paginated, Playlist};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

pub const QOBUZ_API_ENDPOINT: &str = "https://www.qobuz.com/api.json/0.2";

const PLAYLIST_PAGE_SIZE: u32 = 500;

#[derive(Debug, thiserror::Error)]
pub enum QobuzClientError {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error("Qobuz API responded with {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Track {0} has no downloadable file URL")]
    MissingUrl(u64),
}

pub type QobuzClientResult<T> = Result<T, QobuzClientError>;

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct QobuzClient {
    client: Client,
    endpoint: String,
    app_id: String,
    app_secret: String,
    auth_token: Option<String>,
}

impl QobuzClient {
    pub fn create(
        endpoint: &str,
        app_id: &str,
        app_secret: &str,
        auth_token: Option<&str>,
    ) -> QobuzClientResult<Self> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            app_secret: app_secret.to_string(),
            auth_token: auth_token.map(ToString::to_string),
        })
    }

    pub async fn get_album(&self, album_id: &str) -> QobuzClientResult<Album> {
        self.get_json("album/get", &[("album_id", album_id.to_string())]).await
    }

    /// Fetches a playlist together with all of its tracks, following the
    /// pagination of the track list.
    pub async fn get_playlist(&self, playlist_id: u64) -> QobuzClientResult<Playlist> {
        let mut playlist = self.get_playlist_page(playlist_id, 0).await?;
        let mut tracks = playlist.tracks.take().unwrap_or_default();

        while (tracks.items.len() as u32) < tracks.total {
            let offset = tracks.items.len() as u32;
            let page = self
                .get_playlist_page(playlist_id, offset)
                .await?
                .tracks
                .unwrap_or_default();

            if page.items.is_empty() {
                warn!(
                    playlist_id,
                    offset,
                    total = tracks.total,
                    "Playlist page is empty before reaching the announced total"
                );
                break;
            }

            debug!(playlist_id, offset, count = page.items.len(), "Fetched playlist page");

            tracks.items.extend(page.items);
        }

        playlist.tracks = Some(Paginated {
            offset: 0,
            limit: tracks.items.len() as u32,
            total: tracks.total,
            items: tracks.items,
        });

        Ok(playlist)
    }

    pub async fn get_track_file_url(
        &self,
        track_id: u64,
        format_id: u32,
    ) -> QobuzClientResult<FileUrl> {
        let request_ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs())
            .unwrap_or_default();
        let request_sig = request_signature(track_id, format_id, request_ts, &self.app_secret);

        let file_url: FileUrl = self
            .get_json(
                "track/getFileUrl",
                &[
                    ("track_id", track_id.to_string()),
                    ("format_id", format_id.to_string()),
                    ("intent", "stream".to_string()),
                    ("request_ts", request_ts.to_string()),
                    ("request_sig", request_sig),
                ],
            )
            .await?;

        if file_url.url.is_none() {
            return Err(QobuzClientError::MissingUrl(track_id));
        }

        Ok(file_url)
    }

    /// Opens a streaming download of a file URL returned by the API.
    pub async fn open_stream(&self, url: &str) -> QobuzClientResult<Response> {
        Ok(self.client.get(url).send().await?.error_for_status()?)
    }

    async fn get_playlist_page(
        &self,
        playlist_id: u64,
        offset: u32,
    ) -> QobuzClientResult<Playlist> {
        self.get_json(
            "playlist/get",
            &[
                ("playlist_id", playlist_id.to_string()),
                ("extra", "tracks".to_string()),
                ("limit", PLAYLIST_PAGE_SIZE.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> QobuzClientResult<T> {
        let mut request = self
            .client
            .get(format!("{}/{}", self.endpoint, path))
            .header("X-App-Id", &self.app_id)
            .query(query);

        if let Some(auth_token) = &self.auth_token {
            request = request.header("X-User-Auth-Token", auth_token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status.canonical_reason().unwrap_or("Unknown error").to_string(),
            };

            return Err(QobuzClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

pub(crate) fn request_signature(
    track_id: u64,
    format_id: u32,
    request_ts: u64,
    app_secret: &str,
) -> String {
    let digest = md5::compute(format!(
        "trackgetFileUrlformat_id{}intentstreamtrack_id{}{}{}",
        format_id, track_id, request_ts, app_secret
    ));

    format!("{:x}", digest)
}

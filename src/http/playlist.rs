use crate::types::{DataResponse, ErrorResponse};
use actix_web::web::{Data, Query};
use actix_web::{HttpResponse, Responder};
use qobuz_client::QobuzClient;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};

#[derive(Deserialize)]
pub(crate) struct PlaylistQuery {
    playlist_id: Option<String>,
}

/// Serves the upstream playlist as returned by the catalog, with all track pages.
pub(crate) async fn get_playlist(
    qobuz_client: Data<Arc<QobuzClient>>,
    query: Query<PlaylistQuery>,
) -> impl Responder {
    let raw_playlist_id = match query.playlist_id.as_deref().map(str::trim) {
        Some(playlist_id) if !playlist_id.is_empty() => playlist_id,
        _ => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::new("Missing playlist_id parameter"))
        }
    };

    let playlist_id = match raw_playlist_id.parse::<u64>() {
        Ok(playlist_id) => playlist_id,
        Err(error) => {
            warn!(?error, playlist_id = raw_playlist_id, "Invalid playlist id");
            return HttpResponse::BadRequest()
                .json(ErrorResponse::new("Invalid playlist_id parameter"));
        }
    };

    match qobuz_client.get_playlist(playlist_id).await {
        Ok(playlist) => HttpResponse::Ok().json(DataResponse { data: playlist }),
        Err(error) => {
            error!(?error, playlist_id, "Failed to fetch playlist");
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to fetch playlist"))
        }
    }
}

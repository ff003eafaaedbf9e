mod downloads;
mod health;
mod notifications;
mod playlist;
mod status;

#[cfg(test)]
mod http_tests;

pub(crate) use downloads::{create_download, get_download_options};
pub(crate) use health::readiness_check;
pub(crate) use notifications::get_notifications;
pub(crate) use playlist::get_playlist;
pub(crate) use status::{clear_finished_jobs, get_status};

use actix_web::web;

pub(crate) fn configure(config: &mut web::ServiceConfig) {
    config
        .service(web::resource("/api/get-playlist").route(web::get().to(get_playlist)))
        .service(web::resource("/api/downloads").route(web::post().to(create_download)))
        .service(
            web::resource("/api/downloads/options").route(web::post().to(get_download_options)),
        )
        .service(
            web::resource("/api/status")
                .route(web::get().to(get_status))
                .route(web::delete().to(clear_finished_jobs)),
        )
        .service(web::resource("/api/notifications").route(web::get().to(get_notifications)))
        .service(web::resource("/health").route(web::get().to(readiness_check)));
}

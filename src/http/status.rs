use crate::types::ErrorResponse;
use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};
use download_jobs::StatusChannel;
use tracing::error;

pub(crate) async fn get_status(status_channel: Data<StatusChannel>) -> impl Responder {
    match status_channel.snapshot().await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(error) => {
            error!(?error, "Unable to read job statuses");
            HttpResponse::ServiceUnavailable().json(ErrorResponse::new(error.to_string()))
        }
    }
}

pub(crate) async fn clear_finished_jobs(status_channel: Data<StatusChannel>) -> impl Responder {
    status_channel.clear_finished();

    HttpResponse::NoContent().finish()
}

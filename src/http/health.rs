use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};
use download_jobs::StatusChannel;
use tracing::error;

pub(crate) async fn readiness_check(status_channel: Data<StatusChannel>) -> impl Responder {
    if let Err(error) = status_channel.snapshot().await {
        error!(?error, "Readiness check failed");
    }

    HttpResponse::Ok().finish()
}

use crate::types::{DownloadAccepted, DownloadMode, DownloadRequest, ErrorResponse};
use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, Responder};
use download_jobs::{Batch, BatchError, BatchSequencer, CatalogResult};
use std::sync::Arc;
use tracing::{error, info, warn};

fn submit_in_background(batch: Batch) -> usize {
    let jobs = batch.streamable_count();

    actix_rt::spawn(async move {
        let report = batch.submit_all().await;

        info!(
            title = %report.title,
            submitted = report.submitted,
            skipped = report.skipped,
            "Background batch submission finished"
        );
    });

    jobs
}

pub(crate) async fn create_download(
    sequencer: Data<Arc<BatchSequencer>>,
    request: Json<DownloadRequest>,
) -> impl Responder {
    let DownloadRequest { result, mode } = request.into_inner();
    let title = result.format_title();
    let kind = result.kind();

    let jobs = match mode {
        DownloadMode::Archive => sequencer
            .run_archive(&result)
            .await
            .map(|report| report.submitted),
        DownloadMode::Tracks => sequencer.prepare(&result).await.map(submit_in_background),
    };

    match jobs {
        Ok(jobs) => HttpResponse::Accepted().json(DownloadAccepted {
            title,
            kind,
            mode,
            jobs,
        }),
        Err(error @ BatchError::ArchiveNotOffered) => {
            warn!(%title, "Archive download requested for a playlist");
            HttpResponse::BadRequest().json(ErrorResponse::new(error.to_string()))
        }
        Err(error @ BatchError::Expansion { .. }) => {
            error!(?error, %title, "Unable to prepare download batch");
            HttpResponse::BadGateway().json(ErrorResponse::new(error.to_string()))
        }
    }
}

pub(crate) async fn get_download_options(result: Json<CatalogResult>) -> impl Responder {
    HttpResponse::Ok().json(result.download_options())
}

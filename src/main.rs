use crate::config::Config;
use crate::impls::QobuzCatalog;
use crate::services::{DownloadWorker, NotificationLog};
use crate::storage::InMemoryStorage;
use actix_rt::signal::unix;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use download_jobs::{
    AlbumCache, AlbumDetail, AlbumId, BatchSequencer, CatalogProvider, JobSubmitter,
    StatusChannel,
};
use futures_lite::FutureExt;
use qobuz_client::QobuzClient;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

mod config;
mod http;
mod impls;
mod services;
mod storage;
mod types;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const ALBUM_CACHE_CAPACITY: usize = 64;

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let mut terminate = unix::signal(unix::SignalKind::terminate())?;
    let mut interrupt = unix::signal(unix::SignalKind::interrupt())?;

    dotenv::dotenv().ok();
    env_logger::init();

    let config = Arc::from(Config::from_env());

    info!(version = VERSION, "Starting application...");

    let (status_channel, status_board) = StatusChannel::create();
    actix_rt::spawn(status_board.run());

    let qobuz_client = QobuzClient::create(
        &config.qobuz.api_endpoint,
        &config.qobuz.app_id,
        &config.qobuz.app_secret,
        config.qobuz.auth_token.as_deref(),
    )
    .expect("Unable to initialize Qobuz client");
    let qobuz_client = Arc::new(qobuz_client);

    let catalog: Arc<dyn CatalogProvider> = Arc::new(QobuzCatalog(Arc::clone(&qobuz_client)));
    let album_cache: Arc<dyn AlbumCache> = Arc::new(
        InMemoryStorage::<AlbumId, AlbumDetail>::new(ALBUM_CACHE_CAPACITY),
    );
    let notification_log = Arc::new(NotificationLog::new());

    let download_worker = DownloadWorker::start(
        Arc::clone(&qobuz_client),
        Arc::clone(&catalog),
        Arc::clone(&album_cache),
        status_channel.clone(),
        PathBuf::from(&config.download_directory),
        config.max_concurrent_jobs,
    );

    let batch_sequencer = {
        let job_submitter = JobSubmitter::new(
            Arc::new(download_worker),
            status_channel.clone(),
            config.download_settings(),
        );

        Arc::new(BatchSequencer::new(
            catalog,
            album_cache,
            Arc::new(job_submitter),
            config.submission_pacer(),
            notification_log.clone(),
        ))
    };

    let shutdown_timeout = config.shutdown_timeout;
    let bind_address = config.bind_address.clone();

    let server = HttpServer::new({
        move || {
            App::new()
                .app_data(Data::new(Arc::clone(&qobuz_client)))
                .app_data(Data::new(Arc::clone(&batch_sequencer)))
                .app_data(Data::new(status_channel.clone()))
                .app_data(Data::new(Arc::clone(&notification_log)))
                .configure(http::configure)
        }
    })
    .shutdown_timeout(shutdown_timeout)
    .bind(bind_address)?
    .run();

    let server_handle = server.handle();

    actix_rt::spawn({
        async move {
            if let Err(error) = server.await {
                error!(?error, "Error on http server");
            }
        }
    });

    info!("Application started");

    interrupt.recv().or(terminate.recv()).await;

    info!("Received shutdown signal. Shutting down gracefully...");

    server_handle.stop(true).await;

    Ok(())
}

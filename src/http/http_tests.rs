use crate::http::configure;
use crate::services::NotificationLog;
use crate::storage::InMemoryStorage;
use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{test, App};
use async_trait::async_trait;
use qobuz_client::QobuzClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use download_jobs::{
    AlbumDetail, AlbumId, AlbumInfo, BatchSequencer, CatalogProvider, CatalogProviderError,
    DownloadSettings, FixedDelayPacer, JobKind, JobPayload, JobRunner, JobRunnerError, JobState,
    JobSubmitter, PlaylistDetail, PlaylistId, PlaylistInfo, StatusChannel, Track, TrackId,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct CatalogMock {
    playlist: Option<PlaylistDetail>,
}

#[async_trait]
impl CatalogProvider for CatalogMock {
    async fn get_album(&self, album_id: &AlbumId) -> Result<AlbumDetail, CatalogProviderError> {
        Err(CatalogProviderError(
            format!("Album {} is unavailable", album_id).into(),
        ))
    }

    async fn get_playlist(
        &self,
        playlist_id: &PlaylistId,
    ) -> Result<PlaylistDetail, CatalogProviderError> {
        match &self.playlist {
            Some(playlist) if &playlist.info.id == playlist_id => Ok(playlist.clone()),
            _ => Err(CatalogProviderError("Playlist not found".into())),
        }
    }
}

#[derive(Default)]
struct JobRunnerMock {
    payloads: Mutex<Vec<JobPayload>>,
}

impl JobRunnerMock {
    fn titles(&self) -> Vec<String> {
        self.payloads
            .lock()
            .unwrap()
            .iter()
            .map(|payload| payload.title.clone())
            .collect()
    }
}

#[async_trait]
impl JobRunner for JobRunnerMock {
    async fn enqueue(&self, payload: JobPayload) -> Result<(), JobRunnerError> {
        self.payloads.lock().unwrap().push(payload);
        Ok(())
    }
}

struct Context {
    server: MockServer,
    qobuz_client: Arc<QobuzClient>,
    sequencer: Arc<BatchSequencer>,
    status_channel: StatusChannel,
    notification_log: Arc<NotificationLog>,
    job_runner: Arc<JobRunnerMock>,
}

fn track(id: u64, title: &str, streamable: bool) -> Track {
    Track {
        id: TrackId(id),
        title: title.into(),
        version: None,
        performer: "Robert Miles".into(),
        track_number: id as u32,
        media_number: 1,
        duration: 300,
        streamable,
        album: None,
    }
}

fn trance_classics() -> PlaylistDetail {
    PlaylistDetail {
        info: PlaylistInfo {
            id: PlaylistId(1337),
            name: "Trance Classics".into(),
            owner: Some("qobuz".into()),
            tracks_count: 3,
        },
        tracks: vec![
            track(1, "Children", true),
            track(2, "Fable", false),
            track(3, "One And One", true),
        ],
    }
}

async fn create_context(playlist: Option<PlaylistDetail>) -> Context {
    let server = MockServer::start().await;
    let qobuz_client = QobuzClient::create(&server.uri(), "app", "secret", None).unwrap();
    let qobuz_client = Arc::new(qobuz_client);

    let (status_channel, status_board) = StatusChannel::create();
    actix_rt::spawn(status_board.run());

    let catalog: Arc<dyn CatalogProvider> = Arc::new(CatalogMock { playlist });
    let job_runner = Arc::new(JobRunnerMock::default());
    let notification_log = Arc::new(NotificationLog::new());
    let submitter = Arc::new(JobSubmitter::new(
        job_runner.clone(),
        status_channel.clone(),
        DownloadSettings::default(),
    ));
    let sequencer = Arc::new(BatchSequencer::new(
        catalog,
        Arc::new(InMemoryStorage::<AlbumId, AlbumDetail>::new(4)),
        submitter,
        Arc::new(FixedDelayPacer::new(Duration::ZERO)),
        notification_log.clone(),
    ));

    Context {
        server,
        qobuz_client,
        sequencer,
        status_channel,
        notification_log,
        job_runner,
    }
}

macro_rules! init_app {
    ($context:expr) => {
        test::init_service(
            App::new()
                .app_data(Data::new(Arc::clone(&$context.qobuz_client)))
                .app_data(Data::new(Arc::clone(&$context.sequencer)))
                .app_data(Data::new($context.status_channel.clone()))
                .app_data(Data::new(Arc::clone(&$context.notification_log)))
                .configure(configure),
        )
        .await
    };
}

async fn wait_for_notification(context: &Context) {
    for _ in 0..100 {
        if !context.notification_log.recent().is_empty() {
            return;
        }

        actix_rt::time::sleep(Duration::from_millis(10)).await;
    }

    panic!("Expected a notification to be emitted");
}

#[actix_rt::test]
async fn test_get_playlist_passes_upstream_playlist_through() {
    let context = create_context(None).await;

    Mock::given(method("GET"))
        .and(path("/playlist/get"))
        .and(query_param("playlist_id", "1337"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1337,
            "name": "Trance Classics",
            "owner": { "id": 7, "name": "qobuz" },
            "tracks_count": 1,
            "tracks": {
                "offset": 0,
                "limit": 500,
                "total": 1,
                "items": [{
                    "id": 10,
                    "title": "Children",
                    "track_number": 1,
                    "streamable": true,
                    "performer": { "id": 1, "name": "Robert Miles" }
                }]
            }
        })))
        .expect(1)
        .mount(&context.server)
        .await;

    let app = init_app!(context);

    let request = test::TestRequest::get()
        .uri("/api/get-playlist?playlist_id=1337")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["data"]["name"], "Trance Classics");
    assert_eq!(body["data"]["owner"]["name"], "qobuz");
    assert_eq!(body["data"]["tracks"]["total"], 1);
    assert_eq!(
        body["data"]["tracks"]["items"][0]["performer"]["name"],
        "Robert Miles"
    );
}

#[actix_rt::test]
async fn test_get_playlist_without_id_is_rejected() {
    let context = create_context(None).await;
    let app = init_app!(context);

    for uri in ["/api/get-playlist", "/api/get-playlist?playlist_id="] {
        let request = test::TestRequest::get().uri(uri).to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({ "error": "Missing playlist_id parameter" }));
    }
}

#[actix_rt::test]
async fn test_get_playlist_with_invalid_id_is_rejected() {
    let context = create_context(None).await;
    let app = init_app!(context);

    let request = test::TestRequest::get()
        .uri("/api/get-playlist?playlist_id=abc")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_get_playlist_upstream_failure() {
    let context = create_context(None).await;

    Mock::given(method("GET"))
        .and(path("/playlist/get"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": "error",
            "code": 404,
            "message": "No result matching given argument"
        })))
        .mount(&context.server)
        .await;

    let app = init_app!(context);

    let request = test::TestRequest::get()
        .uri("/api/get-playlist?playlist_id=42")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(response).await;
    assert_eq!(body, json!({ "error": "Failed to fetch playlist" }));
}

#[actix_rt::test]
async fn test_playlist_download_submits_streamable_tracks() {
    let context = create_context(Some(trance_classics())).await;
    let app = init_app!(context);

    let request = test::TestRequest::post()
        .uri("/api/downloads")
        .set_json(json!({
            "result": { "type": "playlist", "id": 1337, "name": "Trance Classics" },
            "mode": "tracks"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body: Value = test::read_body_json(response).await;
    assert_eq!(
        body,
        json!({ "title": "Trance Classics", "kind": "playlist", "mode": "tracks", "jobs": 2 })
    );

    wait_for_notification(&context).await;

    assert_eq!(context.job_runner.titles(), vec!["Children", "One And One"]);
    assert_eq!(context.notification_log.recent().len(), 1);
    assert_eq!(
        context.notification_log.recent()[0].title,
        "Added 'Trance Classics'"
    );
}

#[actix_rt::test]
async fn test_archive_download_of_playlist_is_rejected() {
    let context = create_context(Some(trance_classics())).await;
    let app = init_app!(context);

    let request = test::TestRequest::post()
        .uri("/api/downloads")
        .set_json(json!({
            "result": { "type": "playlist", "id": 1337, "name": "Trance Classics" },
            "mode": "archive"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(context.job_runner.titles().is_empty());
}

#[actix_rt::test]
async fn test_album_archive_download_is_accepted() {
    let context = create_context(None).await;
    let app = init_app!(context);

    let request = test::TestRequest::post()
        .uri("/api/downloads")
        .set_json(json!({
            "result": {
                "type": "album",
                "id": "0743213437429",
                "title": "Dreamland",
                "artist": "Robert Miles"
            },
            "mode": "archive"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let payloads = context.job_runner.payloads.lock().unwrap().clone();
    assert_eq!(payloads.len(), 1);
    assert!(matches!(
        &payloads[0].kind,
        JobKind::Archive { album } if album.id == AlbumId::from("0743213437429")
    ));
    assert_eq!(context.notification_log.recent().len(), 1);
}

#[actix_rt::test]
async fn test_album_expansion_failure_is_bad_gateway() {
    let context = create_context(None).await;
    let app = init_app!(context);

    let request = test::TestRequest::post()
        .uri("/api/downloads")
        .set_json(json!({
            "result": {
                "type": "album",
                "id": "0743213437429",
                "title": "Dreamland",
                "artist": "Robert Miles"
            },
            "mode": "tracks"
        }))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(context.job_runner.titles().is_empty());
    assert!(context.notification_log.recent().is_empty());
}

#[actix_rt::test]
async fn test_download_options() {
    let context = create_context(None).await;
    let app = init_app!(context);

    let album = AlbumInfo {
        id: AlbumId::from("0743213437429"),
        title: "Dreamland".into(),
        version: None,
        artist: "Robert Miles".into(),
        image: None,
        release_date: None,
        tracks_count: 0,
    };

    let request = test::TestRequest::post()
        .uri("/api/downloads/options")
        .set_json(download_jobs::CatalogResult::Album(album))
        .to_request();
    let options: Vec<String> = test::call_and_read_body_json(&app, request).await;
    assert_eq!(options, vec!["ZIP Archive", "No ZIP Archive"]);

    let request = test::TestRequest::post()
        .uri("/api/downloads/options")
        .set_json(json!({ "type": "playlist", "id": 1337, "name": "Trance Classics" }))
        .to_request();
    let options: Vec<String> = test::call_and_read_body_json(&app, request).await;
    assert_eq!(options, vec!["Download All Tracks"]);
}

#[actix_rt::test]
async fn test_status_snapshot_and_clear() {
    let context = create_context(None).await;
    let app = init_app!(context);

    let job_id = download_jobs::JobId::new();
    context.status_channel.update(
        &job_id,
        "Children",
        JobState::Completed {
            path: "downloads/01. Robert Miles - Children.flac".into(),
        },
    );

    let request = test::TestRequest::get().uri("/api/status").to_request();
    let snapshot: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(snapshot[0]["title"], "Children");
    assert_eq!(snapshot[0]["state"], "completed");

    let request = test::TestRequest::delete().uri("/api/status").to_request();
    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let request = test::TestRequest::get().uri("/api/status").to_request();
    let snapshot: Value = test::call_and_read_body_json(&app, request).await;
    assert_eq!(snapshot, json!([]));
}

#[actix_rt::test]
async fn test_health() {
    let context = create_context(None).await;
    let app = init_app!(context);

    let request = test::TestRequest::get().uri("/health").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
}

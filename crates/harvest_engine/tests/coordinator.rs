use std::fs;
use std::sync::{Arc, Once};

use harvest_core::DownloadStatus;
use harvest_engine::{
    payload_channel, Coordinator, HarvestError, HarvestSettings, HttpPager, Pagination, Platform,
    RequestKind, ReqwestTransport, RunRequest, SessionProvider, SessionSettings, SourceSettings,
    StaticSession, TransportSettings,
};
use harvest_logging::initialize_for_tests;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(initialize_for_tests);
}

fn settings(root: &TempDir) -> HarvestSettings {
    HarvestSettings {
        storage_root: root.path().to_path_buf(),
        concurrency: 2,
        wait_timeout_ms: 200,
        settle_delay_ms: 20,
        ..HarvestSettings::default()
    }
}

async fn mount_profile(server: &MockServer) {
    let uri = server.uri();
    let page = json!({
        "hasMore": false,
        "itemList": [
            {"id": "101",
             "author": {"id": "6800", "uniqueId": "someone", "nickname": "Some One",
                        "avatarLarger": format!("{uri}/avatar.jpeg")},
             "video": {"downloadAddr": format!("{uri}/media/101.mp4")}},
            {"id": "102", "video": {"downloadAddr": format!("{uri}/media/102.mp4")}},
            {"id": "103", "video": {"downloadAddr": format!("{uri}/media/missing.mp4")}}
        ]
    });
    Mock::given(method("GET"))
        .and(path("/api/someone/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/avatar.jpeg"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"avatar".to_vec(), "image/jpeg"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/101.mp4"))
        .and(header("sec-fetch-dest", "image"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"video-101".to_vec(), "video/mp4"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/102.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"video-102".to_vec(), "video/mp4"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/missing.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

async fn run_once(
    server: &MockServer,
    root: &TempDir,
) -> Result<harvest_core::RunSummary, HarvestError> {
    let transport = Arc::new(ReqwestTransport::new(TransportSettings::default()).unwrap());
    let session = Arc::new(StaticSession::new(&SessionSettings {
        user_agent: Some("harvest-test".into()),
        ..SessionSettings::default()
    })
    .unwrap());
    let source = SourceSettings {
        platform: Platform::TikTok,
        url: format!("{}/api/{{username}}/items", server.uri()),
        pagination: Pagination::Single,
    };
    let (tx, rx) = payload_channel();
    let mut pager = HttpPager::new(
        transport.clone(),
        &source,
        "someone",
        session.headers(RequestKind::Discovery),
        tx,
        1 << 20,
    );
    let coordinator = Coordinator::new(settings(root), transport, session);
    let request = RunRequest {
        platform: Platform::TikTok,
        username: "@someone".into(),
        max_items: None,
    };
    coordinator.run(&request, &mut pager, rx).await
}

#[tokio::test]
async fn full_run_downloads_seeds_and_media_with_partial_failure() {
    init_logging();
    let server = MockServer::start().await;
    mount_profile(&server).await;
    let root = TempDir::new().unwrap();

    let summary = run_once(&server, &root).await.expect("run completes");

    assert!(summary.status);
    assert_eq!(summary.total_requested, None);
    assert_eq!(summary.total_processed, 4);
    let names: Vec<_> = summary.downloads.iter().map(|d| d.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec!["profile_picture.jpg", "101.mp4", "102.mp4", "103.mp4"]
    );
    let statuses: Vec<_> = summary.downloads.iter().map(|d| d.status).collect();
    assert_eq!(
        statuses,
        vec![
            DownloadStatus::Downloaded,
            DownloadStatus::Downloaded,
            DownloadStatus::Downloaded,
            DownloadStatus::Error,
        ]
    );
    assert!(summary.has_failures());
    assert_eq!(summary.profile.id, "6800");
    assert_eq!(summary.profile.nickname, "someone");

    let profile_dir = root.path().join("tiktok").join("someone");
    assert_eq!(fs::read(profile_dir.join("profile_picture.jpg")).unwrap(), b"avatar");
    assert_eq!(
        fs::read(profile_dir.join("videos").join("101.mp4")).unwrap(),
        b"video-101"
    );
}

#[tokio::test]
async fn rerun_reports_existing_files() {
    init_logging();
    let server = MockServer::start().await;
    mount_profile(&server).await;
    let root = TempDir::new().unwrap();

    run_once(&server, &root).await.unwrap();
    let second = run_once(&server, &root).await.unwrap();

    assert_eq!(second.count(DownloadStatus::Exists), 3);
    assert_eq!(second.count(DownloadStatus::Error), 1);
    assert_eq!(second.count(DownloadStatus::Downloaded), 0);
}

#[tokio::test]
async fn unreachable_target_aborts_the_run() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let root = TempDir::new().unwrap();

    let err = run_once(&server, &root).await.unwrap_err();

    assert!(matches!(err, HarvestError::InitialLoad(_)));
    assert!(fs::read_dir(root.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn summary_serializes_with_the_public_field_names() {
    init_logging();
    let server = MockServer::start().await;
    mount_profile(&server).await;
    let root = TempDir::new().unwrap();

    let summary = run_once(&server, &root).await.unwrap();
    let value = serde_json::to_value(&summary).unwrap();

    for key in ["status", "profile", "total_requested", "total_processed", "downloads"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    assert_eq!(value["downloads"][0]["fileName"], "profile_picture.jpg");
    assert_eq!(value["downloads"][3]["status"], "error");
    assert!(value["downloads"][1].get("error").is_none());
}

//! YouTubeClient 与调度器在模拟 HTTP 服务上的集成测试

use broadcast_scheduler::api::{BroadcastApi, BroadcastMetadata, Visibility, YouTubeClient};
use broadcast_scheduler::error::ApiError;
use broadcast_scheduler::models::{BroadcastRequest, ScheduleOutcome, Stage};
use broadcast_scheduler::{schedule_batch, Config, ScheduleOptions};
use chrono::{FixedOffset, NaiveDate, NaiveTime};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use std::path::Path;

const TOKEN: &str = "token-123";

fn client(server: &ServerGuard) -> YouTubeClient {
    let config = Config {
        api_base_url: server.url(),
        upload_base_url: format!("{}/upload", server.url()),
        ..Config::default()
    };
    YouTubeClient::new(&config, TOKEN)
}

fn offset() -> FixedOffset {
    FixedOffset::west_opt(4 * 3600).unwrap()
}

fn request(title: &str) -> BroadcastRequest {
    BroadcastRequest::new(
        title,
        "Pr. Marcos",
        NaiveDate::from_ymd_opt(2030, 4, 15).unwrap(),
        NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
    )
    .with_description("Culto ao vivo")
}

/// 直播流创建与绑定总是成功
async fn mock_stream_and_bind(server: &mut ServerGuard) -> (mockito::Mock, mockito::Mock) {
    let stream = server
        .mock("POST", "/liveStreams")
        .match_query(Matcher::UrlEncoded("part".into(), "snippet,cdn".into()))
        .with_status(200)
        .with_body(r#"{"id":"stream-1"}"#)
        .expect_at_least(1)
        .create_async()
        .await;
    let bind = server
        .mock("POST", "/liveBroadcasts/bind")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"id":"bound"}"#)
        .expect_at_least(1)
        .create_async()
        .await;
    (stream, bind)
}

#[tokio::test]
async fn test_create_inserts_broadcast_stream_and_binds() {
    let mut server = Server::new_async().await;

    let insert = server
        .mock("POST", "/liveBroadcasts")
        .match_query(Matcher::UrlEncoded(
            "part".into(),
            "snippet,status,contentDetails".into(),
        ))
        .match_header("authorization", "Bearer token-123")
        .match_body(Matcher::PartialJson(json!({
            "snippet": {
                "title": "Culto de Páscoa",
                "description": "Culto ao vivo",
                "scheduledStartTime": "2030-04-15T23:00:00Z"
            },
            "status": { "privacyStatus": "unlisted" }
        })))
        .with_status(200)
        .with_body(r#"{"id":"b1","snippet":{"title":"Culto de Páscoa"}}"#)
        .create_async()
        .await;
    let stream = server
        .mock("POST", "/liveStreams")
        .match_query(Matcher::UrlEncoded("part".into(), "snippet,cdn".into()))
        .with_status(200)
        .with_body(r#"{"id":"s1"}"#)
        .create_async()
        .await;
    let bind = server
        .mock("POST", "/liveBroadcasts/bind")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), "b1".into()),
            Matcher::UrlEncoded("streamId".into(), "s1".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"id":"b1"}"#)
        .create_async()
        .await;

    let meta = BroadcastMetadata::from_request(&request("Culto de Páscoa"), offset());
    let created = client(&server).create_unlisted_broadcast(&meta).await.unwrap();

    assert_eq!(created.id, "b1");
    assert_eq!(created.watch_url, "https://youtube.com/watch?v=b1");
    insert.assert_async().await;
    stream.assert_async().await;
    bind.assert_async().await;
}

#[tokio::test]
async fn test_create_quota_error_is_forbidden() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/liveBroadcasts")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body(r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota."}}"#)
        .create_async()
        .await;

    let meta = BroadcastMetadata::from_request(&request("A"), offset());
    let err = client(&server).create_unlisted_broadcast(&meta).await.unwrap_err();

    match err {
        ApiError::Forbidden { endpoint, message } => {
            assert_eq!(endpoint, "liveBroadcasts.insert");
            assert!(message.contains("exceeded your quota"));
        }
        other => panic!("expected forbidden, got {:?}", other),
    }
}

#[tokio::test]
async fn test_thumbnail_upload_and_failure_mapping() {
    let mut server = Server::new_async().await;
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("capa.png");
    std::fs::write(&image, b"\x89PNG fake").unwrap();

    let ok = server
        .mock("POST", "/upload/thumbnails/set")
        .match_query(Matcher::UrlEncoded("videoId".into(), "b1".into()))
        .match_header("content-type", "image/png")
        .with_status(200)
        .with_body(r#"{"items":[]}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/upload/thumbnails/set")
        .match_query(Matcher::UrlEncoded("videoId".into(), "b2".into()))
        .with_status(400)
        .with_body(r#"{"error":{"code":400,"message":"The thumbnail image file is too large."}}"#)
        .create_async()
        .await;

    let api = client(&server);
    api.set_thumbnail("b1", &image).await.unwrap();
    ok.assert_async().await;

    let err = api.set_thumbnail("b2", &image).await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Status { status: 400, ref message, .. } if message == "The thumbnail image file is too large."
    ));
}

#[tokio::test]
async fn test_thumbnail_missing_file_makes_no_request() {
    let mut server = Server::new_async().await;
    let upload = server
        .mock("POST", "/upload/thumbnails/set")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client(&server)
        .set_thumbnail("b1", Path::new("/nao/existe/capa.png"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::ImageRead { .. }));
    upload.assert_async().await;
}

#[tokio::test]
async fn test_set_visibility_lists_then_updates() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/liveBroadcasts")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("part".into(), "status".into()),
            Matcher::UrlEncoded("id".into(), "b1".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"items":[{"id":"b1","status":{"privacyStatus":"unlisted"}}]}"#)
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/liveBroadcasts")
        .match_query(Matcher::UrlEncoded("part".into(), "status".into()))
        .match_body(Matcher::PartialJson(json!({
            "id": "b1",
            "status": { "privacyStatus": "public" }
        })))
        .with_status(200)
        .with_body(r#"{"id":"b1"}"#)
        .create_async()
        .await;

    client(&server)
        .set_visibility("b1", Visibility::Public)
        .await
        .unwrap();

    list.assert_async().await;
    update.assert_async().await;
}

#[tokio::test]
async fn test_set_visibility_unknown_broadcast() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/liveBroadcasts")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"items":[]}"#)
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/liveBroadcasts")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let err = client(&server)
        .set_visibility("gone", Visibility::Public)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::NotFound { .. }));
    update.assert_async().await;
}

#[tokio::test]
async fn test_schedule_batch_isolates_create_failure() {
    let mut server = Server::new_async().await;

    for (title, id) in [("Culto 1", "b1"), ("Culto 3", "b3")] {
        server
            .mock("POST", "/liveBroadcasts")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({ "snippet": { "title": title } })))
            .with_status(200)
            .with_body(format!(r#"{{"id":"{}"}}"#, id))
            .create_async()
            .await;
    }
    server
        .mock("POST", "/liveBroadcasts")
        .match_query(Matcher::Any)
        .match_body(Matcher::PartialJson(json!({ "snippet": { "title": "Culto 2" } })))
        .with_status(403)
        .with_body(r#"{"error":{"message":"quotaExceeded"}}"#)
        .create_async()
        .await;
    let (stream, bind) = mock_stream_and_bind(&mut server).await;

    let batch = vec![request("Culto 1"), request("Culto 2"), request("Culto 3")];
    let options = ScheduleOptions {
        utc_offset: offset(),
        publish: false,
    };
    let report = schedule_batch(&client(&server), batch, options).await;

    assert_eq!(report.len(), 3);
    match &report.outcomes()[0] {
        ScheduleOutcome::Scheduled { watch_url, .. } => {
            assert_eq!(watch_url, "https://youtube.com/watch?v=b1")
        }
        other => panic!("expected scheduled, got {:?}", other),
    }
    match &report.outcomes()[1] {
        ScheduleOutcome::Failed { request, failure } => {
            assert_eq!(request.title, "Culto 2");
            assert_eq!(failure.stage, Stage::Create);
            assert!(failure.message.contains("quotaExceeded"));
        }
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(
        report.outcomes()[2].watch_url(),
        Some("https://youtube.com/watch?v=b3")
    );
    stream.assert_async().await;
    bind.assert_async().await;
}

#[tokio::test]
async fn test_stream_failure_names_created_broadcast() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/liveBroadcasts")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"id":"b9"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/liveStreams")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body(r#"{"error":{"message":"backendError"}}"#)
        .create_async()
        .await;
    let bind = server
        .mock("POST", "/liveBroadcasts/bind")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let meta = BroadcastMetadata::from_request(&request("Vigília"), offset());
    let err = client(&server).create_unlisted_broadcast(&meta).await.unwrap_err();

    match err {
        ApiError::Status { status, message, .. } => {
            assert_eq!(status, 500);
            assert!(message.starts_with("backendError"));
            assert!(message.contains("b9"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
    bind.assert_async().await;
}

mod test_utils;

use taleweaver_core::VideoMetadata;
use taleweaver_drive::{AuthorizedUser, DriveClient, PROBE_FOLDER_NAME, download_shared_file};
use taleweaver_error::{DriveErrorKind, TaleweaverErrorKind};
use test_utils::{CannedResponse, StubServer, client_for, token_response, upload_responses};

fn drive_kind(err: &taleweaver_error::TaleweaverError) -> Option<DriveErrorKind> {
    match err.kind() {
        TaleweaverErrorKind::Drive(e) => Some(e.kind.clone()),
        _ => None,
    }
}

#[tokio::test]
async fn test_create_folder_refreshes_token_once() {
    let server = StubServer::start(vec![
        token_response(),
        CannedResponse::json(200, r#"{"id": "folder-1"}"#),
        CannedResponse::json(200, r#"{"id": "folder-2"}"#),
    ])
    .await;
    let client = client_for(&server);

    assert_eq!(client.create_folder("Pip", None).await.unwrap(), "folder-1");
    assert_eq!(client.create_folder("Pip", Some("root")).await.unwrap(), "folder-2");

    let requests = server.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].starts_with("POST /token"));
    assert!(requests[0].contains("grant_type=refresh_token"));
    assert!(requests[0].contains("refresh_token=rtok"));

    let create = requests[1].to_lowercase();
    assert!(create.starts_with("post /drive/v3/files?fields=id"));
    assert!(create.contains("authorization: bearer tok-1"));
    assert!(requests[1].contains("application/vnd.google-apps.folder"));
    assert!(requests[2].contains(r#""parents":["root"]"#));
}

#[tokio::test]
async fn test_saved_token_skips_refresh() {
    let server = StubServer::start(vec![CannedResponse::json(200, r#"{"id": "f"}"#)]).await;
    let user = AuthorizedUser::from_json(
        r#"{"client_id": "c", "client_secret": "s", "refresh_token": "r",
            "token": "saved", "expiry": "2099-01-01T00:00:00Z"}"#,
    )
    .unwrap();
    let client = DriveClient::new(user, server.base_url.clone()).unwrap();

    client.create_folder("Pip", None).await.unwrap();
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].to_lowercase().contains("authorization: bearer saved"));
}

#[tokio::test]
async fn test_token_refresh_failure() {
    let server = StubServer::start(vec![CannedResponse::json(400, r#"{"error": "invalid_grant"}"#)]).await;
    let client = client_for(&server);

    let err = client.create_folder("Pip", None).await.unwrap_err();
    assert!(matches!(drive_kind(&err), Some(DriveErrorKind::TokenRefresh(_))));
}

#[tokio::test]
async fn test_api_error_status() {
    let server = StubServer::start(vec![
        token_response(),
        CannedResponse::json(403, r#"{"error": {"message": "insufficient permissions"}}"#),
    ])
    .await;
    let client = client_for(&server);

    let err = client.create_folder("Pip", None).await.unwrap_err();
    match drive_kind(&err) {
        Some(DriveErrorKind::Api {
            status_code,
            message,
        }) => {
            assert_eq!(status_code, 403);
            assert!(message.contains("insufficient"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_upload_video_bundle() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let video = dir.path().join("story_video.mp4");
    let thumb = dir.path().join("thumbnail.jpg");
    std::fs::write(&video, b"fake mp4 bytes")?;
    std::fs::write(&thumb, b"fake jpeg")?;

    let [video_start, _] = upload_responses("v", "unused");
    let [thumb_start, thumb_done] = upload_responses("t", "thumb-1");
    let [meta_start, meta_done] = upload_responses("m", "meta-1");
    let server = StubServer::start(vec![
        token_response(),
        CannedResponse::json(200, r#"{"id": "folder-1"}"#),
        video_start,
        CannedResponse::json(200, r#"{"id": "video-1", "webContentLink": "https://drive/v1"}"#),
        thumb_start,
        thumb_done,
        meta_start,
        meta_done,
    ])
    .await;
    let client = client_for(&server);
    let meta = VideoMetadata::new("Adventure of Pip", "A goat story", vec!["goat".into()]);

    let receipt = client
        .upload_video_bundle(&video, Some(&meta), Some(&thumb), "Generated Story Video")
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    assert_eq!(receipt.folder_id(), "folder-1");
    assert_eq!(receipt.video_id(), "video-1");
    assert_eq!(receipt.video_link().as_deref(), Some("https://drive/v1"));
    assert_eq!(receipt.thumbnail_id().as_deref(), Some("thumb-1"));
    assert_eq!(receipt.metadata_id().as_deref(), Some("meta-1"));

    let requests = server.requests();
    assert_eq!(requests.len(), 8);
    assert!(requests[1].contains(r#""name":"Adventure of Pip""#));
    assert!(requests[2].starts_with("POST /upload/drive/v3/files?uploadType=resumable"));
    assert!(requests[2].contains(r#""parents":["folder-1"]"#));
    assert!(requests[2].to_lowercase().contains("x-upload-content-type: video/mp4"));
    assert!(requests[3].starts_with("PUT /upload/session/v"));
    assert!(requests[3].ends_with("fake mp4 bytes"));
    assert!(requests[4].contains("thumbnail.jpg"));
    assert!(requests[7].contains("A goat story"));
    Ok(())
}

#[tokio::test]
async fn test_bundle_survives_thumbnail_failure() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let video = dir.path().join("v.mp4");
    std::fs::write(&video, b"mp4")?;
    let missing_thumb = dir.path().join("missing.jpg");

    let [video_start, video_done] = upload_responses("v", "video-1");
    let server = StubServer::start(vec![
        token_response(),
        CannedResponse::json(200, r#"{"id": "folder-1"}"#),
        video_start,
        video_done,
    ])
    .await;
    let client = client_for(&server);

    let receipt = client
        .upload_video_bundle(&video, None, Some(&missing_thumb), "Generated Story Video")
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    assert_eq!(receipt.video_id(), "video-1");
    assert!(receipt.thumbnail_id().is_none());
    assert!(receipt.metadata_id().is_none());
    assert!(receipt.video_link().is_none());
    assert!(server.requests()[1].contains(r#""name":"Generated Story Video""#));
    Ok(())
}

#[tokio::test]
async fn test_upload_without_session_location() {
    let server = StubServer::start(vec![token_response(), CannedResponse::json(200, "")]).await;
    let client = client_for(&server);

    let err = client
        .upload_text("{}", "metadata.json", None)
        .await
        .unwrap_err();
    assert!(matches!(drive_kind(&err), Some(DriveErrorKind::Upload { .. })));
}

#[tokio::test]
async fn test_check_access() {
    let server = StubServer::start(vec![
        token_response(),
        CannedResponse::json(200, r#"{"files": [{"id": "a", "name": "one"}, {"id": "b", "name": "two"}]}"#),
        CannedResponse::json(200, r#"{"id": "probe"}"#),
        CannedResponse::json(204, ""),
    ])
    .await;
    let client = client_for(&server);

    assert_eq!(client.check_access().await.unwrap(), 2);

    let requests = server.requests();
    assert!(requests[1].starts_with("GET /drive/v3/files?pageSize=10"));
    assert!(requests[2].contains(PROBE_FOLDER_NAME));
    assert!(requests[3].starts_with("DELETE /drive/v3/files/probe"));
}

#[tokio::test]
async fn test_download_shared_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("token.json");
    let server = StubServer::start(vec![CannedResponse::bytes(r#"{"refresh_token": "r"}"#)]).await;

    download_shared_file(&reqwest::Client::new(), &server.base_url, "abc123", &dest)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    assert_eq!(std::fs::read_to_string(&dest)?, r#"{"refresh_token": "r"}"#);
    assert!(server.requests()[0].starts_with("GET /uc?id=abc123&export=download"));
    Ok(())
}

#[tokio::test]
async fn test_download_confirms_large_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("big.bin");
    let server = StubServer::start(vec![
        CannedResponse::bytes("<html>virus scan warning</html>")
            .with_header("set-cookie", "download_warning_1=XYZ; Path=/"),
        CannedResponse::bytes("payload"),
    ])
    .await;

    download_shared_file(&reqwest::Client::new(), &server.base_url, "big", &dest)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    assert_eq!(std::fs::read_to_string(&dest)?, "payload");
    assert!(server.requests()[1].contains("confirm=XYZ"));
    Ok(())
}

//! End-to-end submissions against a mocked classification service.

mod common;

use common::{CLASSIFY_PATH, png_file, unreachable_endpoint};
use image_classify::error::TRANSPORT_MESSAGE;
use image_classify::{
    ClassifyOptions, HttpClassifier, SourceImage, SubmissionSession, SubmissionState,
    classify_file,
};
use image::GenericImageView;
use mockito::Matcher;

fn session_for(endpoint: &str) -> SubmissionSession<HttpClassifier> {
    SubmissionSession::new(HttpClassifier::new(endpoint).unwrap(), 512)
}

#[tokio::test]
async fn success_shows_result_panel() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", CLASSIFY_PATH)
        .match_header("content-type", Matcher::Regex("^multipart/form-data".to_string()))
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="image"; filename="portrait.jpg""#.to_string()),
            Matcher::Regex("(?i)content-type: image/jpeg".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result": "Joe Biden"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = png_file(dir.path(), "portrait.png", 1500, 2000);
    let session = session_for(&server.url());

    let source = SourceImage::from_path(&path).await.unwrap();
    session.submit(source).await;

    let panels = session.panels();
    assert_eq!(panels.result.as_deref(), Some("Joe Biden"));
    assert!(panels.error.is_none());
    assert!(!panels.loading);
    assert_eq!(panels.preview.unwrap().file_name, "portrait.png");
    mock.assert_async().await;
}

/// Bytes of the single file part in a multipart body.
fn uploaded_part(body: &[u8]) -> &[u8] {
    let start = find(body, b"\r\n\r\n").expect("part headers") + 4;
    let end = body
        .windows(4)
        .rposition(|w| w == b"\r\n--")
        .expect("closing boundary");
    &body[start..end]
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[tokio::test]
async fn uploaded_image_is_downscaled_jpeg() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", CLASSIFY_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body_from_request(|request| {
            let body = request.body().expect("request body");
            let part = uploaded_part(body);
            let received = match image::load_from_memory_with_format(part, image::ImageFormat::Jpeg) {
                Ok(img) => {
                    let (w, h) = img.dimensions();
                    format!("{}x{}", w, h)
                }
                Err(e) => format!("not a jpeg: {}", e),
            };
            serde_json::json!({ "result": received }).to_string().into_bytes()
        })
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = png_file(dir.path(), "portrait.png", 1500, 2000);
    let session = session_for(&server.url());

    session.submit(SourceImage::from_path(&path).await.unwrap()).await;

    assert_eq!(session.panels().result.as_deref(), Some("384x512"));
    mock.assert_async().await;
}

#[tokio::test]
async fn server_rejection_shows_error_panel() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", CLASSIFY_PATH)
        .with_status(403)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message": "unsupported format"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = png_file(dir.path(), "small.png", 40, 30);
    let session = session_for(&server.url());

    session.submit(SourceImage::from_path(&path).await.unwrap()).await;

    let state = session.state();
    assert!(matches!(state, SubmissionState::Failed { .. }));
    let panels = state.panels();
    assert_eq!(panels.error.as_deref(), Some("unsupported format"));
    assert!(panels.result.is_none());
    assert!(!panels.loading);
    mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_service_shows_stable_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = png_file(dir.path(), "lost.png", 64, 64);
    let session = session_for(&unreachable_endpoint());

    session.submit(SourceImage::from_path(&path).await.unwrap()).await;

    let panels = session.panels();
    assert_eq!(panels.error.as_deref(), Some(TRANSPORT_MESSAGE));
    assert!(panels.result.is_none());
    assert!(!panels.loading);
    assert_eq!(session.state().error().unwrap().category(), "transport");
}

#[tokio::test]
async fn reset_after_settlement_returns_to_idle() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CLASSIFY_PATH)
        .with_status(200)
        .with_body(r#"{"result": "Camera"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = png_file(dir.path(), "tv.png", 800, 450);
    let session = session_for(&server.url());

    session.submit(SourceImage::from_path(&path).await.unwrap()).await;
    assert_eq!(session.state().result(), Some("Camera"));

    session.reset();
    let panels = session.panels();
    assert!(panels.preview.is_none());
    assert!(panels.result.is_none());
    assert!(panels.error.is_none());
    assert!(!panels.loading);
}

#[tokio::test]
async fn classify_file_returns_result_text() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CLASSIFY_PATH)
        .with_status(200)
        .with_body(r#"{"result": "Person"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = ClassifyOptions {
        input: png_file(dir.path(), "me.png", 100, 100),
        endpoint: format!("{}/", server.url()),
        max_dimension: 512,
    };

    assert_eq!(classify_file(options).await.unwrap(), "Person");
}

#[tokio::test]
async fn classify_file_surfaces_server_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CLASSIFY_PATH)
        .with_status(422)
        .with_body(r#"{"message": "no face found"}"#)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let options = ClassifyOptions {
        input: png_file(dir.path(), "blank.png", 10, 10),
        endpoint: server.url(),
        max_dimension: 512,
    };

    let err = classify_file(options).await.unwrap_err();
    assert_eq!(err.to_string(), "no face found");
}

#[tokio::test]
async fn undecodable_file_never_reaches_the_service() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", CLASSIFY_PATH)
        .expect(0)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.png");
    std::fs::write(&path, b"just some text").unwrap();
    let session = session_for(&server.url());

    session.submit(SourceImage::from_path(&path).await.unwrap()).await;

    let state = session.state();
    assert_eq!(state.error().unwrap().category(), "decode");
    assert!(!state.is_loading());
    mock.assert_async().await;
}

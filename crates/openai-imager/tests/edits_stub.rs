use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use openai_imager::{EditRequest, GenerationError, ImageGenerator, OpenAiImager, OpenAiImagerConfig};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct Recorded {
    fields: Arc<Mutex<HashMap<String, String>>>,
    auth: Arc<Mutex<Option<String>>>,
}

async fn edits_ok(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Json<Value> {
    *recorded.auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let value = if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap();
            format!("{file_name}|{content_type}|{}", bytes.len())
        } else {
            field.text().await.unwrap()
        };
        recorded.fields.lock().unwrap().insert(name, value);
    }

    Json(json!({
        "created": 1,
        "data": [{ "b64_json": BASE64.encode(b"edited-image") }]
    }))
}

async fn edits_rejected() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": {
                "message": "Your request was rejected by the safety system.",
                "type": "invalid_request_error",
                "code": "moderation_blocked"
            }
        })),
    )
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn imager(api_url: &str) -> OpenAiImager {
    OpenAiImager::new(
        OpenAiImagerConfig::builder()
            .api_key("sk-test")
            .api_url(api_url)
            .quality("low")
            .build(),
    )
    .unwrap()
}

#[tokio::test]
async fn sends_multipart_and_decodes_b64() {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/v1/images/edits", post(edits_ok))
        .with_state(recorded.clone());
    let base = spawn(router).await;

    let request = EditRequest::new("make me a pilot", vec![7u8; 64]).with_mime_type("image/jpeg");
    let edited = imager(&base).edit(request).await.unwrap();

    assert_eq!(edited.bytes, b"edited-image".to_vec());
    assert_eq!(edited.mime_type, "image/png");

    let fields = recorded.fields.lock().unwrap().clone();
    assert_eq!(fields["model"], "gpt-image-1");
    assert_eq!(fields["prompt"], "make me a pilot");
    assert_eq!(fields["size"], "1024x1024");
    assert_eq!(fields["quality"], "low");
    assert_eq!(fields["n"], "1");
    assert_eq!(fields["image"], "image.jpg|image/jpeg|64");
    assert_eq!(
        recorded.auth.lock().unwrap().as_deref(),
        Some("Bearer sk-test")
    );
}

#[tokio::test]
async fn downloads_url_responses() {
    let files = Router::new().route("/files/result.png", get(|| async { b"from-url".to_vec() }));
    let files_base = spawn(files).await;

    let api = Router::new().route(
        "/v1/images/edits",
        post(move || async move {
            Json(json!({ "data": [{ "url": format!("{files_base}/files/result.png") }] }))
        }),
    );
    let api_base = spawn(api).await;

    let edited = imager(&api_base)
        .edit(EditRequest::new("p", vec![1]))
        .await
        .unwrap();
    assert_eq!(edited.bytes, b"from-url".to_vec());
}

#[tokio::test]
async fn surfaces_upstream_error_message() {
    let router = Router::new().route("/v1/images/edits", post(edits_rejected));
    let base = spawn(router).await;

    let err = imager(&base)
        .edit(EditRequest::new("p", vec![1]))
        .await
        .unwrap_err();

    match err {
        GenerationError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Your request was rejected by the safety system.");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = imager(&format!("http://{addr}"))
        .edit(EditRequest::new("p", vec![1]))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Network(_)));
}

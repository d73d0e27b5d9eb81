mod common;

use std::sync::Arc;

use common::{json, photo, spawn_app, spawn_app_with_store, token, FailingStore, TestApp};
use database::{doodle_image, GenerationStatus};
use mock_imager::{EchoImager, FailingImager, RecordingImager};
use serde_json::json as body;
use storage::ObjectStore;

#[tokio::test]
async fn doodle_render_stores_original_and_result() {
    let imager = Arc::new(RecordingImager::new(EchoImager::new()));
    let app = spawn_app(imager.clone()).await;

    let response = app
        .post("/api/doodle-to-reality")
        .bearer_auth(token("kid-1"))
        .json(&body!({ "doodle": photo(), "style": "클레이", "userId": "kid-1" }))
        .send()
        .await
        .unwrap();
    let (status, payload) = json(response).await;

    assert_eq!(status, 200, "{payload}");
    assert_eq!(payload["success"], true);
    assert!(imager.prompts().await[0].contains("claymation"));

    let id = payload["imageId"].as_str().unwrap();
    let row = doodle_image::get(app.db.pool(), id).await.unwrap();
    assert_eq!(row.status, GenerationStatus::Completed);
    assert_eq!(row.style, "clay");
    assert_eq!(
        row.original_url,
        format!("{}/storage/doodle-images/kid-1/{id}-original.png", app.base)
    );
    assert_eq!(payload["imageUrl"], row.result_url.clone().unwrap());

    let original = app.client.get(&row.original_url).send().await.unwrap();
    assert_eq!(original.status(), 200);
    assert_eq!(app.tickets("kid-1").await, Some(2));
}

#[tokio::test]
async fn doodle_failure_is_refunded() {
    let app = spawn_app(Arc::new(FailingImager::new(500, "nope"))).await;

    let response = app
        .post("/api/doodle-to-reality")
        .bearer_auth(token("kid-1"))
        .json(&body!({ "doodle": photo(), "style": "storybook" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 500);

    let rows = doodle_image::list_for_user(app.db.pool(), "kid-1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, GenerationStatus::Error);
    assert_eq!(app.tickets("kid-1").await, Some(3));
    assert_eq!(app.refunds("kid-1").await, 1);
}

#[tokio::test]
async fn doodle_validation() {
    let imager = Arc::new(RecordingImager::new(EchoImager::new()));
    let app = spawn_app(imager.clone()).await;

    let missing = app
        .post("/api/doodle-to-reality")
        .bearer_auth(token("kid-1"))
        .json(&body!({ "style": "anime" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 400);

    let unknown_style = app
        .post("/api/doodle-to-reality")
        .bearer_auth(token("kid-1"))
        .json(&body!({ "doodle": photo(), "style": "pixel art" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_style.status(), 400);

    assert_eq!(imager.calls(), 0);
    assert_eq!(app.tickets("kid-1").await, None);
}

/// The first upload is the original drawing, the second the render.
async fn failing_upload_app(fail_on: usize) -> (TestApp, Arc<RecordingImager<EchoImager>>) {
    let imager = Arc::new(RecordingImager::new(EchoImager::new()));
    let app = spawn_app_with_store(imager.clone(), |_| {}, move |local| {
        Arc::new(FailingStore::new(local, fail_on)) as Arc<dyn ObjectStore>
    })
    .await;
    (app, imager)
}

async fn assert_failed_and_refunded(app: &TestApp) {
    let response = app
        .post("/api/doodle-to-reality")
        .bearer_auth(token("kid-1"))
        .json(&body!({ "doodle": photo(), "style": "anime" }))
        .send()
        .await
        .unwrap();
    let (status, payload) = json(response).await;
    assert_eq!(status, 500, "{payload}");
    assert_eq!(payload["success"], false);

    let rows = doodle_image::list_for_user(app.db.pool(), "kid-1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, GenerationStatus::Error);
    assert!(rows[0].result_url.is_none());
    assert_eq!(app.tickets("kid-1").await, Some(3));
    assert_eq!(app.refunds("kid-1").await, 1);
}

#[tokio::test]
async fn original_upload_failure_is_refunded() {
    let (app, imager) = failing_upload_app(1).await;
    assert_failed_and_refunded(&app).await;
    assert_eq!(imager.calls(), 0);
}

#[tokio::test]
async fn result_upload_failure_is_refunded() {
    let (app, imager) = failing_upload_app(2).await;
    assert_failed_and_refunded(&app).await;
    assert_eq!(imager.calls(), 1);
}

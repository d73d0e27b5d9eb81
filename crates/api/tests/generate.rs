mod common;

use std::sync::Arc;

use common::{
    json, photo, portrait_body, spawn_app, spawn_app_with, spawn_app_with_store, token,
    FailingStore,
};
use database::{generated_image, GenerationStatus};
use mock_imager::{EchoImager, FailingImager, RecordingImager};
use storage::ObjectStore;

#[tokio::test]
async fn portrait_success_spends_one_ticket() {
    let imager = Arc::new(RecordingImager::new(EchoImager::new()));
    let app = spawn_app(imager.clone()).await;

    let response = app
        .post("/api/generate")
        .bearer_auth(token("user-1"))
        .json(&portrait_body("user-1"))
        .send()
        .await
        .unwrap();
    let (status, body) = json(response).await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "completed");
    assert_eq!(imager.calls(), 1);
    assert!(imager.prompts().await[0].contains("35-year-old woman"));

    let job_id = body["jobId"].as_str().unwrap();
    let row = generated_image::get(app.db.pool(), job_id).await.unwrap();
    assert_eq!(row.status, GenerationStatus::Completed);
    assert_eq!(row.user_id, "user-1");
    assert_eq!(row.job, "pilot");
    assert_eq!(row.age, "35");
    assert_eq!(app.tickets("user-1").await, Some(2));
    assert_eq!(app.refunds("user-1").await, 0);

    let image_url = body["imageUrl"].as_str().unwrap();
    assert_eq!(
        image_url,
        format!("{}/storage/generated-images/user-1/{job_id}.png", app.base)
    );
    let stored = app.client.get(image_url).send().await.unwrap();
    assert_eq!(stored.status(), 200);
    assert!(!stored.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_field_is_rejected_before_spending() {
    let imager = Arc::new(RecordingImager::new(EchoImager::new()));
    let app = spawn_app(imager.clone()).await;

    for field in ["photo", "age", "gender", "job", "style", "layout"] {
        let mut body = portrait_body("user-1");
        body.as_object_mut().unwrap().remove(field);

        let response = app
            .post("/api/generate")
            .bearer_auth(token("user-1"))
            .json(&body)
            .send()
            .await
            .unwrap();
        let (status, body) = json(response).await;

        assert_eq!(status, 400, "missing {field}");
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains(field));
    }

    assert_eq!(imager.calls(), 0);
    assert_eq!(app.tickets("user-1").await, None);
}

#[tokio::test]
async fn unknown_style_and_bad_photo_are_bad_requests() {
    let imager = Arc::new(RecordingImager::new(EchoImager::new()));
    let app = spawn_app(imager.clone()).await;

    let mut body = portrait_body("user-1");
    body["style"] = "cubism".into();
    let response = app
        .post("/api/generate")
        .bearer_auth(token("user-1"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let mut body = portrait_body("user-1");
    body["photo"] = "data:image/png;base64,bm90IGFuIGltYWdl".into();
    let response = app
        .post("/api/generate")
        .bearer_auth(token("user-1"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = app
        .post("/api/generate")
        .bearer_auth(token("user-1"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    let (status, body) = json(response).await;
    assert_eq!(status, 400);
    assert_eq!(body["success"], false);

    assert_eq!(imager.calls(), 0);
}

#[tokio::test]
async fn zero_tickets_is_refused_without_calling_the_generator() {
    let imager = Arc::new(RecordingImager::new(EchoImager::new()));
    let app = spawn_app_with(imager.clone(), |config| config.initial_tickets = 0).await;

    let response = app
        .post("/api/generate")
        .bearer_auth(token("user-1"))
        .json(&portrait_body("user-1"))
        .send()
        .await
        .unwrap();
    let (status, body) = json(response).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"], "티켓이 부족합니다.");
    assert_eq!(imager.calls(), 0);
    assert_eq!(app.tickets("user-1").await, Some(0));
}

#[tokio::test]
async fn generator_failure_refunds_once_when_fallback_is_off() {
    let imager = Arc::new(RecordingImager::new(FailingImager::new(500, "upstream down")));
    let app = spawn_app_with(imager.clone(), |config| config.stock_fallback = false).await;

    let response = app
        .post("/api/generate")
        .bearer_auth(token("user-1"))
        .json(&portrait_body("user-1"))
        .send()
        .await
        .unwrap();
    let (status, body) = json(response).await;

    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().contains("upstream down"));
    assert_eq!(imager.calls(), 1);

    assert_eq!(app.tickets("user-1").await, Some(3));
    assert_eq!(app.refunds("user-1").await, 1);

    let rows = generated_image::list_for_user(app.db.pool(), "user-1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, GenerationStatus::Error);
    assert!(rows[0].error_message.is_some());
}

#[tokio::test]
async fn generator_failure_falls_back_to_stock_photo() {
    let app = spawn_app(Arc::new(FailingImager::new(503, "busy"))).await;

    let response = app
        .post("/api/generate")
        .bearer_auth(token("user-1"))
        .json(&portrait_body("user-1"))
        .send()
        .await
        .unwrap();
    let (status, body) = json(response).await;

    assert_eq!(status, 200, "{body}");
    assert_eq!(body["status"], "completed");
    assert_eq!(
        body["imageUrl"],
        "https://source.unsplash.com/1024x1024/?pilot,cockpit"
    );
    assert_eq!(app.tickets("user-1").await, Some(2));
    assert_eq!(app.refunds("user-1").await, 0);
}

#[tokio::test]
async fn requires_matching_token() {
    let imager = Arc::new(RecordingImager::new(EchoImager::new()));
    let app = spawn_app(imager.clone()).await;

    let anonymous = app
        .post("/api/generate")
        .json(&portrait_body("user-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), 401);

    let mismatched = app
        .post("/api/generate")
        .bearer_auth(token("user-2"))
        .json(&portrait_body("user-1"))
        .send()
        .await
        .unwrap();
    let (status, body) = json(mismatched).await;
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);

    let via_cookie = app
        .post("/api/generate")
        .header("cookie", format!("sb-access-token={}", token("user-1")))
        .json(&serde_json::json!({
            "photo": photo(),
            "age": 28,
            "gender": "남성",
            "job": "요리사",
            "style": "애니",
            "layout": "얼굴",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(via_cookie.status(), 200);

    assert_eq!(imager.calls(), 1);
}

#[tokio::test]
async fn upload_failure_after_render_is_refunded() {
    let imager = Arc::new(RecordingImager::new(EchoImager::new()));
    let app = spawn_app_with_store(imager.clone(), |_| {}, |local| {
        Arc::new(FailingStore::new(local, 1)) as Arc<dyn ObjectStore>
    })
    .await;

    let response = app
        .post("/api/generate")
        .bearer_auth(token("user-1"))
        .json(&portrait_body("user-1"))
        .send()
        .await
        .unwrap();
    let (status, body) = json(response).await;

    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().contains("bucket unavailable"));
    assert_eq!(imager.calls(), 1);

    let rows = generated_image::list_for_user(app.db.pool(), "user-1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, GenerationStatus::Error);
    assert!(rows[0].image_url.is_none());
    assert_eq!(app.tickets("user-1").await, Some(3));
    assert_eq!(app.refunds("user-1").await, 1);
}

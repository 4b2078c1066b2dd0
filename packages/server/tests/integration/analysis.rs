use std::sync::Arc;

use common::analysis::BinaryClassifier;
use common::{AnalysisResult, UploadPolicy};
use sea_orm::{EntityTrait, PaginatorTrait};
use server::entity::analysis;

use server::error::UNANALYZABLE_IMAGE;

use crate::common::{BrokenClassifier, FixedClassifier, TestApp, TestRouter, png_bytes, routes};

#[tokio::test]
async fn analyze_png_returns_result() {
    let app = TestApp::spawn().await;

    let res = app.upload("lesion.png", "image/png", png_bytes()).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let label = res.body["result"].as_str().unwrap();
    assert!(label == "benign" || label == "malignant", "got {label}");
    let confidence = res.body["confidence"].as_f64().unwrap();
    assert!((0.7..0.95).contains(&confidence), "got {confidence}");
    assert_eq!(
        res.body["additionalInfo"]["features"].as_array().unwrap().len(),
        3
    );
    assert!(res.body["additionalInfo"]["recommendation"].is_string());
}

#[tokio::test]
async fn analyzed_image_is_listed() {
    let app = TestApp::spawn().await;
    let id = app.analyze_png("lesion.png").await;

    let res = app.get(routes::ANALYSES).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let records = res.body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], id);
    assert!(
        records[0]["originalImage"]
            .as_str()
            .unwrap()
            .starts_with("data:image/png;base64,")
    );
    assert!(records[0]["createdAt"].is_string());
}

#[tokio::test]
async fn record_is_persisted() {
    let app = TestApp::spawn().await;
    app.analyze_png("lesion.png").await;

    let count = analysis::Entity::find().count(&app.db).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn empty_history_is_empty_array() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::ANALYSES).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::json!([]));
}

#[tokio::test]
async fn pdf_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .upload("doc.pdf", "application/pdf", b"%PDF-1.4".to_vec())
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert!(
        res.body["error"]
            .as_str()
            .unwrap()
            .contains("Invalid file type 'application/pdf'")
    );
    assert_eq!(app.get(routes::ANALYSES).await.body, serde_json::json!([]));
}

#[tokio::test]
async fn oversize_image_is_rejected() {
    let policy = UploadPolicy::default().with_max_bytes(1024);
    let app = TestApp::spawn_with(Arc::new(BinaryClassifier::seeded(1)), policy).await;

    let res = app.upload("huge.jpg", "image/jpeg", vec![0u8; 4096]).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(
        res.body["error"],
        "File too large (4 KB). Maximum size is 1 KB"
    );
}

#[tokio::test]
async fn body_over_limit_is_reported_as_too_large() {
    let policy = UploadPolicy::default().with_max_bytes(1024);
    let app = TestRouter::new(Arc::new(BinaryClassifier::seeded(1)), policy).await;

    let res = app
        .upload("huge.png", "image/png", &vec![0u8; 3 * 1024 * 1024])
        .await;

    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(res.body["error"], "File too large. Maximum size is 1 KB");
}

#[tokio::test]
async fn body_within_limit_reaches_handler() {
    let app = TestRouter::new(Arc::new(BinaryClassifier::seeded(1)), UploadPolicy::default()).await;

    let res = app.upload("lesion.png", "image/png", &png_bytes()).await;

    assert_eq!(res.status, 200, "{}", res.text);
}

#[tokio::test]
async fn empty_image_gets_generic_rejection() {
    let app = TestApp::spawn().await;

    let res = app.upload("empty.png", "image/png", Vec::new()).await;

    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(res.body["error"], UNANALYZABLE_IMAGE);
    assert!(!res.text.contains("image is empty"));
    assert_eq!(app.get(routes::ANALYSES).await.body, serde_json::json!([]));
}

#[tokio::test]
async fn missing_image_field_is_rejected() {
    let app = TestApp::spawn().await;

    let form = reqwest::multipart::Form::new().text("note", "no file here");
    let res = app.post_form(form).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"], "No image provided");
}

#[tokio::test]
async fn jpg_alias_is_accepted() {
    let app = TestApp::spawn().await;

    let res = app.upload("photo.jpg", "image/jpg", png_bytes()).await;

    assert_eq!(res.status, 200, "{}", res.text);
}

#[tokio::test]
async fn webp_needs_policy_opt_in() {
    let app = TestApp::spawn().await;
    let res = app.upload("photo.webp", "image/webp", png_bytes()).await;
    assert_eq!(res.status, 400);

    let policy = UploadPolicy::default().with_webp();
    let app = TestApp::spawn_with(Arc::new(BinaryClassifier::seeded(1)), policy).await;
    let res = app.upload("photo.webp", "image/webp", png_bytes()).await;
    assert_eq!(res.status, 200, "{}", res.text);
}

#[tokio::test]
async fn classifier_failure_is_internal_error() {
    let app = TestApp::spawn_with(Arc::new(BrokenClassifier), UploadPolicy::default()).await;

    let res = app.upload("lesion.png", "image/png", png_bytes()).await;

    assert_eq!(res.status, 500);
    assert_eq!(res.body["code"], "INTERNAL_ERROR");
    assert_eq!(res.body["error"], "An unexpected error occurred");
    assert_eq!(app.get(routes::ANALYSES).await.body, serde_json::json!([]));
}

#[tokio::test]
async fn out_of_range_confidence_is_not_stored() {
    let classifier = FixedClassifier(AnalysisResult::new("benign", 1.5));
    let app = TestApp::spawn_with(Arc::new(classifier), UploadPolicy::default()).await;

    let res = app.upload("lesion.png", "image/png", png_bytes()).await;

    assert_eq!(res.status, 500);
    assert_eq!(app.get(routes::ANALYSES).await.body, serde_json::json!([]));
}

#[tokio::test]
async fn history_is_newest_first() {
    let app = TestApp::spawn().await;
    let first = app.analyze_png("first.png").await;
    let second = app.analyze_png("second.png").await;
    let third = app.analyze_png("third.png").await;

    let res = app.get(routes::ANALYSES).await;

    let ids: Vec<&str> = res
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![third.as_str(), second.as_str(), first.as_str()]);
}

#[tokio::test]
async fn history_filters_by_category() {
    let benign = FixedClassifier(AnalysisResult::new("benign", 0.9));
    let app = TestApp::spawn_with(Arc::new(benign), UploadPolicy::default()).await;
    app.analyze_png("a.png").await;
    app.analyze_png("b.png").await;

    let res = app.get(&routes::analyses_query(Some("benign"), None)).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body.as_array().unwrap().len(), 2);

    let res = app
        .get(&routes::analyses_query(Some("malignant"), None))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body, serde_json::json!([]));
}

#[tokio::test]
async fn history_search_matches_id() {
    let app = TestApp::spawn().await;
    let wanted = app.analyze_png("a.png").await;
    app.analyze_png("b.png").await;

    let res = app
        .get(&routes::analyses_query(None, Some(&wanted.to_uppercase())))
        .await;

    let records = res.body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"], wanted);
}

#[tokio::test]
async fn unknown_filter_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .get(&routes::analyses_query(Some("suspicious"), None))
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn openapi_document_lists_endpoints() {
    let app = TestApp::spawn().await;

    let res = app.get(routes::OPENAPI).await;

    assert_eq!(res.status, 200);
    assert!(res.body["paths"]["/api/v1/analyze"]["post"].is_object());
    assert!(res.body["paths"]["/api/v1/analyses"]["get"].is_object());
}

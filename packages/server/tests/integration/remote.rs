use std::sync::Arc;

use common::analysis::{ImagePayload, RemoteAnalysisClient};
use common::config::SessionConfig;
use common::intake::CandidateFile;
use common::{AnalysisClient, AnalysisError, ItemStatus, ResultCategory, Session};

use crate::common::{TestApp, png_bytes, routes};

fn payload(name: &str, content_type: &str, bytes: Vec<u8>) -> ImagePayload {
    ImagePayload {
        name: name.to_string(),
        content_type: content_type.to_string(),
        bytes: Arc::from(bytes),
    }
}

#[tokio::test]
async fn remote_client_analyzes_and_lists() {
    let app = TestApp::spawn().await;
    let client = RemoteAnalysisClient::new(app.base_url());

    let result = client
        .analyze(payload("lesion.png", "image/png", png_bytes()))
        .await
        .unwrap();

    assert_ne!(result.category(), ResultCategory::Other);
    assert_eq!(result.features.as_ref().map(Vec::len), Some(3));

    let records = client.list_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].result, result.label);
}

#[tokio::test]
async fn remote_client_maps_rejection_to_invalid_input() {
    let app = TestApp::spawn().await;
    let client = RemoteAnalysisClient::new(app.base_url());

    let err = client
        .analyze(payload("doc.pdf", "application/pdf", b"%PDF".to_vec()))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, AnalysisError::InvalidInput(msg) if msg.contains("Invalid file type")),
        "got {err:?}"
    );
}

#[tokio::test]
async fn unreachable_server_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = RemoteAnalysisClient::new(format!("http://{addr}"));

    let err = client
        .analyze(payload("lesion.png", "image/png", png_bytes()))
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn session_settles_against_server() {
    let app = TestApp::spawn().await;
    let client = Arc::new(RemoteAnalysisClient::new(app.base_url()));
    let mut session = Session::new(client, SessionConfig::default());

    let report = session.submit([
        CandidateFile::new("a.png", Some("image/png".into()), png_bytes()),
        CandidateFile::new("b.png", Some("image/png".into()), png_bytes()),
    ]);
    assert_eq!(report.accepted.len(), 2);

    assert_eq!(session.analyze_all_idle(), 2);
    let settled = session.settle_all().await;

    assert_eq!(settled.len(), 2);
    assert_eq!(session.store().count_with_status(ItemStatus::Complete), 2);
    let listed = app.get(routes::ANALYSES).await;
    assert_eq!(listed.body.as_array().unwrap().len(), 2);
}

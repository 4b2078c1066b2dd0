use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, header};
use common::analysis::{BinaryClassifier, ImagePayload};
use common::{AnalysisClient, AnalysisError, AnalysisResult, UploadPolicy};
use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use server::config::{AppConfig, CorsConfig, DatabaseConfig, ServerConfig};
use server::state::AppState;

pub mod routes {
    pub const ANALYZE: &str = "/api/v1/analyze";
    pub const ANALYSES: &str = "/api/v1/analyses";
    pub const OPENAPI: &str = "/api-docs/openapi.json";

    pub fn analyses_query(filter: Option<&str>, search: Option<&str>) -> String {
        let mut params = Vec::new();
        if let Some(filter) = filter {
            params.push(format!("filter={filter}"));
        }
        if let Some(search) = search {
            params.push(format!("search={search}"));
        }
        if params.is_empty() {
            ANALYSES.to_string()
        } else {
            format!("{ANALYSES}?{}", params.join("&"))
        }
    }
}

/// A few bytes that start like a PNG file. The classifiers never decode them.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 64]);
    bytes
}

/// Classifier that always fails as if the backend crashed.
pub struct BrokenClassifier;

#[async_trait]
impl AnalysisClient for BrokenClassifier {
    async fn analyze(&self, _image: ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        Err(AnalysisError::Server("model not loaded".into()))
    }
}

/// Classifier that returns a fixed result.
pub struct FixedClassifier(pub AnalysisResult);

#[async_trait]
impl AnalysisClient for FixedClassifier {
    async fn analyze(&self, _image: ImagePayload) -> Result<AnalysisResult, AnalysisError> {
        Ok(self.0.clone())
    }
}

/// A running test server backed by its own SQLite file.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("Response should contain an id")
            .to_string()
    }
}

/// Application state over a fresh SQLite file. Keep the `TempDir` alive.
async fn test_state(
    classifier: Arc<dyn AnalysisClient>,
    upload: UploadPolicy,
) -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

    let app_config = AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors: CorsConfig::default(),
        },
        database: DatabaseConfig {
            url: db_url,
            max_connections: 1,
        },
        upload,
    };

    let db = server::database::init_db(&app_config.database)
        .await
        .expect("Failed to initialize test database");

    let state = AppState {
        db,
        config: app_config,
        classifier,
    };
    (state, dir)
}

/// Router driven in-process, without a socket.
pub struct TestRouter {
    pub router: axum::Router,
    _dir: TempDir,
}

impl TestRouter {
    pub async fn new(classifier: Arc<dyn AnalysisClient>, upload: UploadPolicy) -> Self {
        let (state, dir) = test_state(classifier, upload).await;
        Self {
            router: server::build_router(state),
            _dir: dir,
        }
    }

    /// Send a hand-built multipart body with a single `image` part.
    pub async fn upload(&self, file_name: &str, mime: &str, bytes: &[u8]) -> TestResponse {
        const BOUNDARY: &str = "dermascan-test-boundary";

        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
             filename=\"{file_name}\"\r\nContent-Type: {mime}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(routes::ANALYZE)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        TestResponse { status, text, body }
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(BinaryClassifier::seeded(7)), UploadPolicy::default()).await
    }

    pub async fn spawn_with(classifier: Arc<dyn AnalysisClient>, upload: UploadPolicy) -> Self {
        let (state, dir) = test_state(classifier, upload).await;
        let db = state.db.clone();
        let app = server::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            _dir: dir,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn upload(&self, file_name: &str, mime: &str, bytes: Vec<u8>) -> TestResponse {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .expect("Failed to set MIME type");
        self.post_form(reqwest::multipart::Form::new().part("image", part))
            .await
    }

    pub async fn post_form(&self, form: reqwest::multipart::Form) -> TestResponse {
        let res = self
            .client
            .post(self.url(routes::ANALYZE))
            .multipart(form)
            .send()
            .await
            .expect("Failed to send multipart upload request");

        TestResponse::from_response(res).await
    }

    /// Upload a PNG and return the new record's id.
    pub async fn analyze_png(&self, file_name: &str) -> String {
        let res = self.upload(file_name, "image/png", png_bytes()).await;
        assert_eq!(res.status, 200, "analyze failed: {}", res.text);
        res.id()
    }
}

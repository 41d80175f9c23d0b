use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::Multipart;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use vitrine::config::{CloudConfig, Config};
use vitrine::db;
use vitrine::routes;
use vitrine::state::AppState;
use vitrine::upload::cloud::CloudUploader;
use vitrine::upload::{IncomingFile, UploadError};

const TOKEN: &str = "secret-token";

/// Stand-in for the remote storage endpoint.
async fn accept_upload(headers: HeaderMap, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(&format!("Bearer {}", TOKEN));
    if !authorized {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" })));
    }

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
        return (
            StatusCode::OK,
            Json(json!({
                "url": format!("https://cdn.example.com/{}", file_name),
                "size": size,
                "contentType": content_type,
            })),
        );
    }
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "no file" })))
}

async fn spawn_endpoint() -> SocketAddr {
    let app = Router::new()
        .route("/upload", post(accept_upload))
        .route(
            "/text",
            post(|body: Bytes| async move {
                let _ = body;
                "stored"
            }),
        )
        .route(
            "/fail",
            post(|body: Bytes| async move {
                let _ = body;
                (StatusCode::INTERNAL_SERVER_ERROR, "disk full")
            }),
        );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn cloud(addr: SocketAddr, path: &str, token: &str) -> CloudConfig {
    CloudConfig {
        endpoint: Some(format!("http://{}{}", addr, path)),
        token: Some(token.to_string()),
    }
}

fn video(len: usize) -> IncomingFile {
    IncomingFile {
        file_name: Some("reel.mp4".to_string()),
        content_type: "video/mp4".to_string(),
        data: Bytes::from(vec![7u8; len]),
    }
}

#[tokio::test]
async fn upload_returns_endpoint_json_and_reports_monotone_progress() {
    let addr = spawn_endpoint().await;
    let uploader = CloudUploader::new(&cloud(addr, "/upload", TOKEN));
    assert!(uploader.is_configured());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let response = uploader
        .upload(video(200 * 1024), move |percent| {
            recorder.lock().unwrap().push(percent);
        })
        .await
        .unwrap();

    assert_eq!(response["url"], "https://cdn.example.com/reel.mp4");
    assert_eq!(response["size"], 200 * 1024);
    assert_eq!(response["contentType"], "video/mp4");

    let seen = seen.lock().unwrap().clone();
    assert!(seen.len() > 1, "expected several progress reports: {:?}", seen);
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "not monotone: {:?}", seen);
    assert_eq!(seen.last(), Some(&100));
}

#[tokio::test]
async fn non_json_success_is_wrapped() {
    let addr = spawn_endpoint().await;
    let uploader = CloudUploader::new(&cloud(addr, "/text", TOKEN));
    let response = uploader.upload(video(16), |_| {}).await.unwrap();
    assert_eq!(response, json!({ "ok": true, "response": "stored" }));
}

#[tokio::test]
async fn error_status_is_reported_with_body() {
    let addr = spawn_endpoint().await;
    let uploader = CloudUploader::new(&cloud(addr, "/fail", TOKEN));
    match uploader.upload(video(16), |_| {}).await {
        Err(UploadError::Status { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "disk full");
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn wrong_token_is_rejected_by_endpoint() {
    let addr = spawn_endpoint().await;
    let uploader = CloudUploader::new(&cloud(addr, "/upload", "wrong"));
    let result = uploader.upload(video(16), |_| {}).await;
    assert!(matches!(result, Err(UploadError::Status { status: 401, .. })));
}

#[tokio::test]
async fn truncated_success_body_is_a_network_error() {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        while !request.ends_with(b"--\r\n") && !request.ends_with(b"\r\n0\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let uploader = CloudUploader::new(&cloud(addr, "/upload", TOKEN));
    let result = uploader.upload(video(16), |_| {}).await;
    assert!(
        matches!(result, Err(UploadError::Network(_))),
        "expected network error, got {:?}",
        result
    );
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let uploader = CloudUploader::new(&cloud(addr, "/upload", TOKEN));
    let result = uploader.upload(video(16), |_| {}).await;
    assert!(matches!(result, Err(UploadError::Network(_))));
}

// --- Publishing through the site ---

struct TestApp {
    _dir: TempDir,
    app: Router,
}

fn test_app(cloud: CloudConfig) -> TestApp {
    let dir = TempDir::new().unwrap();
    let pool = db::create_pool(&dir.path().join("test.db")).unwrap();
    db::run_migrations(&pool).unwrap();

    let config = Config {
        cloud,
        ..Config::default()
    };
    let state = AppState::build(pool, config).unwrap();
    TestApp {
        _dir: dir,
        app: routes::app(state),
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn site(&self) -> Value {
        let (_, body) = self
            .send(Request::get("/api/site").body(Body::empty()).unwrap())
            .await;
        serde_json::from_slice(&body).unwrap()
    }

    async fn post(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Store a demo video and return its media key.
    async fn store_demo_video(&self) -> String {
        let boundary = "cloud-test-boundary";
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"reel.mp4\"\r\nContent-Type: video/mp4\r\n\r\n",
            b = boundary
        )
        .into_bytes();
        body.extend_from_slice(&[1u8; 2048]);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let (status, _) = self
            .send(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/media/demo-video")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={}", boundary),
                    )
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        self.site().await["media"]["demoVideo"]["key"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

#[tokio::test]
async fn publishing_points_the_slot_at_the_remote_url() {
    let addr = spawn_endpoint().await;
    let app = test_app(cloud(addr, "/upload", TOKEN));
    let key = app.store_demo_video().await;

    let (status, body) = app
        .post(&format!("/api/media/{}/publish?slot=demo-video&uploadId=pub-1", key))
        .await;
    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_slice(&body).unwrap();
    let url = response["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("https://cdn.example.com/"));
    assert_eq!(response["size"], 2048);

    let demo = &app.site().await["media"]["demoVideo"];
    assert_eq!(demo["url"], url.as_str());
    assert_eq!(demo["key"], key.as_str());
}

#[tokio::test]
async fn failed_publish_leaves_the_document_alone() {
    let addr = spawn_endpoint().await;
    let app = test_app(cloud(addr, "/fail", TOKEN));
    let key = app.store_demo_video().await;
    let before = app.site().await;

    let (status, _) = app
        .post(&format!("/api/media/{}/publish?slot=demo-video", key))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(app.site().await, before);
}

#[tokio::test]
async fn publishing_without_cloud_settings_is_a_bad_request() {
    let app = test_app(CloudConfig::default());
    let key = app.store_demo_video().await;

    let (status, body) = app.post(&format!("/api/media/{}/publish", key)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8(body).unwrap(), "Missing cloud endpoint or token");
}

#[tokio::test]
async fn publishing_rejects_unknown_slots_and_missing_media() {
    let addr = spawn_endpoint().await;
    let app = test_app(cloud(addr, "/upload", TOKEN));

    let (status, _) = app.post("/api/media/whatever/publish?slot=banner").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.post("/api/media/media-missing/publish").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

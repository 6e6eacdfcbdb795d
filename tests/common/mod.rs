//! In-process stub of the label backend for integration tests.
//!
//! Every path answers with a configurable canned reply; requests are
//! recorded so tests can inspect what the client sent.

#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned response for one path.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: ReplyBody,
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub enum ReplyBody {
    Json(Value),
    Text(String),
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: ReplyBody::Json(body),
            delay: Duration::ZERO,
        }
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: ReplyBody::Json(json!({ "error": message })),
            delay: Duration::ZERO,
        }
    }

    pub fn text(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: ReplyBody::Text(body.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A request the stub received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Shared {
    replies: Mutex<HashMap<String, Reply>>,
    recorded: Mutex<Vec<Recorded>>,
}

/// Handle to a running stub backend.
#[derive(Clone)]
pub struct StubBackend {
    pub base_url: String,
    shared: Arc<Shared>,
}

impl StubBackend {
    /// Start a stub with the default happy-path replies.
    pub async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        {
            let mut replies = shared.replies.lock().unwrap();
            for (path, reply) in default_replies() {
                replies.insert(path.to_string(), reply);
            }
        }

        let app = Router::new().fallback(handle).with_state(shared.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            shared,
        }
    }

    /// Replace the reply for `path`.
    pub fn set(&self, path: &str, reply: Reply) {
        self.shared
            .replies
            .lock()
            .unwrap()
            .insert(path.to_string(), reply);
    }

    /// All requests received so far.
    pub fn recorded(&self) -> Vec<Recorded> {
        self.shared.recorded.lock().unwrap().clone()
    }

    /// Requests received for `path`.
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.recorded()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    body: String,
) -> Response {
    let path = uri.path().to_string();
    shared.recorded.lock().unwrap().push(Recorded {
        method,
        path: path.clone(),
        body: serde_json::from_str(&body).ok(),
    });

    let reply = shared.replies.lock().unwrap().get(&path).cloned();
    let Some(reply) = reply else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "no such route" }))).into_response();
    };

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    match reply.body {
        ReplyBody::Json(value) => (reply.status, Json(value)).into_response(),
        ReplyBody::Text(text) => (reply.status, text).into_response(),
    }
}

/// Happy-path data shaped like the real backend's responses.
pub fn default_replies() -> Vec<(&'static str, Reply)> {
    vec![
        (
            "/api/label/input-items",
            Reply::ok(json!([
                {"id": 1, "text": "Model X", "x": 5, "y": 5, "fontSize": 10, "fontFamily": "Arial"},
                {"id": 2, "text": "220V", "x": 5, "y": 20, "fontSize": 8, "fontFamily": "Tahoma"}
            ])),
        ),
        (
            "/api/label/icon-items",
            Reply::ok(json!([
                {"id": 7, "x": 60, "y": 5, "width": 30, "height": 30, "base64String": "iVBORw0K"}
            ])),
        ),
        (
            "/api/label/barcode-items",
            Reply::ok(json!([
                {"id": 3, "x": 5, "y": 40, "width": 80, "height": 20,
                 "barcodeData": "Barcode_3", "barcodeSequence": 1, "barcodeFormat": "CODE_128",
                 "textAlignment": "center", "textFontSize": 3, "textFontFamily": "Arial"}
            ])),
        ),
        (
            "/api/label/label-settings",
            Reply::ok(json!({"id": 1, "width": 100.0, "height": 29.0, "dpi": 300})),
        ),
        (
            "/api/label/create-bitmap",
            Reply::ok(json!({"bitmap": "AAA=", "message": "Bitmap created successfully"})),
        ),
        (
            "/api/label/save-settings",
            Reply::ok(json!({"message": "Settings saved successfully", "saved_entries": 4})),
        ),
        (
            "/api/label/print",
            Reply::ok(json!({"message": "Labels printed successfully"})),
        ),
        (
            "/api/label/settings",
            Reply::ok(json!({
                "bluetooth_printer_name": "TSC TE310-btpincode",
                "carton_printer_name": "TSC TE310-packaging",
                "bluetooth_label_width": 100.0,
                "bluetooth_label_height": 29.0,
                "carton_label_width": 100.0,
                "carton_label_height": 67.0,
                "dpi": 300,
                "orientation": "portrait",
                "density": 12,
                "speed": 4,
                "gap_height": 3.048,
                "gap_offset": 0.0,
                "tear_off": true,
                "left_shift": 2.032,
                "right_shift": 2.032,
                "is_app_development_mode": false
            })),
        ),
        (
            "/health",
            Reply::ok(json!({
                "status": "healthy",
                "timestamp": "2024-05-01T10:20:30.123456",
                "version": "1.0.0"
            })),
        ),
    ]
}

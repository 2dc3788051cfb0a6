//! Local backends for exercising the HTTP paths in tests.

use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port and return its base URL.
pub(crate) async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Base URL of a port that was bound and released, so connections are refused.
pub(crate) fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Body of a successful recognition of a shipping label.
pub(crate) fn sample_body() -> Value {
    json!({
        "success": true,
        "target_match": {
            "matched_text": "TRACKING: 163233702292313922_1_lWV SHIP TO: X",
            "score": 91.2,
            "pattern_found": "163233702292313922_1_lWV"
        },
        "ocr_results": [
            {"text": "TRACKING:", "confidence": 0.96, "engine": "tesseract", "bbox": [12, 40, 120, 62]},
            {"text": "163233702292313922_1_lWV", "confidence": 0.912, "engine": "easyocr"},
            {"text": "SHIP TO: X", "confidence": 0.88, "engine": "paddleocr"}
        ],
        "full_text": "TRACKING: 163233702292313922_1_lWV SHIP TO: X",
        "preprocessing_steps": ["grayscale", "denoise"]
    })
}

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use salondesk::config::{parse_config, ConfigV1};
use salondesk::routes::create_router;
use salondesk::startup::build_state;
use salondesk::state::AppState;
use serde_json::Value;

/// Console config backed by a seeded in-memory store, an in-memory session
/// and uploads written under `upload_root`.
pub fn test_config(upload_root: &PathBuf) -> ConfigV1 {
    let yaml = format!(
        r#"
version: "1.0.0"
bind_address: 127.0.0.1:0
logging:
  level: "debug"
  format: "json"
remote:
  type: memory
  collections:
    managers:
      - id: m1
        name: Lena
        email: lena@salon.test
        password: pw1
        salonId: s1
      - id: m2
        email: drifter@salon.test
        password: pw3
    superAdmins:
      - id: a1
        name: Root
        email: root@salon.test
        password: pw2
    salons/s1/clients:
      - id: c1
        name: Bea
        salonId: s1
        visitCount: 3
      - id: c2
        name: Ana
        salonId: s1
    salons/s2/clients:
      - id: c3
        name: Cy
        salonId: s2
    salons/s1/recommendations:
      - id: r1
        clientId: c1
        salonId: s1
        createdAt: "2026-10-01T09:00:00Z"
        products:
          - name: Bond repair
            sold: true
          - name: Heat shield
            sold: false
session:
  type: memory
storage:
  type: local
  root: "{}"
  public_url: http://cdn.test/uploads
"#,
        upload_root.display()
    );
    parse_config(&yaml).expect("test config should parse")
}

pub fn upload_root() -> PathBuf {
    std::env::temp_dir().join(format!("salondesk-it-{}", uuid::Uuid::new_v4()))
}

pub async fn build_app(config: ConfigV1) -> (Router, AppState) {
    let state = build_state(Arc::new(config))
        .await
        .expect("state should build");
    (create_router(state.clone()), state)
}

pub async fn test_app() -> (Router, AppState) {
    build_app(test_config(&upload_root())).await
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub fn json_request(method: Method, path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8_lossy(&bytes).into_owned()
}

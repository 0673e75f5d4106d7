//! HTTP endpoint for batch runs.
//!
//! `POST /api/plm-automation` with `{"styleIds": [...]}` runs one batch and
//! answers with the [`BatchReport`](crate::batch::BatchReport), or a
//! [`FailureReport`](crate::batch::FailureReport) with status 500. Batches
//! run one at a time on a blocking worker.

use crate::config::EngineConfig;
use crate::host::{self, HostConfig};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinError;

#[derive(Clone)]
pub struct AppState {
    host: Arc<HostConfig>,
    engine: Arc<EngineConfig>,
    /// Held for the duration of a batch
    running: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(host: HostConfig, engine: EngineConfig) -> Self {
        Self { host: Arc::new(host), engine: Arc::new(engine), running: Arc::new(Mutex::new(())) }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/plm-automation", post(plm_automation))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Style IDs from the request body, if it carries an array of strings
fn style_ids(body: &Value) -> Option<Vec<String>> {
    body.get("styleIds")?
        .as_array()?
        .iter()
        .map(|id| id.as_str().map(str::to_string))
        .collect()
}

/// Run `job` on a blocking worker while holding the batch lock.
///
/// The guard moves into the worker, so the lock stays held until `job`
/// returns even if the awaiting request is dropped.
async fn run_exclusive<T, F>(running: &Arc<Mutex<()>>, job: F) -> Result<T, JoinError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let guard = Arc::clone(running).lock_owned().await;
    tokio::task::spawn_blocking(move || {
        let _guard = guard;
        job()
    })
    .await
}

fn missing_style_ids() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": "Style IDs array is required" }))).into_response()
}

async fn plm_automation(State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            log::debug!("Rejected request body: {}", rejection);
            return missing_style_ids();
        }
    };
    let Some(style_ids) = style_ids(&body) else {
        return missing_style_ids();
    };

    log::info!("Starting PLM automation for style IDs: {:?}", style_ids);

    let host = Arc::clone(&state.host);
    let engine = Arc::clone(&state.engine);
    let outcome = run_exclusive(&state.running, move || host::run(&host, &engine, &style_ids)).await;

    match outcome {
        Ok(Ok(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(Err(failure)) => (StatusCode::INTERNAL_SERVER_ERROR, Json(failure)).into_response(),
        Err(e) => {
            log::error!("Batch worker failed: {}", e);
            let failure = crate::batch::FailureReport::from_message(&e.to_string());
            (StatusCode::INTERNAL_SERVER_ERROR, Json(failure)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::FromRequest;
    use axum::http::Request;
    use std::sync::mpsc;
    use std::time::Duration;

    fn state() -> AppState {
        AppState::new(HostConfig::new("https://plm.example.com"), EngineConfig::default())
    }

    #[test]
    fn test_style_ids_parsing() {
        assert_eq!(style_ids(&json!({ "styleIds": ["A1", "B2"] })), Some(vec!["A1".to_string(), "B2".to_string()]));
        assert_eq!(style_ids(&json!({ "styleIds": [] })), Some(Vec::new()));
        assert_eq!(style_ids(&json!({ "styleIds": "A1" })), None);
        assert_eq!(style_ids(&json!({ "styleIds": ["A1", 2] })), None);
        assert_eq!(style_ids(&json!({})), None);
    }

    #[tokio::test]
    async fn test_missing_style_ids_is_bad_request() {
        let response = plm_automation(State(state()), Ok(Json(json!({ "ids": ["A1"] })))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_gets_json_error() {
        let request = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from("styleIds=A1"))
            .unwrap();
        let body = Json::<Value>::from_request(request, &()).await;
        assert!(body.is_err());

        let response = plm_automation(State(state()), body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(error, json!({ "error": "Style IDs array is required" }));
    }

    #[tokio::test]
    async fn test_dropped_request_keeps_batch_lock_until_worker_ends() {
        let running = Arc::new(Mutex::new(()));
        let (release, blocked) = mpsc::channel::<()>();

        let request = run_exclusive(&running, move || {
            let _ = blocked.recv();
        });
        assert!(tokio::time::timeout(Duration::from_millis(100), request).await.is_err());

        // The worker is still running, so a second batch must wait
        assert!(running.try_lock().is_err());

        release.send(()).unwrap();
        let next = tokio::time::timeout(Duration::from_secs(5), running.lock()).await;
        assert!(next.is_ok());
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }
}

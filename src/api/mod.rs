//! HTTP API module
//!
//! This module contains the timer control endpoints and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer", get(timer_handler))
        .route("/timer/mode", post(mode_handler))
        .route("/timer/toggle", post(toggle_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/sessions", get(sessions_handler))
        .route("/notifications", get(notifications_handler))
        .route("/user", get(user_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::{state::TimerMode, tasks::completion::tests::test_state};

    async fn send(router: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = router.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_select_mode_endpoint() {
        let state = test_state();
        let router = create_router(Arc::clone(&state));

        let (status, body) =
            send(router, Method::POST, "/timer/mode", Some(r#"{"mode":"longBreak"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["mode"], "longBreak");
        assert_eq!(body["timer"]["secondsRemaining"], 900);
        assert_eq!(state.get_timer_state().unwrap().mode, TimerMode::LongBreak);
    }

    #[tokio::test]
    async fn test_unknown_mode_is_rejected_without_changing_state() {
        let state = test_state();
        let before = state.get_timer_state().unwrap();
        let router = create_router(Arc::clone(&state));

        let (status, body) =
            send(router, Method::POST, "/timer/mode", Some(r#"{"mode":"nap"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(state.get_timer_state().unwrap(), before);
    }

    #[tokio::test]
    async fn test_toggle_and_reset_endpoints() {
        let state = test_state();

        let (_, body) = send(create_router(Arc::clone(&state)), Method::POST, "/timer/toggle", None).await;
        assert_eq!(body["status"], "running");

        let (_, body) = send(
            create_router(Arc::clone(&state)),
            Method::POST,
            "/timer/reset",
            Some(r#"{"seconds":90}"#),
        )
        .await;
        assert_eq!(body["status"], "paused");
        assert_eq!(body["timer"]["secondsRemaining"], 90);

        let (_, body) = send(create_router(Arc::clone(&state)), Method::POST, "/timer/reset", None).await;
        assert_eq!(body["timer"]["secondsRemaining"], 1500);
    }

    #[tokio::test]
    async fn test_user_endpoint_without_user_is_not_found() {
        let state = test_state();
        state.set_user(None);

        let (status, _) = send(create_router(state), Method::GET, "/user", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_reports_signed_in_user() {
        let (status, body) = send(create_router(test_state()), Method::GET, "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["signed_in"], true);
        assert_eq!(body["completed_today"], 0);
    }
}

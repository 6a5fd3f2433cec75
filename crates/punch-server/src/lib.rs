//! HTTP server for the punch clock relay.
//!
//! - `POST /clock` records a clock action from a tag reader
//! - `GET /events` streams recorded actions to kiosk displays (SSE)
//! - `GET /latest` returns the most recent recorded action

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{ClockRequest, ClockResponse, LatestResponse};
pub use router::build_router;
pub use server::PunchServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use futures::StreamExt;
    use punch_store::{
        EventStore, InMemoryEventStore, InMemoryTagStore, StoreError, StoreResult,
    };
    use punch_types::{ClockEvent, TagBinding};
    use tower::util::ServiceExt;

    struct BrokenStore;

    #[async_trait]
    impl EventStore for BrokenStore {
        async fn append(&self, _event: &ClockEvent) -> StoreResult<()> {
            Err(StoreError::Unavailable("write refused".into()))
        }
        async fn latest(&self) -> StoreResult<Option<ClockEvent>> {
            Ok(None)
        }
        async fn count(&self) -> StoreResult<u64> {
            Ok(0)
        }
    }

    fn config() -> ServerConfig {
        ServerConfig {
            tags: vec![TagBinding::new("A1B2", "e1", "John Doe")],
            ..ServerConfig::default()
        }
    }

    async fn state() -> AppState {
        AppState::from_config(config()).await.unwrap()
    }

    fn post_clock(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/clock")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Read stream chunks until one carries a `data:` line.
    async fn next_data<S>(stream: &mut S) -> Option<String>
    where
        S: futures::Stream<Item = Result<axum::body::Bytes, axum::Error>> + Unpin,
    {
        loop {
            let chunk = tokio::time::timeout(Duration::from_millis(500), stream.next())
                .await
                .ok()??
                .unwrap();
            let text = String::from_utf8_lossy(&chunk).into_owned();
            if let Some(line) = text.lines().find(|l| l.starts_with("data:")) {
                return Some(line.trim_start_matches("data:").trim().to_string());
            }
        }
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(state().await);
        let response = app.oneshot(get("/v1/health")).await.unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn info_endpoint() {
        let app = build_router(state().await);
        let response = app.oneshot(get("/v1/info")).await.unwrap();
        assert_eq!(response.status(), 200);
        let body = json_body(response).await;
        assert_eq!(body["name"], "punch-server");
        assert_eq!(body["subscribers"], 0);
    }

    #[tokio::test]
    async fn clock_in_is_acknowledged_and_streamed() {
        let app = build_router(state().await);

        let events = app.clone().oneshot(get("/events")).await.unwrap();
        assert_eq!(events.status(), 200);
        let headers = events.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        let mut stream = events.into_body().into_data_stream();

        let response = app
            .oneshot(post_clock(r#"{"uid":"A1B2","action":"in"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "success": true, "name": "John Doe" })
        );

        let data = next_data(&mut stream).await.unwrap();
        let frame: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(
            frame,
            serde_json::json!({ "employeeId": "e1", "name": "John Doe", "action": "in" })
        );
    }

    #[tokio::test]
    async fn every_open_stream_receives_the_event() {
        let app = build_router(state().await);
        let mut streams = Vec::new();
        for _ in 0..3 {
            let events = app.clone().oneshot(get("/events")).await.unwrap();
            streams.push(events.into_body().into_data_stream());
        }

        let response = app
            .oneshot(post_clock(r#"{"uid":"A1B2","action":"out"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        for stream in &mut streams {
            let data = next_data(stream).await.unwrap();
            assert!(data.contains(r#""action":"out""#));
        }
    }

    #[tokio::test]
    async fn unknown_tag_is_400_and_not_streamed() {
        let app = build_router(state().await);
        let events = app.clone().oneshot(get("/events")).await.unwrap();
        let mut stream = events.into_body().into_data_stream();

        let response = app
            .clone()
            .oneshot(post_clock(r#"{"uid":"ZZZZ","action":"in"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Unknown tag");

        assert!(next_data(&mut stream).await.is_none());

        let latest = app.oneshot(get("/latest")).await.unwrap();
        assert_eq!(latest.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn invalid_bodies_are_400() {
        let app = build_router(state().await);
        for body in [
            r#"{"uid":"A1B2"}"#,
            r#"{"action":"in"}"#,
            r#"{"uid":"A1B2","action":"sideways"}"#,
            r#"{"uid":"","action":"in"}"#,
            "not json",
        ] {
            let response = app.clone().oneshot(post_clock(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert!(json_body(response).await["error"].is_string());
        }
    }

    #[tokio::test]
    async fn get_clock_is_405_with_allow_post() {
        let app = build_router(state().await);
        let response = app.oneshot(get("/clock")).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
    }

    #[tokio::test]
    async fn post_events_is_405() {
        let app = build_router(state().await);
        let request = Request::builder()
            .method("POST")
            .uri("/events")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
    }

    #[tokio::test]
    async fn persistence_failure_is_500_and_not_streamed() {
        let tags: InMemoryTagStore = config().tags.into_iter().collect();
        let state = AppState::with_stores(config(), Arc::new(tags), Arc::new(BrokenStore))
            .await
            .unwrap();
        let app = build_router(state);
        let events = app.clone().oneshot(get("/events")).await.unwrap();
        let mut stream = events.into_body().into_data_stream();

        let response = app
            .oneshot(post_clock(r#"{"uid":"A1B2","action":"in"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "Internal Server Error");
        assert!(next_data(&mut stream).await.is_none());
    }

    #[tokio::test]
    async fn latest_reports_most_recent_event() {
        let app = build_router(state().await);
        let empty = app.clone().oneshot(get("/latest")).await.unwrap();
        assert_eq!(empty.status(), StatusCode::NO_CONTENT);

        for action in ["in", "out"] {
            let body = format!(r#"{{"uid":"A1B2","action":"{action}"}}"#);
            let response = app.clone().oneshot(post_clock(&body)).await.unwrap();
            assert_eq!(response.status(), 200);
        }

        let latest = app.oneshot(get("/latest")).await.unwrap();
        assert_eq!(latest.status(), 200);
        assert_eq!(
            json_body(latest).await,
            serde_json::json!({ "name": "John Doe", "action": "out" })
        );
    }

    #[tokio::test]
    async fn dropped_stream_unregisters_subscriber() {
        let state = state().await;
        let registry = Arc::clone(&state.registry);
        let app = build_router(state);

        let events = app.clone().oneshot(get("/events")).await.unwrap();
        assert_eq!(registry.len(), 1);
        drop(events);
        assert!(registry.is_empty());

        let response = app
            .oneshot(post_clock(r#"{"uid":"A1B2","action":"in"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[tokio::test]
    async fn journal_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            journal_path: Some(dir.path().join("events.journal")),
            ..config()
        };

        let app = build_router(AppState::from_config(config.clone()).await.unwrap());
        let response = app
            .oneshot(post_clock(r#"{"uid":"A1B2","action":"in"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let app = build_router(AppState::from_config(config).await.unwrap());
        let latest = app.oneshot(get("/latest")).await.unwrap();
        assert_eq!(
            json_body(latest).await,
            serde_json::json!({ "name": "John Doe", "action": "in" })
        );
    }

    #[tokio::test]
    async fn in_memory_store_is_default() {
        let events = Arc::new(InMemoryEventStore::new());
        let tags: InMemoryTagStore = config().tags.into_iter().collect();
        let state = AppState::with_stores(config(), Arc::new(tags), events.clone())
            .await
            .unwrap();
        let app = build_router(state);
        app.oneshot(post_clock(r#"{"uid":"A1B2","action":"in"}"#))
            .await
            .unwrap();
        assert_eq!(events.count().await.unwrap(), 1);
        assert_eq!(events.events()[0].method, "RFID");
    }
}

use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Json, Response};
use futures::stream::{self, StreamExt};
use punch_types::ClockAction;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Body of `POST /clock`. Both fields are optional at the parsing layer so
/// that a missing field is reported as invalid input rather than a
/// deserialization failure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ClockRequest {
    pub uid: Option<String>,
    pub action: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClockResponse {
    pub success: bool,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LatestResponse {
    pub name: String,
    pub action: ClockAction,
}

/// Record a clock action and fan it out to connected kiosks.
pub async fn clock_handler(
    State(state): State<AppState>,
    payload: Result<Json<ClockRequest>, JsonRejection>,
) -> ServerResult<Json<ClockResponse>> {
    let Json(request) = payload.map_err(|e| ServerError::InvalidInput(e.body_text()))?;
    let (Some(uid), Some(action)) = (request.uid, request.action) else {
        return Err(ServerError::InvalidInput("uid and action are required".into()));
    };

    let ack = state.service.clock(&uid, &action).await?;
    Ok(Json(ClockResponse {
        success: true,
        name: ack.name,
    }))
}

/// Open a server-sent event stream of clock events.
///
/// The connection's registration lives inside the stream; when the client
/// goes away the stream is dropped and the subscriber is unregistered.
pub async fn events_handler(State(state): State<AppState>) -> impl IntoResponse {
    let subscription = state.registry.open(state.config.subscriber_capacity);
    info!(subscriber = %subscription.id(), "kiosk connected");

    let opened = stream::once(async { Ok::<_, Infallible>(Event::default().comment("connected")) });
    let frames = stream::unfold(subscription, |mut subscription| async move {
        let frame = subscription.recv().await?;
        Some((Ok::<_, Infallible>(Event::default().data(&*frame)), subscription))
    });

    let sse = Sse::new(opened.chain(frames))
        .keep_alive(KeepAlive::new().interval(state.config.keep_alive()));
    ([(header::CONNECTION, "keep-alive")], sse)
}

/// Most recent persisted clock event, or 204 if none has been recorded.
pub async fn latest_handler(State(state): State<AppState>) -> ServerResult<Response> {
    Ok(match state.service.latest().await? {
        Some(event) => Json(LatestResponse {
            name: event.name,
            action: event.action,
        })
        .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Info handler.
pub async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "name": "punch-server",
        "version": env!("CARGO_PKG_VERSION"),
        "subscribers": state.registry.len(),
    }))
}

fn method_not_allowed(method: &Method, allow: &'static str) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, allow)],
        format!("Method {method} Not Allowed"),
    )
        .into_response()
}

pub async fn post_only(method: Method) -> Response {
    method_not_allowed(&method, "POST")
}

pub async fn get_only(method: Method) -> Response {
    method_not_allowed(&method, "GET")
}

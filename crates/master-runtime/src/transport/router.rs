//! # HTTP / WebSocket Router
//!
//! | Route | Kind | Subsystem |
//! |-------|------|-----------|
//! | `POST /rpc/node/register` | unary | TC-01 `Register` |
//! | `POST /rpc/node/heartbeat` | unary | TC-01 `SendHeartbeat` |
//! | `POST /rpc/node/ping` | unary | TC-01 `Ping` |
//! | `POST /rpc/node/unsubscribe` | unary | TC-01 `Unsubscribe` |
//! | `GET /rpc/node/subscribe?node_key=` | stream, server → node | TC-01 `Subscribe` |
//! | `GET /rpc/message/connect` | stream, duplex | TC-02 `Connect` |
//! | `POST /rpc/model/delegate` | unary | TC-03 `Do` |
//! | `GET /rpc/task/subscribe` | stream, node → server | TC-04 `Subscribe` |
//! | `GET /health`, `GET /metrics` | plain | runtime |
//!
//! Unary bodies are bincode `Request` / `Response`. Service errors travel
//! inside a `200` response with their error code; non-`200` statuses are
//! reserved for envelopes the transport itself cannot read or write.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{ws::WebSocketUpgrade, DefaultBodyLimit, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared_types::{CodecError, ErrorCode, ErrorCoded, Request, Response};
use tc_01_node_coordination::NodeCoordinationApi;
use tc_02_message_routing::MessageRoutingApi;
use tc_04_task_telemetry::TaskTelemetryApi;
use thiserror::Error;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::adapters::bridge;
use crate::container::SubsystemContainer;

/// Envelope-level failures on unary routes.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Malformed request envelope: {0}")]
    MalformedEnvelope(#[from] CodecError),
}

impl ErrorCoded for TransportError {
    fn error_code(&self) -> ErrorCode {
        ErrorCode::InternalError
    }
}

#[derive(Clone)]
struct AppState {
    container: Arc<SubsystemContainer>,
}

#[derive(Debug, Deserialize)]
struct SubscribeParams {
    #[serde(default)]
    node_key: String,
}

/// Build the master's router over `container`.
pub fn build_router(container: Arc<SubsystemContainer>) -> Router {
    let max_body = container.config.max_frame_bytes;
    let state = AppState { container };

    Router::new()
        .route("/rpc/node/register", post(node_register))
        .route("/rpc/node/heartbeat", post(node_heartbeat))
        .route("/rpc/node/ping", post(node_ping))
        .route("/rpc/node/unsubscribe", post(node_unsubscribe))
        .route("/rpc/node/subscribe", get(node_subscribe))
        .route("/rpc/message/connect", get(message_connect))
        .route("/rpc/model/delegate", post(model_delegate))
        .route("/rpc/task/subscribe", get(task_subscribe))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// UNARY
// =============================================================================

fn decode_request(body: &[u8]) -> Result<Request, Response> {
    Request::from_bytes(body).map_err(|e| {
        warn!(error = %e, "malformed request envelope");
        Response::error(&TransportError::from(e))
    })
}

fn encode_response(response: Response) -> HttpResponse {
    match response.to_bytes() {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode response envelope");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn node_register(State(state): State<AppState>, body: Bytes) -> HttpResponse {
    let response = match decode_request(&body) {
        Ok(request) => state.container.coordination_handler.handle_register(&request).await,
        Err(response) => response,
    };
    encode_response(response)
}

async fn node_heartbeat(State(state): State<AppState>, body: Bytes) -> HttpResponse {
    let response = match decode_request(&body) {
        Ok(request) => state.container.coordination_handler.handle_heartbeat(&request).await,
        Err(response) => response,
    };
    encode_response(response)
}

async fn node_ping(State(state): State<AppState>, body: Bytes) -> HttpResponse {
    let response = match decode_request(&body) {
        Ok(request) => state.container.coordination_handler.handle_ping(&request),
        Err(response) => response,
    };
    encode_response(response)
}

async fn node_unsubscribe(State(state): State<AppState>, body: Bytes) -> HttpResponse {
    let response = match decode_request(&body) {
        Ok(request) => state.container.coordination_handler.handle_unsubscribe(&request),
        Err(response) => response,
    };
    encode_response(response)
}

async fn model_delegate(State(state): State<AppState>, body: Bytes) -> HttpResponse {
    let response = match decode_request(&body) {
        Ok(request) => state.container.delegate_handler.do_request(&request).await,
        Err(response) => response,
    };
    encode_response(response)
}

// =============================================================================
// STREAMS
// =============================================================================

async fn node_subscribe(
    State(state): State<AppState>,
    Query(params): Query<SubscribeParams>,
    ws: WebSocketUpgrade,
) -> HttpResponse {
    if params.node_key.is_empty() {
        return (StatusCode::BAD_REQUEST, "node_key is required").into_response();
    }
    ws.on_upgrade(move |socket| async move {
        let container = state.container;
        let stream = bridge(
            socket,
            "node.subscribe",
            container.config.routing.stream_buffer,
            container.config.max_frame_bytes,
        );
        // Server-to-node only; anything the node sends is discarded.
        drop(stream.source);
        if let Err(e) = container
            .coordination
            .subscribe(&params.node_key, Arc::new(stream.sink))
            .await
        {
            warn!(node_key = %params.node_key, error = %e, "[tc-01] subscribe ended with error");
        }
    })
}

async fn message_connect(State(state): State<AppState>, ws: WebSocketUpgrade) -> HttpResponse {
    ws.on_upgrade(move |socket| async move {
        let container = state.container;
        let stream = bridge(
            socket,
            "message.connect",
            container.config.routing.stream_buffer,
            container.config.max_frame_bytes,
        );
        let mut source = stream.source;
        if let Err(e) = container
            .routing
            .connect(&mut source, Arc::new(stream.sink))
            .await
        {
            warn!(error = %e, "[tc-02] message stream ended with error");
        }
    })
}

async fn task_subscribe(State(state): State<AppState>, ws: WebSocketUpgrade) -> HttpResponse {
    ws.on_upgrade(move |socket| async move {
        let container = state.container;
        let stream = bridge(
            socket,
            "task.subscribe",
            container.config.routing.stream_buffer,
            container.config.max_frame_bytes,
        );
        let mut source = stream.source;
        if let Err(e) = container.telemetry.subscribe(&mut source).await {
            warn!(error = %e, "[tc-04] telemetry stream ended with error");
        }
        info!("[tc-04] telemetry stream closed");
    })
}

// =============================================================================
// OPERATIONS
// =============================================================================

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "master_key": state.container.config.master_key,
        "subscriptions": state.container.registry.len(),
    }))
}

async fn metrics() -> HttpResponse {
    match cluster_telemetry::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::RuntimeConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use shared_store::ModelStore;
    use shared_types::{codec, DelegateMessage, DelegateMethod, Model, Node, NodeInfo, NodeStatus, Tag};
    use tower::ServiceExt;

    fn router() -> (Router, Arc<SubsystemContainer>) {
        let container = Arc::new(SubsystemContainer::new(RuntimeConfig::default()));
        (build_router(Arc::clone(&container)), container)
    }

    async fn call(router: &Router, path: &str, body: Vec<u8>) -> (StatusCode, Vec<u8>) {
        let response = router
            .clone()
            .oneshot(
                HttpRequest::post(path)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn unary(router: &Router, path: &str, request: Request) -> Response {
        let (status, body) = call(router, path, request.to_bytes().unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        Response::from_bytes(&body).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_heartbeat() {
        let (router, _) = router();
        let info = NodeInfo {
            key: "w1".into(),
            ..Default::default()
        };
        let response = unary(&router, "/rpc/node/register", Request::with_json("", &info).unwrap()).await;
        assert!(response.is_ok());

        let response = unary(&router, "/rpc/node/heartbeat", Request::new("w1", vec![])).await;
        assert!(response.is_ok());
        let node: Node = codec::from_json(&response.data).unwrap();
        assert_eq!(node.status, NodeStatus::Online);
    }

    #[tokio::test]
    async fn test_malformed_envelope_is_coded_response() {
        let (router, _) = router();
        let (status, body) = call(&router, "/rpc/node/ping", vec![0xff]).await;
        assert_eq!(status, StatusCode::OK);
        let response = Response::from_bytes(&body).unwrap();
        assert_eq!(response.error_code(), Some(ErrorCode::InternalError));
    }

    #[tokio::test]
    async fn test_delegate_route() {
        let (router, container) = router();
        let msg = DelegateMessage::new(
            DelegateMethod::Add,
            &Model::from(Tag {
                name: "prod".into(),
                ..Default::default()
            }),
        )
        .unwrap();
        let response = unary(
            &router,
            "/rpc/model/delegate",
            Request::new("w1", msg.to_bytes().unwrap()),
        )
        .await;
        assert!(response.is_ok());
        let tag: Tag = codec::from_json(&response.data).unwrap();
        let stored = container
            .store
            .get_by_id(shared_types::ModelKind::Tag, tag.id.unwrap())
            .await
            .unwrap();
        assert_eq!(Tag::try_from(stored).unwrap().name, "prod");
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_node() {
        let (router, _) = router();
        let response = unary(&router, "/rpc/node/unsubscribe", Request::new("ghost", vec![])).await;
        assert_eq!(response.error_code(), Some(ErrorCode::SubscribeNotFound));
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let container = Arc::new(SubsystemContainer::new(RuntimeConfig {
            max_frame_bytes: 16,
            ..RuntimeConfig::default()
        }));
        let router = build_router(container);
        let (status, _) = call(&router, "/rpc/node/ping", vec![0; 64]).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = router();
        let response = router
            .oneshot(HttpRequest::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

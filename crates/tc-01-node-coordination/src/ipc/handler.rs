//! IPC Handler for Node Coordination
//!
//! Decodes unary `Request`s, calls the service and encodes the outcome as a
//! `Response`. Failures never escape as transport errors; they are carried in
//! the response with a stable error code.

use crate::domain::errors::CoordinationError;
use crate::ports::inbound::NodeCoordinationApi;
use shared_types::{codec, NodeInfo, Request, Response};
use std::sync::Arc;
use tracing::error;

pub struct NodeCoordinationHandler {
    service: Arc<dyn NodeCoordinationApi>,
}

fn respond_with_node(result: Result<shared_types::Node, CoordinationError>) -> Response {
    match result {
        Ok(node) => Response::ok_with_json(&node).unwrap_or_else(|e| {
            error!(error = %e, "[tc-01] failed to encode node");
            Response::error(&e)
        }),
        Err(e) => Response::error(&e),
    }
}

impl NodeCoordinationHandler {
    pub fn new(service: Arc<dyn NodeCoordinationApi>) -> Self {
        Self { service }
    }

    /// `Register`: payload is an optional JSON `NodeInfo`.
    pub async fn handle_register(&self, request: &Request) -> Response {
        let info = if request.data.is_empty() {
            NodeInfo::default()
        } else {
            match codec::from_json::<NodeInfo>(&request.data) {
                Ok(info) => info,
                Err(e) => return Response::error(&CoordinationError::InvalidPayload(e)),
            }
        };
        respond_with_node(self.service.register(&request.node_key, info).await)
    }

    /// `SendHeartbeat`
    pub async fn handle_heartbeat(&self, request: &Request) -> Response {
        respond_with_node(self.service.heartbeat(&request.node_key).await)
    }

    /// `Ping`
    pub fn handle_ping(&self, request: &Request) -> Response {
        self.service.ping(&request.node_key);
        Response::ok()
    }

    /// `Unsubscribe`
    pub fn handle_unsubscribe(&self, request: &Request) -> Response {
        match self.service.unsubscribe(&request.node_key) {
            Ok(()) => Response {
                message: "unsubscribed successfully".to_string(),
                ..Response::ok()
            },
            Err(e) => Response::error(&e),
        }
    }
}

//! IPC Handler for Model Delegate
//!
//! `Do`: the request payload is a bincode [`DelegateMessage`]; the response
//! payload is the JSON entity (or artifact) the store produced.

use crate::application::service::describe;
use crate::domain::DelegateError;
use crate::ports::inbound::ModelDelegateApi;
use shared_types::{DelegateMessage, Request, Response};
use std::sync::Arc;
use tracing::{debug, error};

pub struct ModelDelegateHandler {
    service: Arc<dyn ModelDelegateApi>,
}

impl ModelDelegateHandler {
    pub fn new(service: Arc<dyn ModelDelegateApi>) -> Self {
        Self { service }
    }

    pub async fn do_request(&self, request: &Request) -> Response {
        let msg = match DelegateMessage::from_bytes(&request.data) {
            Ok(msg) => msg,
            Err(e) => {
                error!(node_key = %request.node_key, error = %e, "[tc-03] undecodable delegate message");
                return Response::error(&DelegateError::Codec(e));
            }
        };
        debug!(node_key = %request.node_key, model = %describe(&msg), method = msg.method, "[tc-03] Do");

        let outcome = match self.service.execute(&msg).await {
            Ok(outcome) => outcome,
            Err(e) => return Response::error(&e),
        };
        match outcome.encode() {
            Ok(data) => Response::ok_with_data(data),
            Err(e) => {
                error!(error = %e, "[tc-03] failed to encode delegate result");
                Response::error(&DelegateError::Codec(e))
            }
        }
    }
}

//! # Message Routing Service
//!
//! Each connected peer drives one loop over its inbound envelopes:
//!
//! | Code | Effect | Loop |
//! |------|--------|------|
//! | `Connect` | register this stream under the source key | continue |
//! | `Disconnect` | remove the source key | return |
//! | `Send` | write the envelope to the destination's stream | continue |
//! | other | logged | continue |
//!
//! Routing failures are the sender's problem only in the logs: the sender's
//! stream stays open and nothing is written back to it.

use crate::domain::errors::RoutingError;
use crate::ports::inbound::MessageRoutingApi;
use async_trait::async_trait;
use cluster_telemetry::{metric_inc, record_error, MESSAGES_ROUTED, REGISTRY_SUBSCRIPTIONS};
use shared_bus::{finished_signal, StreamSink, StreamSource, Subscription, SubscriptionRegistry};
use shared_types::{StreamMessage, StreamMessageCode};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub struct MessageRoutingService {
    registry: Arc<SubscriptionRegistry>,
}

impl MessageRoutingService {
    pub fn new(registry: Arc<SubscriptionRegistry>) -> Self {
        Self { registry }
    }

    fn on_connect(&self, msg: &StreamMessage, sink: &Arc<dyn StreamSink>) {
        let key = msg.source_key();
        if key.is_empty() {
            warn!(node_key = %msg.node_key, "[tc-02] connect without a key ignored");
            return;
        }
        let (finished, _listener) = finished_signal();
        self.registry
            .set(key, Subscription::new(Arc::clone(sink), finished));
        REGISTRY_SUBSCRIPTIONS.set(self.registry.len() as i64);
        info!(node_key = %msg.node_key, key = %key, "[tc-02] endpoint connected");
    }

    fn on_disconnect(&self, msg: &StreamMessage) {
        let key = msg.source_key();
        self.registry.delete(key);
        REGISTRY_SUBSCRIPTIONS.set(self.registry.len() as i64);
        info!(node_key = %msg.node_key, key = %key, "[tc-02] endpoint disconnected");
    }
}

#[async_trait]
impl MessageRoutingApi for MessageRoutingService {
    async fn connect(
        &self,
        source: &mut dyn StreamSource,
        sink: Arc<dyn StreamSink>,
    ) -> Result<(), RoutingError> {
        loop {
            let msg = match source.recv().await {
                Ok(Some(msg)) => msg,
                Ok(None) => {
                    info!("[tc-02] received EOF, closing stream");
                    return Ok(());
                }
                Err(e) if e.is_cancellation() => {
                    info!(reason = %e, "[tc-02] stream cancelled");
                    return Ok(());
                }
                Err(e) => {
                    record_error!("tc-02", "transport");
                    error!(error = %e, "[tc-02] receive failed");
                    return Err(RoutingError::Transport(e));
                }
            };

            match msg.code() {
                Ok(StreamMessageCode::Connect) => self.on_connect(&msg, &sink),
                Ok(StreamMessageCode::Disconnect) => {
                    self.on_disconnect(&msg);
                    return Ok(());
                }
                Ok(StreamMessageCode::Send) => {
                    // Failures are logged and counted inside `route`.
                    let _ = self.route(msg).await;
                }
                Ok(code) => {
                    warn!(code = ?code, node_key = %msg.node_key, "[tc-02] envelope not handled on message stream");
                }
                Err(code) => {
                    warn!(code, node_key = %msg.node_key, "[tc-02] unknown envelope code");
                }
            }
        }
    }

    async fn route(&self, msg: StreamMessage) -> Result<(), RoutingError> {
        let to = msg.to.clone();
        debug!(from = %msg.from, to = %to, bytes = msg.data.len(), "[tc-02] send");

        let subscription = match self.registry.get(&to) {
            Ok(sub) => sub,
            Err(e) => {
                metric_inc!(MESSAGES_ROUTED, &["not_found"]);
                warn!(from = %msg.from, to = %to, "[tc-02] destination not subscribed");
                return Err(e.into());
            }
        };

        match subscription.deliver(msg).await {
            Ok(()) => {
                metric_inc!(MESSAGES_ROUTED, &["delivered"]);
                Ok(())
            }
            Err(source) => {
                metric_inc!(MESSAGES_ROUTED, &["write_failed"]);
                error!(to = %to, error = %source, "[tc-02] write to destination failed");
                Err(RoutingError::WriteFailed { to, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_bus::{channel_stream, PeerStream, StreamError};
    use std::time::Duration;
    use tokio::task::JoinHandle;

    fn service() -> (Arc<MessageRoutingService>, Arc<SubscriptionRegistry>) {
        let registry = Arc::new(SubscriptionRegistry::new());
        (Arc::new(MessageRoutingService::new(registry.clone())), registry)
    }

    fn spawn_peer(svc: &Arc<MessageRoutingService>) -> (PeerStream, JoinHandle<Result<(), RoutingError>>) {
        let (server, peer) = channel_stream(8);
        let svc = Arc::clone(svc);
        let handle = tokio::spawn(async move {
            let mut source = server.source;
            svc.connect(&mut source, Arc::new(server.sink)).await
        });
        (peer, handle)
    }

    async fn wait_for(registry: &SubscriptionRegistry, key: &str, present: bool) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while registry.contains_key(key) != present {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_send_reaches_destination() {
        let (svc, registry) = service();
        let (a, _a_task) = spawn_peer(&svc);
        let (mut b, _b_task) = spawn_peer(&svc);

        a.send(StreamMessage::connect("A")).await.unwrap();
        b.send(StreamMessage::connect("B")).await.unwrap();
        wait_for(&registry, "A", true).await;
        wait_for(&registry, "B", true).await;

        a.send(StreamMessage::send("A", "B", b"P".to_vec())).await.unwrap();
        let got = tokio::time::timeout(Duration::from_secs(1), b.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.data, b"P".to_vec());
        assert_eq!(got.from, "A");
    }

    #[tokio::test]
    async fn test_send_to_unknown_keeps_sender_open() {
        let (svc, registry) = service();
        let (mut a, a_task) = spawn_peer(&svc);

        a.send(StreamMessage::connect("A")).await.unwrap();
        a.send(StreamMessage::send("A", "nobody", vec![1])).await.unwrap();
        // Loop survives: a later send to self still arrives.
        a.send(StreamMessage::send("A", "A", vec![2])).await.unwrap();
        let got = tokio::time::timeout(Duration::from_secs(1), a.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.data, vec![2]);
        assert!(!a_task.is_finished());
        assert!(registry.contains_key("A"));
    }

    #[tokio::test]
    async fn test_disconnect_removes_entry_and_ends_loop() {
        let (svc, registry) = service();
        let (a, a_task) = spawn_peer(&svc);

        a.send(StreamMessage::connect("A")).await.unwrap();
        wait_for(&registry, "A", true).await;
        a.send(StreamMessage::disconnect("A")).await.unwrap();

        let result = tokio::time::timeout(Duration::from_secs(1), a_task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
        assert!(!registry.contains_key("A"));

        let err = svc.route(StreamMessage::send("B", "A", vec![])).await.unwrap_err();
        assert!(matches!(err, RoutingError::SubscribeNotFound(_)));
    }

    #[tokio::test]
    async fn test_eof_and_cancellation_are_clean() {
        let (svc, _) = service();
        let (a, a_task) = spawn_peer(&svc);
        drop(a);
        assert!(a_task.await.unwrap().is_ok());

        let (b, b_task) = spawn_peer(&svc);
        b.fail(StreamError::Cancelled).await.unwrap();
        assert!(b_task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let (svc, _) = service();
        let (a, a_task) = spawn_peer(&svc);
        a.fail(StreamError::Transport("reset by peer".into())).await.unwrap();
        let result = a_task.await.unwrap();
        assert!(matches!(result, Err(RoutingError::Transport(_))));
    }

    #[tokio::test]
    async fn test_write_failure_is_reported_to_caller_only() {
        let (svc, registry) = service();
        let (b, _b_task) = spawn_peer(&svc);
        b.send(StreamMessage::connect("B")).await.unwrap();
        wait_for(&registry, "B", true).await;

        // B's reader is gone but its entry is still registered.
        let PeerStream { outbound, inbound } = b;
        drop(inbound);

        let err = svc.route(StreamMessage::send("A", "B", vec![])).await.unwrap_err();
        assert!(matches!(err, RoutingError::WriteFailed { .. }));
        drop(outbound);
    }

    #[tokio::test]
    async fn test_unknown_code_is_skipped() {
        let (svc, registry) = service();
        let (a, _a_task) = spawn_peer(&svc);
        a.send(StreamMessage {
            code: 99,
            ..Default::default()
        })
        .await
        .unwrap();
        a.send(StreamMessage::connect("A")).await.unwrap();
        wait_for(&registry, "A", true).await;
    }

    #[tokio::test]
    async fn test_reconnect_replaces_entry() {
        let (svc, registry) = service();
        let (first, _first_task) = spawn_peer(&svc);
        let (mut second, _second_task) = spawn_peer(&svc);

        first.send(StreamMessage::connect("A")).await.unwrap();
        wait_for(&registry, "A", true).await;
        second.send(StreamMessage::connect("A")).await.unwrap();
        second.send(StreamMessage::send("A", "A", vec![9])).await.unwrap();

        let got = tokio::time::timeout(Duration::from_secs(1), second.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.data, vec![9]);
        assert_eq!(registry.len(), 1);
    }
}

//! # Subscription Registry
//!
//! Concurrent map from routing key to the live stream registered under it.
//! Backed by a lock-striped `DashMap`; every operation is a short critical
//! section on one shard and no guard escapes a call.
//!
//! Node streams are registered as `node:<key>`, message-bus endpoints under
//! their bare key.

use crate::signal::FinishedSignal;
use crate::stream::{StreamError, StreamSink};
use dashmap::DashMap;
use shared_types::StreamMessage;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("No subscription for key {0}")]
    NotFound(String),
}

/// Live stream registered under a routing key.
pub struct Subscription {
    sink: Arc<dyn StreamSink>,
    finished: FinishedSignal,
}

impl Subscription {
    #[must_use]
    pub fn new(sink: Arc<dyn StreamSink>, finished: FinishedSignal) -> Self {
        Self { sink, finished }
    }

    /// Write an envelope onto the registered stream.
    pub async fn deliver(&self, msg: StreamMessage) -> Result<(), StreamError> {
        self.sink.send(msg).await
    }

    /// Non-blocking finished signal. Returns `false` if nobody was waiting.
    pub fn finish(&self) -> bool {
        self.finished.notify()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sink.is_closed()
    }
}

#[derive(Default)]
pub struct SubscriptionRegistry {
    entries: DashMap<String, Arc<Subscription>>,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or replace the entry for `key`. The replaced entry is returned
    /// but its stream is left alone.
    pub fn set(&self, key: impl Into<String>, subscription: Subscription) -> Option<Arc<Subscription>> {
        let key = key.into();
        let replaced = self.entries.insert(key.clone(), Arc::new(subscription));
        debug!(key = %key, replaced = replaced.is_some(), "registry: set");
        replaced
    }

    pub fn get(&self, key: &str) -> Result<Arc<Subscription>, RegistryError> {
        self.entries
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| RegistryError::NotFound(key.to_string()))
    }

    /// Remove the entry for `key`. Absent keys are a no-op.
    pub fn delete(&self, key: &str) -> Option<Arc<Subscription>> {
        let removed = self.entries.remove(key).map(|(_, sub)| sub);
        debug!(key = %key, removed = removed.is_some(), "registry: delete");
        removed
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

/// Registry key of a node's control stream.
#[must_use]
pub fn node_key(key: &str) -> String {
    format!("node:{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::finished_signal;
    use crate::stream::ChannelSink;
    use proptest::prelude::*;
    use tokio::sync::mpsc;

    fn subscription() -> (Subscription, mpsc::Receiver<StreamMessage>) {
        let (tx, rx) = mpsc::channel(8);
        let (signal, _listener) = finished_signal();
        (Subscription::new(Arc::new(ChannelSink::new(tx)), signal), rx)
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let registry = SubscriptionRegistry::new();
        assert_eq!(
            registry.get("A").err(),
            Some(RegistryError::NotFound("A".into()))
        );
    }

    #[tokio::test]
    async fn test_set_replaces_entry() {
        let registry = SubscriptionRegistry::new();
        let (first, mut first_rx) = subscription();
        let (second, mut second_rx) = subscription();

        assert!(registry.set("A", first).is_none());
        let replaced = registry.set("A", second);
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);

        registry
            .get("A")
            .unwrap()
            .deliver(StreamMessage::send("B", "A", vec![1]))
            .await
            .unwrap();
        assert_eq!(second_rx.recv().await.unwrap().data, vec![1]);
        assert!(first_rx.try_recv().is_err());

        // The replaced stream is still usable by whoever holds it.
        assert!(!replaced.unwrap().is_closed());
    }

    #[test]
    fn test_node_key_prefix() {
        assert_eq!(node_key("w1"), "node:w1");
    }

    #[tokio::test]
    async fn test_concurrent_set_get_delete() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                let key = format!("k{i}");
                let (sub, _rx) = subscription();
                registry.set(key.clone(), sub);
                assert!(registry.get(&key).is_ok());
                if i % 2 == 0 {
                    registry.delete(&key);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(registry.len(), 16);
    }

    proptest! {
        #[test]
        fn prop_read_your_write(keys in proptest::collection::vec("[a-z]{1,8}", 1..32)) {
            let registry = SubscriptionRegistry::new();
            for key in &keys {
                let (sub, _rx) = subscription();
                registry.set(key.clone(), sub);
                prop_assert!(registry.get(key).is_ok());
            }
        }

        #[test]
        fn prop_delete_is_idempotent(key in "[a-z]{1,8}") {
            let registry = SubscriptionRegistry::new();
            let (sub, _rx) = subscription();
            registry.set(key.clone(), sub);

            prop_assert!(registry.delete(&key).is_some());
            prop_assert_eq!(registry.get(&key).err(), Some(RegistryError::NotFound(key.clone())));
            prop_assert!(registry.delete(&key).is_none());
            prop_assert!(registry.is_empty());
        }
    }
}

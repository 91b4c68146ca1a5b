//! Cross-subsystem integration flows.
//!
//! Every test builds a full [`master_runtime::SubsystemContainer`] and drives
//! it through the same service objects the transport uses.

pub mod delegate;
pub mod message_routing;
pub mod node_lifecycle;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::DateTime;
    use master_runtime::{RuntimeConfig, SubsystemContainer};
    use shared_bus::SubscriptionRegistry;
    use shared_store::InMemoryModelStore;
    use std::sync::Arc;
    use std::time::Duration;
    use tc_01_node_coordination::ManualTimeSource;

    pub fn container() -> Arc<SubsystemContainer> {
        Arc::new(SubsystemContainer::new(RuntimeConfig::default()))
    }

    /// Container whose node clock only moves when told to.
    pub fn container_with_clock() -> (Arc<SubsystemContainer>, Arc<ManualTimeSource>) {
        let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default();
        let clock = Arc::new(ManualTimeSource::new(start));
        let container = SubsystemContainer::with_store(
            RuntimeConfig::default(),
            Arc::new(InMemoryModelStore::new()),
            clock.clone(),
        );
        (Arc::new(container), clock)
    }

    pub async fn wait_for_key(registry: &SubscriptionRegistry, key: &str, present: bool) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while registry.contains_key(key) != present {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("registry did not reach expected state");
    }
}

//! # Node Lifecycle Flows
//!
//! Register → heartbeat → subscribe → unsubscribe → monitor timeout, driven
//! through a wired container so directory, registry and store interact.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use shared_bus::channel_stream;
    use shared_store::{ModelStore, Query};
    use shared_types::{ErrorCode, ErrorCoded, ModelKind, NodeInfo, NodeStatus, Request};
    use tc_01_node_coordination::{CoordinationError, NodeCoordinationApi};

    use crate::integration::fixtures::{container, container_with_clock, wait_for_key};

    fn info(key: &str) -> NodeInfo {
        NodeInfo {
            key: key.into(),
            ..Default::default()
        }
    }

    // =========================================================================
    // REGISTER / HEARTBEAT
    // =========================================================================

    #[tokio::test]
    async fn test_register_twice_then_heartbeat() {
        let c = container();

        let first = c.coordination.register("", info("w1")).await.unwrap();
        assert_eq!(first.key, "w1");
        assert_eq!(first.status, NodeStatus::Registered);
        assert!(first.active);

        let second = c
            .coordination
            .register(
                "",
                NodeInfo {
                    name: "irrelevant".into(),
                    ..info("w1")
                },
            )
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.status, NodeStatus::Registered);

        let nodes = c
            .store
            .get_list(ModelKind::Node, &Query::new().eq("key", "w1"), Default::default())
            .await
            .unwrap();
        assert_eq!(nodes.len(), 1);

        let online = c.coordination.heartbeat("w1").await.unwrap();
        assert_eq!(online.status, NodeStatus::Online);

        let err = c.coordination.heartbeat("unknown").await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NodeNotFound);
    }

    #[tokio::test]
    async fn test_master_registration_always_refused() {
        let c = container();
        let runtime = master_runtime::MasterRuntime::with_container(Arc::clone(&c));
        runtime.bootstrap_master().await.unwrap();

        // Flagged as master.
        let err = c
            .coordination
            .register(
                "",
                NodeInfo {
                    is_master: true,
                    ..info("w9")
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NotAllowed);

        // Existing master record under the same key.
        let err = c.coordination.register("master", NodeInfo::default()).await.unwrap_err();
        assert!(matches!(err, CoordinationError::NotAllowed(_)));

        let master = c.directory.get_node_by_key("master").await.unwrap().unwrap();
        assert_eq!(master.status, NodeStatus::Online);
    }

    #[tokio::test]
    async fn test_heartbeat_on_unregistered_node() {
        let c = container();
        c.directory
            .add(shared_types::Node {
                key: "w2".into(),
                status: NodeStatus::Unregistered,
                ..Default::default()
            })
            .await
            .unwrap();

        let err = c.coordination.heartbeat("w2").await.unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::NodeUnregistered);
    }

    // =========================================================================
    // MONITOR
    // =========================================================================

    #[tokio::test]
    async fn test_silent_node_goes_offline_and_recovers() {
        let (c, clock) = container_with_clock();
        c.coordination.register("w1", NodeInfo::default()).await.unwrap();
        c.coordination.register("w2", NodeInfo::default()).await.unwrap();
        c.coordination.heartbeat("w1").await.unwrap();
        c.coordination.heartbeat("w2").await.unwrap();

        clock.advance(chrono::Duration::seconds(45));
        c.coordination.heartbeat("w2").await.unwrap();
        clock.advance(chrono::Duration::seconds(30));

        let marked = c.monitor().sweep().await.unwrap();
        assert_eq!(marked, vec!["w1".to_string()]);

        let w1 = c.directory.get_node_by_key("w1").await.unwrap().unwrap();
        assert_eq!(w1.status, NodeStatus::Offline);
        assert!(!w1.active);

        let back = c.coordination.heartbeat("w1").await.unwrap();
        assert_eq!(back.status, NodeStatus::Online);
    }

    // =========================================================================
    // SUBSCRIBE / UNSUBSCRIBE
    // =========================================================================

    #[tokio::test]
    async fn test_subscribe_until_unsubscribed() {
        let c = container();
        c.coordination.register("w1", NodeInfo::default()).await.unwrap();

        let (server, _peer) = channel_stream(8);
        let handle = {
            let c = Arc::clone(&c);
            tokio::spawn(async move { c.coordination.subscribe("w1", Arc::new(server.sink)).await })
        };
        wait_for_key(&c.registry, "node:w1", true).await;

        let response = c
            .coordination_handler
            .handle_unsubscribe(&Request::new("w1", vec![]));
        assert!(response.is_ok());
        assert_eq!(response.message, "unsubscribed successfully");

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(!c.registry.contains_key("node:w1"));

        // Second unsubscribe has nothing to release.
        let err = c.coordination.unsubscribe("w1").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::SubscribeNotFound);
    }

    #[tokio::test]
    async fn test_subscribe_ends_when_node_disconnects() {
        let c = container();
        let (server, peer) = channel_stream(8);
        let handle = {
            let c = Arc::clone(&c);
            tokio::spawn(async move { c.coordination.subscribe("w3", Arc::new(server.sink)).await })
        };
        wait_for_key(&c.registry, "node:w3", true).await;

        drop(peer);
        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}

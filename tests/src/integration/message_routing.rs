//! # Message Routing Flows
//!
//! Peers connect duplex streams to the routing service and exchange
//! envelopes by key. Node control streams registered by the coordination
//! service share the same registry and are reachable as `node:<key>`.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use master_runtime::SubsystemContainer;
    use shared_bus::{channel_stream, PeerStream};
    use shared_types::{NodeInfo, StreamMessage};
    use tc_01_node_coordination::NodeCoordinationApi;
    use tc_02_message_routing::{MessageRoutingApi, RoutingError};
    use tokio::task::JoinHandle;

    use crate::integration::fixtures::{container, wait_for_key};

    fn connect(c: &Arc<SubsystemContainer>) -> (PeerStream, JoinHandle<Result<(), RoutingError>>) {
        let (server, peer) = channel_stream(16);
        let c = Arc::clone(c);
        let handle = tokio::spawn(async move {
            let mut source = server.source;
            c.routing.connect(&mut source, Arc::new(server.sink)).await
        });
        (peer, handle)
    }

    async fn recv(peer: &mut PeerStream) -> StreamMessage {
        tokio::time::timeout(Duration::from_secs(1), peer.recv())
            .await
            .expect("no envelope delivered")
            .expect("stream closed")
    }

    #[tokio::test]
    async fn test_connect_send_disconnect() {
        let c = container();
        let (a, a_task) = connect(&c);
        let (mut b, _b_task) = connect(&c);

        a.send(StreamMessage::connect("A")).await.unwrap();
        b.send(StreamMessage::connect("B")).await.unwrap();
        wait_for_key(&c.registry, "A", true).await;
        wait_for_key(&c.registry, "B", true).await;

        a.send(StreamMessage::send("A", "B", b"P".to_vec())).await.unwrap();
        let got = recv(&mut b).await;
        assert_eq!(got.data, b"P".to_vec());

        a.send(StreamMessage::disconnect("A")).await.unwrap();
        tokio::time::timeout(Duration::from_secs(1), a_task)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(!c.registry.contains_key("A"));

        let err = c
            .routing
            .route(StreamMessage::send("B", "A", b"late".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::SubscribeNotFound(key) if key == "A"));
    }

    #[tokio::test]
    async fn test_failed_send_keeps_sender_usable() {
        let c = container();
        let (mut a, a_task) = connect(&c);
        let (mut b, _b_task) = connect(&c);

        a.send(StreamMessage::connect("A")).await.unwrap();
        b.send(StreamMessage::connect("B")).await.unwrap();
        wait_for_key(&c.registry, "B", true).await;

        a.send(StreamMessage::send("A", "nobody", vec![1])).await.unwrap();
        a.send(StreamMessage::send("A", "B", vec![2])).await.unwrap();
        assert_eq!(recv(&mut b).await.data, vec![2]);

        b.send(StreamMessage::send("B", "A", vec![3])).await.unwrap();
        assert_eq!(recv(&mut a).await.data, vec![3]);
        assert!(!a_task.is_finished());
    }

    #[tokio::test]
    async fn test_send_reaches_node_control_stream() {
        let c = container();
        c.coordination.register("w1", NodeInfo::default()).await.unwrap();

        let (node_server, mut node_peer) = channel_stream(8);
        let _subscription = {
            let c = Arc::clone(&c);
            tokio::spawn(async move { c.coordination.subscribe("w1", Arc::new(node_server.sink)).await })
        };
        wait_for_key(&c.registry, "node:w1", true).await;

        let (scheduler, _task) = connect(&c);
        scheduler.send(StreamMessage::connect("scheduler")).await.unwrap();
        scheduler
            .send(StreamMessage::send("scheduler", "node:w1", b"run task".to_vec()))
            .await
            .unwrap();

        let got = recv(&mut node_peer).await;
        assert_eq!(got.from, "scheduler");
        assert_eq!(got.data, b"run task".to_vec());
    }

    #[tokio::test]
    async fn test_many_senders_one_destination() {
        let c = container();
        let (mut sink_peer, _sink_task) = connect(&c);
        sink_peer.send(StreamMessage::connect("collector")).await.unwrap();
        wait_for_key(&c.registry, "collector", true).await;

        let mut senders = Vec::new();
        for i in 0..4u8 {
            let (peer, task) = connect(&c);
            let from = format!("s{i}");
            peer.send(StreamMessage::connect(from.clone())).await.unwrap();
            for n in 0..5u8 {
                peer.send(StreamMessage::send(from.clone(), "collector", vec![i, n]))
                    .await
                    .unwrap();
            }
            senders.push((peer, task));
        }

        let mut per_sender = vec![Vec::new(); 4];
        for _ in 0..20 {
            let msg = recv(&mut sink_peer).await;
            per_sender[msg.data[0] as usize].push(msg.data[1]);
        }
        // Per-stream order survives interleaving across streams.
        for received in per_sender {
            assert_eq!(received, vec![0, 1, 2, 3, 4]);
        }
    }
}

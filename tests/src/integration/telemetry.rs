//! # Task Telemetry Flows
//!
//! Workers stream result rows and log lines for running tasks; the master
//! buffers them and keeps the task's stat counters current.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::{json, Map, Value};
    use shared_bus::channel_stream;
    use shared_store::ModelStore;
    use shared_types::{
        FieldValue, Model, ModelKind, ObjectId, StreamMessage, StreamMessageCode, StreamTaskData,
        TaskStat,
    };
    use tc_04_task_telemetry::TaskTelemetryApi;

    use crate::integration::fixtures::container;

    fn row(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn test_malformed_tid_forwarded_as_is() {
        let c = container();
        let task_id = ObjectId::new();
        c.store
            .add(Model::from(TaskStat {
                id: Some(task_id),
                ..Default::default()
            }))
            .await
            .unwrap();

        let (server, peer) = channel_stream(8);
        let handle = {
            let c = Arc::clone(&c);
            tokio::spawn(async move {
                let mut source = server.source;
                c.telemetry.subscribe(&mut source).await
            })
        };

        let batch = StreamTaskData {
            task_id,
            records: vec![
                row(json!({"_tid": "zz-not-hex", "title": "first"})),
                row(json!({"_tid": task_id.to_hex(), "title": "second"})),
            ],
            logs: vec![],
        };
        peer.send(StreamMessage::insert_data("w1", &batch).unwrap())
            .await
            .unwrap();
        let logs = StreamTaskData {
            task_id,
            logs: vec!["fetching".into(), "parsed 2 items".into()],
            ..Default::default()
        };
        peer.send(StreamMessage::insert_logs("w1", &logs).unwrap())
            .await
            .unwrap();
        drop(peer);

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());

        let records = c.task_stats.records(task_id);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("_tid"), Some(&FieldValue::Json(json!("zz-not-hex"))));
        assert_eq!(records[1].get("_tid"), Some(&FieldValue::ObjectId(task_id)));
        assert_eq!(c.task_stats.logs(task_id).len(), 2);

        let stat = TaskStat::try_from(c.store.get_by_id(ModelKind::TaskStat, task_id).await.unwrap()).unwrap();
        assert_eq!(stat.result_count, 2);
        assert_eq!(stat.log_count, 2);
    }

    #[tokio::test]
    async fn test_bad_envelopes_do_not_end_stream() {
        let c = container();
        let task_id = ObjectId::new();
        let (server, peer) = channel_stream(8);
        let handle = {
            let c = Arc::clone(&c);
            tokio::spawn(async move {
                let mut source = server.source;
                c.telemetry.subscribe(&mut source).await
            })
        };

        // Empty task id, undecodable payload, unknown code.
        peer.send(StreamMessage::insert_logs("w1", &StreamTaskData::default()).unwrap())
            .await
            .unwrap();
        peer.send(StreamMessage {
            code: StreamMessageCode::InsertLogs as i32,
            data: b"not json".to_vec(),
            ..Default::default()
        })
        .await
        .unwrap();
        peer.send(StreamMessage {
            code: 77,
            ..Default::default()
        })
        .await
        .unwrap();

        let good = StreamTaskData {
            task_id,
            logs: vec!["still here".into()],
            ..Default::default()
        };
        peer.send(StreamMessage::insert_logs("w1", &good).unwrap())
            .await
            .unwrap();
        drop(peer);

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
        assert_eq!(c.task_stats.logs(task_id), vec!["still here".to_string()]);
    }
}

//! # Task-Cluster Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | shared-bus | registry set/get under contention-free access |
//! | shared-types | stream envelope encode/decode |
//! | tc-03 | delegate `Add` through handler and in-memory store |
//! | tc-04 | `_tid` normalization of a result batch |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use shared_bus::{channel_stream, finished_signal, Subscription, SubscriptionRegistry};
use shared_store::InMemoryModelStore;
use shared_types::{
    DelegateMessage, DelegateMethod, Model, ObjectId, Request, ResultRecord, StreamMessage, Tag,
};
use std::sync::Arc;
use tc_03_model_delegate::{ModelDelegateHandler, ModelDelegateService};
use tc_04_task_telemetry::normalize_record;

fn bench_registry(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-bus-registry");

    for size in [16usize, 1024] {
        let registry = SubscriptionRegistry::new();
        let mut streams = Vec::with_capacity(size);
        for i in 0..size {
            let (server, peer) = channel_stream(1);
            let (finished, _) = finished_signal();
            registry.set(format!("node:{i}"), Subscription::new(Arc::new(server.sink), finished));
            streams.push(peer);
        }

        group.bench_with_input(BenchmarkId::new("get", size), &size, |b, &size| {
            let key = format!("node:{}", size / 2);
            b.iter(|| black_box(registry.get(&key).is_ok()));
        });
    }
    group.finish();
}

fn bench_envelope_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream-envelope");
    let msg = StreamMessage::send("scheduler", "node:w1", vec![7u8; 1024]);
    let bytes = msg.to_bytes().unwrap_or_default();
    group.throughput(Throughput::Bytes(bytes.len() as u64));

    group.bench_function("encode", |b| b.iter(|| black_box(msg.to_bytes())));
    group.bench_function("decode", |b| b.iter(|| black_box(StreamMessage::from_bytes(&bytes))));
    group.finish();
}

fn bench_delegate_add(c: &mut Criterion) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(_) => return,
    };
    let handler = ModelDelegateHandler::new(Arc::new(ModelDelegateService::new(Arc::new(
        InMemoryModelStore::new(),
    ))));

    c.bench_function("tc-03-delegate-add", |b| {
        b.to_async(&runtime).iter(|| async {
            let model = Model::from(Tag {
                name: "bench".into(),
                ..Default::default()
            });
            let Ok(msg) = DelegateMessage::new(DelegateMethod::Add, &model) else {
                return;
            };
            let Ok(data) = msg.to_bytes() else {
                return;
            };
            black_box(handler.do_request(&Request::new("w1", data)).await);
        });
    });
}

fn bench_normalize(c: &mut Criterion) {
    let id = ObjectId::new().to_hex();
    let batch: Vec<_> = (0..100)
        .map(|i| match json!({"_tid": id, "rank": i}) {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        })
        .collect();

    let mut group = c.benchmark_group("tc-04-normalize");
    group.throughput(Throughput::Elements(batch.len() as u64));
    group.bench_function("batch-100", |b| {
        b.iter(|| {
            for row in &batch {
                let mut record = ResultRecord::from_json(row.clone());
                black_box(normalize_record(&mut record, "_tid"));
            }
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_registry,
    bench_envelope_codec,
    bench_delegate_add,
    bench_normalize
);
criterion_main!(benches);

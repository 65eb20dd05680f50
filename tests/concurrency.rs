#![allow(clippy::unwrap_used, clippy::expect_used)]

use passdb_codec::utils::metrics::Metrics;
use passdb_codec::{Record, RecordCodec, SchemaVersion};
use std::sync::Arc;

fn account(version: SchemaVersion, i: usize) -> Record {
    let mut record = Record::new(version.schema());
    record.set("username", format!("user{i}")).unwrap();
    record.set("user_rid", 1000 + i as u32).unwrap();
    record.set("nt_pw", format!("{:032X}", i)).unwrap();
    record.set("hours", vec![(i & 0xFF) as u8; i % 32]).unwrap();
    record
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_encode_decode_heavy() {
    use tokio::task::JoinSet;

    let iterations = 5_000usize;
    let metrics = Arc::new(Metrics::new());
    let codec = Arc::new(RecordCodec::default().with_metrics(metrics.clone()));

    let mut tasks = JoinSet::new();
    for version in SchemaVersion::ALL {
        let codec = codec.clone();
        tasks.spawn(async move {
            for i in 0..iterations {
                let record = account(version, i);
                let bytes = codec.encode(&record).unwrap();
                let decoded = codec.decode(version.schema(), &bytes).unwrap();
                assert_eq!(decoded, record);
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }

    let snap = metrics.snapshot();
    let total = (iterations * SchemaVersion::ALL.len()) as u64;
    assert_eq!(snap.records_encoded, total);
    assert_eq!(snap.records_decoded, total);
    assert_eq!(snap.bytes_encoded, snap.bytes_decoded);
    assert_eq!(snap.decode_errors, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_decode_shared_buffer() {
    let record = account(SchemaVersion::V3, 42);
    let bytes = record.encode().unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let bytes = bytes.clone();
        let expected = record.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            for _ in 0..1_000 {
                let decoded = Record::decode(SchemaVersion::V3.schema(), &bytes).unwrap();
                assert_eq!(decoded, expected);
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_errors_are_counted() {
    let metrics = Arc::new(Metrics::new());
    let codec = Arc::new(RecordCodec::default().with_metrics(metrics.clone()));
    let truncated = account(SchemaVersion::V1, 7).encode().unwrap().slice(..10);

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let codec = codec.clone();
        let truncated = truncated.clone();
        tasks.spawn(async move {
            for _ in 0..100 {
                assert!(codec.decode(SchemaVersion::V1.schema(), &truncated).is_err());
            }
        });
    }
    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }

    assert_eq!(metrics.snapshot().decode_errors, 800);
    assert_eq!(metrics.snapshot().records_decoded, 0);
}

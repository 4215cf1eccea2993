//! Create/update reconciliation specs
//!
//! Live writes through the reconciler: lifecycle timestamps, search
//! visibility and per-key serialization.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn first_write_creates_record_with_equal_timestamps() {
    let h = Harness::new();
    let t1 = h.clock.now_ms();

    h.reconciler
        .apply(Record::new("a", "t", "hello"), WriteMode::Live)
        .await
        .unwrap();

    assert_eq!(
        h.store.memory().snapshot(),
        vec![Record::new("a", "t", "hello").with_timestamps(t1, t1)]
    );
    let hits = h.index.search("t", "hello", 10, 0).await.unwrap();
    assert_eq!(hits, vec![RecordKey::new("a", "t")]);
}

#[tokio::test]
async fn second_write_updates_content_and_keeps_creation_time() {
    let h = Harness::new();
    let t1 = h.clock.now_ms();
    h.reconciler
        .apply(Record::new("a", "t", "hello"), WriteMode::Live)
        .await
        .unwrap();

    h.clock.advance(Duration::from_millis(40));
    let t2 = h.clock.now_ms();
    h.reconciler
        .apply(Record::new("a", "t", "world"), WriteMode::Live)
        .await
        .unwrap();

    assert_eq!(
        h.store.memory().snapshot(),
        vec![Record::new("a", "t", "world").with_timestamps(t1, t2)]
    );
    assert!(t2 > t1);
}

#[tokio::test]
async fn search_matches_substrings_within_one_topic() {
    let h = Harness::new();
    h.reconciler
        .apply(Record::new("a", "t", "hello"), WriteMode::Live)
        .await
        .unwrap();

    let hits = h.index.search("t", "hell", 10, 0).await.unwrap();
    let elsewhere = h.index.search("other", "hell", 10, 0).await.unwrap();

    assert_eq!(hits, vec![RecordKey::new("a", "t")]);
    assert!(elsewhere.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writes_to_one_key_leave_exactly_one_record() {
    let h = Harness::new();
    h.store.set_latency(Duration::from_millis(3));

    let mut tasks = Vec::new();
    for i in 0..8 {
        let reconciler = h.reconciler.clone();
        tasks.push(tokio::spawn(async move {
            reconciler
                .apply(Record::new("b", "t", format!("writer-{i}")), WriteMode::Live)
                .await
                .unwrap()
        }));
    }
    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.unwrap());
    }

    let created = outcomes
        .iter()
        .filter(|o| matches!(o, ApplyOutcome::Created(_)))
        .count();
    assert_eq!(created, 1);

    let snapshot = h.store.memory().snapshot();
    assert_eq!(snapshot.len(), 1);
    let latest = outcomes
        .iter()
        .filter_map(|o| o.record())
        .max_by_key(|r| r.updated_at)
        .unwrap();
    assert_eq!(&snapshot[0], latest);

    // Every writer saw the same creation time
    let created_at: Vec<i64> = outcomes
        .iter()
        .filter_map(|o| o.record())
        .map(|r| r.created_at)
        .collect();
    assert!(created_at.iter().all(|c| *c == created_at[0]));
}

#[tokio::test]
async fn one_record_per_composite_key_after_many_writes() {
    let h = Harness::new();
    for round in 0..3 {
        for key in ["a", "b"] {
            for topic in ["t", "u"] {
                h.clock.advance(Duration::from_millis(1));
                h.reconciler
                    .apply(Record::new(key, topic, format!("r{round}")), WriteMode::Live)
                    .await
                    .unwrap();
            }
        }
    }

    let ids: Vec<String> = h
        .store
        .memory()
        .snapshot()
        .iter()
        .map(|r| r.id().to_string())
        .collect();
    assert_eq!(ids, vec!["t/a", "t/b", "u/a", "u/b"]);
}

//! Replay specs
//!
//! The log written by live traffic rebuilds the same store when replayed,
//! tolerating corrupt lines and repeated replays.

use crate::prelude::*;
use crate::prelude::assert_eq;

#[tokio::test]
async fn live_log_rebuilds_identical_store() {
    let h = Harness::new();
    let (service, appender) = h.service();
    service.add("a", "t", "hello").await.unwrap();
    h.clock.advance(Duration::from_millis(10));
    service.add("b", "", "in default").await.unwrap();
    h.clock.advance(Duration::from_millis(10));
    service.add("a", "t", "world").await.unwrap();
    appender.close().await;

    let rebuilt = fresh_reconciler();
    let report = h.replay_into(&rebuilt).await;

    assert_eq!(report.applied, 3);
    assert_eq!(report.failed, 0);
    assert_eq!(
        rebuilt.store().memory().snapshot(),
        h.store.memory().snapshot()
    );
    let hits = rebuilt.index().search("t", "world", 10, 0).await.unwrap();
    assert_eq!(hits, vec![RecordKey::new("a", "t")]);
}

#[tokio::test]
async fn replaying_twice_matches_replaying_once() {
    let h = Harness::new();
    h.write_log(&[
        line("a", "t", "v1", 100, 100),
        line("b", "t", "x", 110, 110),
        line("a", "t", "v2", 100, 150),
        line("a", "t", "v3", 100, 175),
    ]);

    let once = fresh_reconciler();
    h.replay_into(&once).await;

    let twice = fresh_reconciler();
    h.replay_into(&twice).await;
    h.replay_into(&twice).await;

    assert_eq!(
        once.store().memory().snapshot(),
        twice.store().memory().snapshot()
    );
}

#[tokio::test]
async fn one_corrupt_line_among_many_is_skipped() {
    let h = Harness::new();
    let mut lines: Vec<String> = (0..9)
        .map(|i| line(&format!("k{i}"), "t", "x", 1, 1))
        .collect();
    lines.insert(4, "this line is not an entry".to_string());
    h.write_log(&lines);

    let target = fresh_reconciler();
    let report = h.replay_into(&target).await;

    assert_eq!(report.applied, 9);
    assert_eq!(report.failed, 1);
    assert_eq!(target.store().memory().len(), 9);
}

#[tokio::test]
async fn replay_preserves_logged_timestamps() {
    let h = Harness::new();
    h.write_log(&[line("a", "t", "v1", 1_000, 1_000), line("a", "t", "v2", 1_000, 2_000)]);

    let target = fresh_reconciler();
    h.replay_into(&target).await;

    assert_eq!(
        target.store().memory().snapshot(),
        vec![Record::new("a", "t", "v2").with_timestamps(1_000, 2_000)]
    );
}

#[tokio::test]
async fn lines_logged_out_of_order_keep_the_newest_state() {
    let h = Harness::new();
    h.write_log(&[line("a", "t", "newer", 1_000, 3_000), line("a", "t", "older", 1_000, 2_000)]);

    let target = fresh_reconciler();
    let report = h.replay_into(&target).await;

    assert_eq!(report.skipped, 1);
    assert_eq!(target.store().memory().snapshot()[0].content, "newer");
}

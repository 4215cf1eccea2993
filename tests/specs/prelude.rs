//! Shared harness for behavioral specs

#![allow(dead_code)]

pub use rk_adapters::{FakeIndex, FakeStore, Index, Store};
pub use rk_core::{decode, encode, Clock, FakeClock, Record, RecordKey};
pub use rk_engine::{
    ApplyOutcome, Reconciler, RecordService, ReplayConfig, ReplayEngine, ReplayReport, WriteMode,
};
pub use rk_storage::{LogAppender, LogReader};
pub use similar_asserts::assert_eq;
pub use std::sync::Arc;
pub use std::time::Duration;

use std::path::PathBuf;
use tempfile::TempDir;

pub type TestReconciler = Reconciler<FakeStore, FakeIndex, FakeClock>;

/// Fresh store, index and clock, plus a scratch directory for the log
pub struct Harness {
    pub store: FakeStore,
    pub index: FakeIndex,
    pub clock: FakeClock,
    pub reconciler: TestReconciler,
    dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let store = FakeStore::new();
        let index = FakeIndex::new();
        let clock = FakeClock::new();
        Self {
            reconciler: Reconciler::new(store.clone(), index.clone(), clock.clone()),
            store,
            index,
            clock,
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("store.log")
    }

    /// Record service writing to this harness's log
    pub fn service(&self) -> (RecordService<FakeStore, FakeIndex, FakeClock>, Arc<LogAppender>) {
        let appender = Arc::new(LogAppender::open(&self.log_path(), 64).unwrap());
        let service = RecordService::new(self.reconciler.clone(), Arc::clone(&appender));
        (service, appender)
    }

    /// Overwrite the log with raw lines
    pub fn write_log(&self, lines: &[String]) {
        let mut body = lines.join("\n");
        body.push('\n');
        std::fs::write(self.log_path(), body).unwrap();
    }

    /// Replay this harness's log into `target`
    pub async fn replay_into(&self, target: &TestReconciler) -> ReplayReport {
        ReplayEngine::new(ReplayConfig::default())
            .replay(&LogReader::new(&self.log_path()), target)
            .await
            .unwrap()
    }
}

/// An empty store/index pair on its own clock
pub fn fresh_reconciler() -> TestReconciler {
    Reconciler::new(FakeStore::new(), FakeIndex::new(), FakeClock::new())
}

/// Encode a record with explicit timestamps as one log line
pub fn line(key: &str, topic: &str, content: &str, created: i64, updated: i64) -> String {
    encode(&Record::new(key, topic, content).with_timestamps(created, updated)).unwrap()
}

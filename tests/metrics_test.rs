//! Tests for metrics integration.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use casebook::cache::{CacheEntry, CachePolicy};
use casebook::providers::{RetryConfig, TextGenerator};
use casebook::telemetry;
use casebook::{CaseGateway, CaseRequestOptions, Casebook, Result};

const CASE_JSON: &str = r#"{
  "id": "301",
  "title": "The Case of the Robot Toast",
  "backstory": "Ana wanted a wedding toast.",
  "faultyPrompt": "Write a toast.",
  "faultyOutput": "BEEP. CONGRATULATIONS ON YOUR UNION.",
  "botchedElement": "style",
  "botchedExplanation": "No style was given.",
  "idealPrompt": "Write a warm, funny wedding toast."
}"#;

// ============================================================================
// Mock generators
// ============================================================================

/// Returns garbage on the first call, then a valid case.
struct FlakyGenerator {
    calls: AtomicU32,
}

#[async_trait]
impl TextGenerator for FlakyGenerator {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn generate(&self, _model: &str, _prompt: &str) -> Result<String> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok("no json here".to_string())
        } else {
            Ok(CASE_JSON.to_string())
        }
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Sum counter values for `name` carrying `label=value`.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.kind() == MetricKind::Counter
                && key.key().name() == name
                && key
                    .key()
                    .labels()
                    .any(|l| l.key() == label && l.value() == value)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

/// Runs async code within a local recorder scope on the multi-thread runtime.
///
/// `block_in_place` ensures the sync `with_local_recorder` closure stays
/// on the current thread while `block_on` drives the inner async work.
#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn hits_and_misses_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let casebook = Casebook::builder().mock(true).build().unwrap();
                for _ in 0..3 {
                    casebook
                        .generate_case(Some("s1"), CaseRequestOptions::default())
                        .await
                        .unwrap();
                }
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::CACHE_MISSES_TOTAL), 1);
    assert_eq!(counter_total(&snapshot, telemetry::CACHE_HITS_TOTAL), 2);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::GENERATIONS_TOTAL, "source", "mock"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::GENERATIONS_TOTAL, "source", "live"),
        0
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn live_generation_records_retries_and_duration() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let casebook = Casebook::builder()
                    .generator(Arc::new(FlakyGenerator {
                        calls: AtomicU32::new(0),
                    }))
                    .retry(RetryConfig::new().delay(Duration::from_millis(1)))
                    .build()
                    .unwrap();
                casebook
                    .generate_case(Some("s1"), CaseRequestOptions::default())
                    .await
                    .unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::RETRIES_TOTAL, "reason", "malformed"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::GENERATIONS_TOTAL, "artifact", "case"),
        1
    );
    assert!(
        has_histogram(&snapshot, telemetry::GENERATION_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 1)]
async fn sweep_records_evictions() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async {
                let casebook = Casebook::builder()
                    .mock(true)
                    .cache_policy(CachePolicy::new().sweep_every(1))
                    .build()
                    .unwrap();
                let case = casebook::convert::parse_case(CASE_JSON).unwrap();
                let long_ago = Utc::now() - chrono::Duration::hours(2);
                casebook.sessions().put("idle", CacheEntry::new(case, long_ago));

                casebook
                    .generate_case(Some("s1"), CaseRequestOptions::default())
                    .await
                    .unwrap();
            })
        })
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(counter_total(&snapshot, telemetry::SWEEPS_TOTAL), 1);
    assert_eq!(
        counter_with_label(&snapshot, telemetry::EVICTIONS_TOTAL, "store", "session"),
        1
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::EVICTIONS_TOTAL, "store", "session_slot"),
        1
    );
}

#[tokio::test]
async fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let casebook = Casebook::builder().mock(true).build().unwrap();
    casebook
        .generate_case(None, CaseRequestOptions::default())
        .await
        .unwrap();
}

//! End-to-end scheduler behavior against the wall clock.
//!
//! These tests verify the pull-driven sampling cycle:
//! start → idle suppression → pull → refresh resumes → idle again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use statsview_core::{
    Config, RuntimeStats, StatsError, StatsManager, StatsProbe, Viewer, viewers::HeapViewer,
};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct CountingProbe {
    calls: AtomicU64,
}

impl StatsProbe for CountingProbe {
    fn sample(&self) -> Result<RuntimeStats, StatsError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(RuntimeStats {
            heap_bytes: n * 1024 * 1024,
            ..RuntimeStats::default()
        })
    }
}

fn generation(m: &StatsManager) -> u64 {
    m.snapshot().generation
}

/// Bound on pull-to-refresh latency: one interval plus scheduling slack.
const REFRESH_BOUND: Duration = Duration::from_millis(100 + 25);

/// Time from now until the generation moves past `after`, if within `limit`.
async fn time_to_refresh(m: &StatsManager, after: u64, limit: Duration) -> Option<Duration> {
    let started = Instant::now();
    while started.elapsed() <= limit {
        if generation(m) > after {
            return Some(started.elapsed());
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    None
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pulls_drive_sampling_at_100ms() {
    let config = Config::default().with_interval(Duration::from_millis(100));
    let probe = Arc::new(CountingProbe::default());
    let manager = StatsManager::with_probe(Arc::new(config), probe.clone()).unwrap();
    let heap = HeapViewer::new();
    heap.bind(Arc::clone(&manager));

    let cancel = CancellationToken::new();
    let task = manager.start(cancel.clone()).unwrap();

    // The startup window samples a few times, then expires.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(generation(&manager) >= 1, "startup window should sample");
    let idle = generation(&manager);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(generation(&manager), idle, "no pulls, no sampling");

    // One pull resumes sampling within an interval.
    heap.serve().unwrap();
    let gap = time_to_refresh(&manager, idle, REFRESH_BOUND).await;
    assert!(gap.is_some(), "pull should trigger a refresh within an interval");

    // Let the window lapse, then watch for 500ms with no pulls.
    tokio::time::sleep(Duration::from_millis(350)).await;
    let quiet = manager.snapshot();
    let calls = probe.calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(manager.snapshot(), quiet, "snapshot must not change while idle");
    assert_eq!(probe.calls.load(Ordering::SeqCst), calls);

    // Pulling again resumes.
    let point = heap.serve().unwrap();
    assert_eq!(point.values.len(), 1);
    let gap = time_to_refresh(&manager, quiet.generation, REFRESH_BOUND).await;
    assert!(gap.is_some(), "sampling should resume within an interval");

    cancel.cancel();
    task.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancellation_keeps_last_snapshot() {
    let config = Config::default().with_interval(Duration::from_millis(20));
    let manager =
        StatsManager::with_probe(Arc::new(config), Arc::new(CountingProbe::default())).unwrap();
    let cancel = CancellationToken::new();
    let task = manager.start(cancel.clone()).unwrap();

    tokio::time::sleep(Duration::from_millis(30)).await;
    cancel.cancel();
    task.await.unwrap();

    let last = manager.snapshot();
    assert!(last.generation >= 1);
    assert!(last.sampled_unix > 0);

    manager.notify_activity();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(manager.snapshot(), last);
}

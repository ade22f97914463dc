//! Sampling scheduler.
//!
//! [`StatsManager`] owns the snapshot store and refreshes it on a fixed
//! interval, but only while somebody is watching. Every pull calls
//! [`StatsManager::notify_activity`], which pushes an activity deadline to
//! `now + 2 × interval`; a tick past the deadline skips the probe entirely.
//! With no dashboard open the process pays nothing for sampling, and no
//! subscribe/unsubscribe bookkeeping is needed.
//!
//! The deadline is kept in Unix milliseconds so sub-second intervals keep a
//! non-zero activity window.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::{ConfigError, SchedulerError, StatsError};
use crate::stats::{ProcessProbe, RuntimeStats, StatsProbe};
use crate::store::{Snapshot, SnapshotStore};
use crate::timefmt::TimeFormat;
use crate::viewer::MetricPoint;

/// How many intervals a single pull keeps sampling alive.
const ACTIVITY_INTERVALS: i64 = 2;

pub(crate) fn unix_ms_now() -> i64 {
    let ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    i64::try_from(ms).unwrap_or(i64::MAX)
}

/// Outcome of one scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// No pull within the activity window; the store was not touched.
    Idle,
    /// A new snapshot was installed with this generation.
    Sampled(u64),
    /// The probe failed or stalled; the previous snapshot stays in place.
    Failed,
}

/// The sampling scheduler and the snapshot it maintains.
///
/// One instance is shared by every viewer of a server, so a pull on any
/// chart keeps all charts fresh.
pub struct StatsManager {
    config: Arc<Config>,
    time_format: TimeFormat,
    store: SnapshotStore,
    probe: Arc<dyn StatsProbe>,
    deadline_ms: AtomicI64,
    started: AtomicBool,
    probing: Arc<AtomicBool>,
}

/// Marks a probe call in flight; clears the mark when dropped, including
/// when a blocking task is discarded before it runs.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self(Arc::clone(flag)))
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl StatsManager {
    /// Create a manager that samples the current process.
    pub fn new(config: Arc<Config>) -> Result<Arc<Self>, ConfigError> {
        Self::with_probe(config, Arc::new(ProcessProbe))
    }

    /// Create a manager with a custom statistics probe.
    pub fn with_probe(
        config: Arc<Config>,
        probe: Arc<dyn StatsProbe>,
    ) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;
        let time_format = TimeFormat::parse(&config.time_format)?;
        let manager = Self {
            time_format,
            store: SnapshotStore::new(),
            probe,
            deadline_ms: AtomicI64::new(0),
            started: AtomicBool::new(false),
            probing: Arc::new(AtomicBool::new(false)),
            config,
        };
        // Sample from the first tick on, before any pull arrives.
        manager.notify_activity();
        Ok(Arc::new(manager))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Length of the activity window opened by one pull.
    pub fn activity_window_ms(&self) -> i64 {
        self.config.interval_ms().saturating_mul(ACTIVITY_INTERVALS)
    }

    // -----------------------------------------------------------------------
    // Activity
    // -----------------------------------------------------------------------

    /// Record a pull: keep sampling for the next two intervals.
    pub fn notify_activity(&self) {
        self.notify_activity_at(unix_ms_now());
    }

    /// Record a pull observed at `now_ms`.
    ///
    /// Concurrent callers race harmlessly; the deadline only moves forward.
    pub fn notify_activity_at(&self, now_ms: i64) {
        let deadline = now_ms.saturating_add(self.activity_window_ms());
        self.deadline_ms.fetch_max(deadline, Ordering::AcqRel);
    }

    pub fn deadline_ms(&self) -> i64 {
        self.deadline_ms.load(Ordering::Acquire)
    }

    pub fn is_active_at(&self, now_ms: i64) -> bool {
        now_ms <= self.deadline_ms()
    }

    // -----------------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------------

    /// Whether a probe call from an earlier tick has not returned yet.
    pub fn is_probing(&self) -> bool {
        self.probing.load(Ordering::Acquire)
    }

    /// Run one tick at `now_ms` on the calling thread.
    pub fn refresh_at(&self, now_ms: i64) -> Refresh {
        if !self.is_active_at(now_ms) {
            return Refresh::Idle;
        }
        let Some(_guard) = InFlight::acquire(&self.probing) else {
            log::warn!("stats probe still running, tick skipped");
            return Refresh::Failed;
        };
        match self.probe.sample() {
            Ok(stats) => Refresh::Sampled(self.install(stats, now_ms)),
            Err(e) => {
                log::warn!("stats refresh skipped: {e}");
                Refresh::Failed
            }
        }
    }

    /// Run one tick against the wall clock.
    ///
    /// The probe runs on the blocking pool and is abandoned after one
    /// interval, so a stalled read costs a tick, never the loop. At most one
    /// probe call runs at a time: while an abandoned call is still stuck,
    /// later ticks are skipped instead of piling up blocking threads.
    pub async fn tick(&self) -> Refresh {
        if !self.is_active_at(unix_ms_now()) {
            return Refresh::Idle;
        }
        let Some(guard) = InFlight::acquire(&self.probing) else {
            log::warn!("stats probe still running, tick skipped");
            return Refresh::Failed;
        };
        let probe = Arc::clone(&self.probe);
        let sampled = tokio::time::timeout(
            self.config.interval,
            tokio::task::spawn_blocking(move || {
                let _guard = guard;
                probe.sample()
            }),
        )
        .await;
        let result = match sampled {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(StatsError::Join(join.to_string())),
            Err(_) => Err(StatsError::Timeout),
        };
        match result {
            Ok(stats) => Refresh::Sampled(self.install(stats, unix_ms_now())),
            Err(e) => {
                log::warn!("stats refresh skipped: {e}");
                Refresh::Failed
            }
        }
    }

    fn install(&self, stats: RuntimeStats, now_ms: i64) -> u64 {
        self.store.install(stats, now_ms.div_euclid(1000))
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Spawn the tick loop on the current tokio runtime.
    ///
    /// The loop runs until `cancel` fires. The store keeps its last snapshot
    /// afterwards. A manager can be started once.
    pub fn start(
        self: &Arc<Self>,
        cancel: CancellationToken,
    ) -> Result<JoinHandle<()>, SchedulerError> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(SchedulerError::AlreadyStarted);
        }
        let manager = Arc::clone(self);
        Ok(tokio::spawn(async move { manager.run(cancel).await }))
    }

    async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!(
            "sampling scheduler started (interval {}ms)",
            self.config.interval_ms()
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => match self.tick().await {
                    Refresh::Idle => log::debug!("no recent pulls, sampling paused"),
                    Refresh::Sampled(generation) => log::debug!("snapshot generation {generation}"),
                    Refresh::Failed => {}
                },
            }
        }

        log::info!("sampling scheduler stopped");
    }

    // -----------------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------------

    /// Run `f` against the current snapshot under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        self.store.read(f)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.load()
    }

    pub fn last_sample_unix(&self) -> i64 {
        self.store.read(|snap| snap.sampled_unix)
    }

    pub fn format_time(&self, unix_secs: i64) -> String {
        self.time_format.format_unix(unix_secs)
    }

    /// Label of the latest sample, for viewers that do not read the store.
    pub fn sample_label(&self) -> String {
        self.format_time(self.last_sample_unix())
    }

    /// Serve one point: record the pull, then extract values and the sample
    /// label from a single consistent snapshot.
    pub fn point(&self, extract: impl FnOnce(&RuntimeStats) -> Vec<f64>) -> MetricPoint {
        self.notify_activity();
        self.store.read(|snap| MetricPoint {
            values: extract(&snap.stats),
            time: self.time_format.format_unix(snap.sampled_unix),
        })
    }
}

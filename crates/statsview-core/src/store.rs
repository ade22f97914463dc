//! The shared snapshot store.
//!
//! One writer (the scheduler) replaces the whole snapshot under the write
//! lock; any number of viewers read it under the read lock. A reader can
//! therefore never see counters from two different samples.

use std::sync::{PoisonError, RwLock};

use serde::Serialize;

use crate::stats::RuntimeStats;

/// The most recent sample and when it was taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub stats: RuntimeStats,
    /// Unix seconds of the refresh that produced `stats` (0 = never sampled).
    pub sampled_unix: i64,
    /// Number of refreshes installed so far.
    pub generation: u64,
}

#[derive(Debug, Default)]
pub struct SnapshotStore {
    inner: RwLock<Snapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the current snapshot while holding the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Clone the current snapshot.
    pub fn load(&self) -> Snapshot {
        self.read(Snapshot::clone)
    }

    /// Install a new sample taken at `unix_secs`.
    ///
    /// The sample time never moves backwards, even if the wall clock does.
    /// Returns the new generation.
    pub fn install(&self, stats: RuntimeStats, unix_secs: i64) -> u64 {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.stats = stats;
        guard.sampled_unix = guard.sampled_unix.max(unix_secs);
        guard.generation += 1;
        guard.generation
    }
}

//! # statsview-core
//!
//! **Live runtime stats for a running Rust process.**
//!
//! `statsview-core` samples process statistics (threads, heap, stack,
//! allocator activity, CPU share) into a shared snapshot and turns that
//! snapshot into chart points for a polling browser dashboard.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use statsview_core::{Config, StatsManager, Viewer, viewers};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Arc::new(Config::default());
//! let manager = StatsManager::new(config)?;
//!
//! let heap = viewers::HeapViewer::new();
//! heap.bind(Arc::clone(&manager));
//!
//! let cancel = CancellationToken::new();
//! let task = manager.start(cancel.clone())?;
//!
//! // Every pull keeps sampling alive for two more intervals.
//! let point = heap.serve();
//! println!("{point:?}");
//!
//! cancel.cancel();
//! task.await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Pull → Viewer → StatsManager (notify activity, read snapshot) → MetricPoint
//!
//! Independently, the scheduler tick checks the activity deadline and only
//! pays for a probe read while a dashboard is pulling.

pub mod alloc;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod stats;
pub mod store;
pub mod template;
pub mod timefmt;
pub mod viewer;
pub mod viewers;

pub use alloc::{AllocCounters, TrackingAllocator};
pub use config::{Config, Theme};
pub use error::{ConfigError, SchedulerError, StatsError};
pub use scheduler::{Refresh, StatsManager};
pub use stats::{ProcessProbe, RuntimeStats, StatsProbe};
pub use store::{Snapshot, SnapshotStore};
pub use template::{DEFAULT_TEMPLATE, PullTemplate, TemplateVars};
pub use timefmt::TimeFormat;
pub use viewer::{Binding, ChartSpec, MetricPoint, Viewer, chart_id, round_to};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Demo viewer that does not read the snapshot.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use statsview_core::{Binding, ChartSpec, MetricPoint, StatsManager, Viewer};

pub const VSTATIC: &str = "static";

/// Reports 0, 1, .., 9, 0, .. on successive pulls.
#[derive(Default)]
pub struct CyclicViewer {
    binding: Binding,
    counter: AtomicU64,
}

impl CyclicViewer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Viewer for CyclicViewer {
    fn name(&self) -> &str {
        VSTATIC
    }

    fn chart(&self) -> ChartSpec {
        ChartSpec::new(VSTATIC, "Static count", "Count", &["Count"])
    }

    fn bind(&self, manager: Arc<StatsManager>) {
        self.binding.bind(manager);
    }

    fn serve(&self) -> Option<MetricPoint> {
        let manager = self.binding.get()?;
        manager.notify_activity();
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        Some(MetricPoint {
            values: vec![(n % 10) as f64],
            time: manager.sample_label(),
        })
    }
}

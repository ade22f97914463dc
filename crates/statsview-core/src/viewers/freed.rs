//! Reclaimed bytes viewer.

use std::sync::Arc;

use crate::scheduler::StatsManager;
use crate::viewer::{Binding, ChartSpec, MetricPoint, Viewer, MIB, round_to};

pub const VFREED: &str = "freed";

/// Cumulative bytes returned to the allocator, in MiB.
#[derive(Default)]
pub struct FreedViewer {
    binding: Binding,
}

impl FreedViewer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Viewer for FreedViewer {
    fn name(&self) -> &str {
        VFREED
    }

    fn chart(&self) -> ChartSpec {
        ChartSpec::new(VFREED, "Freed", "Size / MiB", &["FreedTotal"])
    }

    fn bind(&self, manager: Arc<StatsManager>) {
        self.binding.bind(manager);
    }

    fn serve(&self) -> Option<MetricPoint> {
        let manager = self.binding.get()?;
        Some(manager.point(|s| vec![round_to(s.freed_bytes as f64 / MIB, 2)]))
    }
}

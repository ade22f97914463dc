//! Heap usage viewer.

use std::sync::Arc;

use crate::scheduler::StatsManager;
use crate::viewer::{Binding, ChartSpec, MetricPoint, Viewer, MIB, round_to};

pub const VHEAP: &str = "heap";

/// Live heap bytes, in MiB.
///
/// Exact when the application installs [`TrackingAllocator`](crate::alloc::TrackingAllocator);
/// otherwise the data segment size is shown instead.
#[derive(Default)]
pub struct HeapViewer {
    binding: Binding,
}

impl HeapViewer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Viewer for HeapViewer {
    fn name(&self) -> &str {
        VHEAP
    }

    fn chart(&self) -> ChartSpec {
        ChartSpec::new(VHEAP, "Heap", "Size / MiB", &["HeapInUse"])
    }

    fn bind(&self, manager: Arc<StatsManager>) {
        self.binding.bind(manager);
    }

    fn serve(&self) -> Option<MetricPoint> {
        let manager = self.binding.get()?;
        Some(manager.point(|s| vec![round_to(s.heap_bytes as f64 / MIB, 2)]))
    }
}

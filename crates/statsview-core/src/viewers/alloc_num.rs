//! Allocation count viewer.

use std::sync::Arc;

use crate::scheduler::StatsManager;
use crate::viewer::{Binding, ChartSpec, MetricPoint, Viewer};

pub const VALLOCNUM: &str = "allocnum";

/// Cumulative allocation calls seen by the tracking allocator.
#[derive(Default)]
pub struct AllocNumViewer {
    binding: Binding,
}

impl AllocNumViewer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Viewer for AllocNumViewer {
    fn name(&self) -> &str {
        VALLOCNUM
    }

    fn chart(&self) -> ChartSpec {
        ChartSpec::new(VALLOCNUM, "Allocations", "Num", &["AllocNum"])
    }

    fn bind(&self, manager: Arc<StatsManager>) {
        self.binding.bind(manager);
    }

    fn serve(&self) -> Option<MetricPoint> {
        let manager = self.binding.get()?;
        Some(manager.point(|s| vec![s.alloc_count as f64]))
    }
}

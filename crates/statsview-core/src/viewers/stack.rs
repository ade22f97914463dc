//! Stack size viewer.

use std::sync::Arc;

use crate::scheduler::StatsManager;
use crate::viewer::{Binding, ChartSpec, MetricPoint, Viewer, MIB, round_to};

pub const VSTACK: &str = "stack";

/// Main thread stack mapping, in MiB.
#[derive(Default)]
pub struct StackViewer {
    binding: Binding,
}

impl StackViewer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Viewer for StackViewer {
    fn name(&self) -> &str {
        VSTACK
    }

    fn chart(&self) -> ChartSpec {
        ChartSpec::new(VSTACK, "Stack", "Size / MiB", &["StackInUse"])
    }

    fn bind(&self, manager: Arc<StatsManager>) {
        self.binding.bind(manager);
    }

    fn serve(&self) -> Option<MetricPoint> {
        let manager = self.binding.get()?;
        Some(manager.point(|s| vec![round_to(s.stack_bytes as f64 / MIB, 2)]))
    }
}

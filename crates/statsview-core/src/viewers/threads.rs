//! Thread count viewer.

use std::sync::Arc;

use crate::scheduler::StatsManager;
use crate::viewer::{Binding, ChartSpec, MetricPoint, Viewer};

pub const VTHREADS: &str = "threads";

/// Number of OS threads in the process.
#[derive(Default)]
pub struct ThreadsViewer {
    binding: Binding,
}

impl ThreadsViewer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Viewer for ThreadsViewer {
    fn name(&self) -> &str {
        VTHREADS
    }

    fn chart(&self) -> ChartSpec {
        ChartSpec::new(VTHREADS, "Threads", "Num", &["Threads"])
    }

    fn bind(&self, manager: Arc<StatsManager>) {
        self.binding.bind(manager);
    }

    fn serve(&self) -> Option<MetricPoint> {
        let manager = self.binding.get()?;
        Some(manager.point(|s| vec![s.threads as f64]))
    }
}

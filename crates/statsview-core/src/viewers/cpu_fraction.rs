//! CPU usage viewer.

use std::sync::Arc;

use crate::scheduler::StatsManager;
use crate::viewer::{Binding, ChartSpec, MetricPoint, Viewer, round_to};

pub const VCPUFRACTION: &str = "cpufraction";

/// Share of available CPU time the process has used since it started.
#[derive(Default)]
pub struct CpuFractionViewer {
    binding: Binding,
}

impl CpuFractionViewer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Viewer for CpuFractionViewer {
    fn name(&self) -> &str {
        VCPUFRACTION
    }

    fn chart(&self) -> ChartSpec {
        ChartSpec::new(VCPUFRACTION, "CPU Fraction", "Fraction", &["CPUFraction"])
    }

    fn bind(&self, manager: Arc<StatsManager>) {
        self.binding.bind(manager);
    }

    fn serve(&self) -> Option<MetricPoint> {
        let manager = self.binding.get()?;
        Some(manager.point(|s| vec![round_to(s.cpu_fraction, 6)]))
    }
}

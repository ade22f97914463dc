//! Built-in viewers over the process snapshot.

pub mod alloc_num;
pub mod cpu_fraction;
pub mod freed;
pub mod heap;
pub mod stack;
pub mod threads;

pub use alloc_num::AllocNumViewer;
pub use cpu_fraction::CpuFractionViewer;
pub use freed::FreedViewer;
pub use heap::HeapViewer;
pub use stack::StackViewer;
pub use threads::ThreadsViewer;

use crate::viewer::Viewer;

/// Every built-in viewer, in dashboard order.
pub fn all_viewers() -> Vec<Box<dyn Viewer>> {
    vec![
        Box::new(ThreadsViewer::new()),
        Box::new(HeapViewer::new()),
        Box::new(StackViewer::new()),
        Box::new(AllocNumViewer::new()),
        Box::new(FreedViewer::new()),
        Box::new(CpuFractionViewer::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::error::StatsError;
    use crate::scheduler::StatsManager;
    use crate::stats::{RuntimeStats, StatsProbe};

    struct FixedProbe;

    impl StatsProbe for FixedProbe {
        fn sample(&self) -> Result<RuntimeStats, StatsError> {
            Ok(RuntimeStats {
                threads: 12,
                heap_bytes: 3 * 1024 * 1024 + 512 * 1024,
                stack_bytes: 132 * 1024,
                rss_bytes: 64 * 1024 * 1024,
                alloc_count: 4242,
                freed_bytes: 10 * 1024 * 1024,
                cpu_fraction: 0.012_345_678,
            })
        }
    }

    fn sampled_manager() -> Arc<StatsManager> {
        let m = StatsManager::with_probe(Arc::new(Config::default()), Arc::new(FixedProbe))
            .unwrap();
        m.refresh_at(m.deadline_ms());
        m
    }

    fn serve_bound(viewer: &dyn Viewer, m: &Arc<StatsManager>) -> Vec<f64> {
        viewer.bind(Arc::clone(m));
        viewer.serve().unwrap().values
    }

    #[test]
    fn test_all_viewers_order() {
        let names: Vec<String> = all_viewers().iter().map(|v| v.name().to_string()).collect();
        assert_eq!(
            names,
            ["threads", "heap", "stack", "allocnum", "freed", "cpufraction"]
        );
    }

    #[test]
    fn test_routes_and_chart_ids_unique() {
        let viewers = all_viewers();
        let routes: HashSet<_> = viewers.iter().map(|v| v.name().to_string()).collect();
        let ids: HashSet<_> = viewers.iter().map(|v| v.chart().id).collect();
        assert_eq!(routes.len(), viewers.len());
        assert_eq!(ids.len(), viewers.len());
    }

    #[test]
    fn test_chart_route_matches_name() {
        for v in all_viewers() {
            let chart = v.chart();
            assert_eq!(chart.route, v.name());
            assert_eq!(chart.series.len(), 1, "{} should declare one series", v.name());
        }
    }

    #[test]
    fn test_unbound_viewer_serves_nothing() {
        for v in all_viewers() {
            assert!(v.serve().is_none());
        }
    }

    #[test]
    fn test_each_viewer_extracts_its_field() {
        let m = sampled_manager();
        assert_eq!(serve_bound(&ThreadsViewer::new(), &m), vec![12.0]);
        assert_eq!(serve_bound(&HeapViewer::new(), &m), vec![3.5]);
        assert_eq!(serve_bound(&StackViewer::new(), &m), vec![0.13]);
        assert_eq!(serve_bound(&AllocNumViewer::new(), &m), vec![4242.0]);
        assert_eq!(serve_bound(&FreedViewer::new(), &m), vec![10.0]);
        assert_eq!(serve_bound(&CpuFractionViewer::new(), &m), vec![0.012346]);
    }

    #[test]
    fn test_points_from_one_generation_share_time() {
        let m = sampled_manager();
        let threads = ThreadsViewer::new();
        let heap = HeapViewer::new();
        threads.bind(Arc::clone(&m));
        heap.bind(Arc::clone(&m));
        let a = threads.serve().unwrap();
        let b = heap.serve().unwrap();
        assert_eq!(a.time, b.time);
        assert_ne!(a.values, b.values);
    }
}

//! The metric viewer abstraction.
//!
//! A [`Viewer`] is one chart on the dashboard: it names its pull route,
//! declares its chart, and turns the shared snapshot into a [`MetricPoint`]
//! on every pull. Built-in viewers live in [`crate::viewers`]; applications
//! add their own by implementing the trait.

use std::sync::{Arc, OnceLock};

use serde::Serialize;

use crate::scheduler::StatsManager;

/// One data point as served to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    /// One value per chart series, in series order.
    pub values: Vec<f64>,
    /// Formatted sample time, shared by every point of the same refresh.
    pub time: String,
}

/// The chart a viewer contributes to the dashboard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    /// JS-safe identifier, unique per route.
    pub id: String,
    pub route: String,
    pub title: String,
    pub y_axis: String,
    /// Series names, matching the order of [`MetricPoint::values`].
    pub series: Vec<String>,
}

impl ChartSpec {
    pub fn new(route: &str, title: &str, y_axis: &str, series: &[&str]) -> Self {
        Self {
            id: chart_id(route),
            route: route.to_string(),
            title: title.to_string(),
            y_axis: y_axis.to_string(),
            series: series.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Trait every metric viewer implements.
pub trait Viewer: Send + Sync {
    /// Route identifier, served at `<prefix>/view/<name>`.
    fn name(&self) -> &str;

    /// Chart definition for the dashboard page.
    fn chart(&self) -> ChartSpec;

    /// Attach the shared scheduler. Called once at registration.
    fn bind(&self, manager: Arc<StatsManager>);

    /// Produce the point for one pull, or `None` if the viewer was never
    /// bound.
    fn serve(&self) -> Option<MetricPoint>;
}

/// Holds the scheduler a viewer was bound to.
///
/// The first bind wins; later binds are ignored.
#[derive(Default)]
pub struct Binding {
    manager: OnceLock<Arc<StatsManager>>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&self, manager: Arc<StatsManager>) {
        if self.manager.set(manager).is_err() {
            log::debug!("viewer already bound, keeping the first scheduler");
        }
    }

    pub fn get(&self) -> Option<&Arc<StatsManager>> {
        self.manager.get()
    }
}

/// Build a JS identifier from a route name.
pub fn chart_id(route: &str) -> String {
    let mut id = String::with_capacity(route.len() + 10);
    id.push_str("statsview_");
    for ch in route.chars() {
        id.push(if ch.is_ascii_alphanumeric() { ch } else { '_' });
    }
    id
}

/// Round to a fixed number of decimals for display.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

pub(crate) const MIB: f64 = 1024.0 * 1024.0;

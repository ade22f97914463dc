//! Dashboard and sampling configuration.
//!
//! A [`Config`] is built once on top of the defaults, validated, and then
//! shared read-only (behind an `Arc`) by the scheduler, the viewers and the
//! page renderer. Nothing changes it after the server starts.

use std::time::Duration;

use crate::error::ConfigError;
use crate::template::{DEFAULT_TEMPLATE, PullTemplate};
use crate::timefmt::TimeFormat;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_MAX_POINTS: usize = 30;
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";
pub const DEFAULT_ADDR: &str = "localhost:18066";
pub const DEFAULT_ASSETS_HOST: &str = "https://cdn.jsdelivr.net/npm/echarts@5.4.3/";
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Chart color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    Westeros,
    #[default]
    Macarons,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Westeros => "westeros",
            Self::Macarons => "macarons",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "westeros" => Ok(Self::Westeros),
            "macarons" => Ok(Self::Macarons),
            other => Err(format!("unknown theme '{other}' (expected westeros or macarons)")),
        }
    }
}

/// Settings consumed by the scheduler, the viewers and the dashboard page.
#[derive(Debug, Clone)]
pub struct Config {
    /// Sampling period; also the browser pull period. Pulls keep sampling
    /// alive for twice this long.
    pub interval: Duration,
    /// Points kept per series by the browser before trimming.
    pub max_points: usize,
    /// Address the HTTP server binds.
    pub listen_addr: String,
    /// Address the dashboard page tells the browser to pull from.
    pub link_addr: String,
    /// strftime pattern for point labels.
    pub time_format: String,
    pub theme: Theme,
    pub auto_open_browser: bool,
    /// Per-chart pull script, see [`crate::template`].
    pub template: String,
    /// Base URL the page loads ECharts and its themes from.
    pub assets_host: String,
    /// Upper bound on waiting for in-flight requests during stop.
    pub shutdown_grace: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_points: DEFAULT_MAX_POINTS,
            listen_addr: DEFAULT_ADDR.to_string(),
            link_addr: DEFAULT_ADDR.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            theme: Theme::default(),
            auto_open_browser: false,
            template: DEFAULT_TEMPLATE.to_string(),
            assets_host: DEFAULT_ASSETS_HOST.to_string(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl Config {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_points(mut self, n: usize) -> Self {
        self.max_points = n;
        self
    }

    /// Set both the listen address and the link address.
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        let addr = addr.into();
        self.link_addr = addr.clone();
        self.listen_addr = addr;
        self
    }

    /// Set only the address advertised to the browser.
    pub fn with_link_addr(mut self, addr: impl Into<String>) -> Self {
        self.link_addr = addr.into();
        self
    }

    pub fn with_time_format(mut self, pattern: impl Into<String>) -> Self {
        self.time_format = pattern.into();
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_browser_open(mut self) -> Self {
        self.auto_open_browser = true;
        self
    }

    pub fn with_assets_host(mut self, host: impl Into<String>) -> Self {
        self.assets_host = host.into();
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Interval in whole milliseconds (at least 1).
    pub fn interval_ms(&self) -> i64 {
        i64::try_from(self.interval.as_millis())
            .unwrap_or(i64::MAX)
            .max(1)
    }

    /// Check every field that could make the server unable to produce
    /// meaningful points. Call before starting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval < Duration::from_millis(1) {
            return Err(ConfigError::InvalidInterval);
        }
        if self.max_points == 0 {
            return Err(ConfigError::InvalidMaxPoints);
        }
        if self.listen_addr.trim().is_empty() {
            return Err(ConfigError::EmptyAddr("listen"));
        }
        if self.link_addr.trim().is_empty() {
            return Err(ConfigError::EmptyAddr("link"));
        }
        TimeFormat::parse(&self.time_format)?;
        PullTemplate::parse(&self.template)?;
        Ok(())
    }
}

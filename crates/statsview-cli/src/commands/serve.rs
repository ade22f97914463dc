//! `statsview serve`: run the dashboard for this process.

use std::time::Duration;

use anyhow::Context;
use statsview_core::{Config, Theme};
use statsview_server::{PREFIX, ViewManager, Viewers};

use crate::demo::CyclicViewer;

pub struct ServeCommandConfig {
    pub addr: String,
    pub link_addr: Option<String>,
    pub interval_ms: u64,
    pub max_points: usize,
    pub time_format: String,
    pub theme: Theme,
    pub open: bool,
    pub demo: bool,
    pub assets_host: String,
}

impl ServeCommandConfig {
    fn to_config(&self) -> Config {
        let mut config = Config::default()
            .with_addr(self.addr.clone())
            .with_interval(Duration::from_millis(self.interval_ms))
            .with_max_points(self.max_points)
            .with_time_format(self.time_format.clone())
            .with_theme(self.theme)
            .with_assets_host(self.assets_host.clone());
        if let Some(link) = &self.link_addr {
            config = config.with_link_addr(link.clone());
        }
        if self.open {
            config = config.with_browser_open();
        }
        config
    }

    fn viewers(&self) -> Viewers {
        let viewers = Viewers::default_viewers();
        if self.demo {
            viewers.register(CyclicViewer::new())
        } else {
            viewers
        }
    }
}

pub fn run(cmd: ServeCommandConfig) -> anyhow::Result<()> {
    let config = cmd.to_config();
    config.validate().context("invalid dashboard configuration")?;

    let manager = ViewManager::new(config, cmd.viewers()).context("building dashboard")?;

    println!("statsview v{}", statsview_core::VERSION);
    println!("   {}", manager.dashboard_url());
    println!("   {} charts", manager.charts().len());
    println!("   GET {PREFIX}/view/<route> for a single point");
    println!();

    let cancel = manager.cancel_token();
    ctrlc::set_handler(move || cancel.cancel()).context("installing Ctrl+C handler")?;

    let rt = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    rt.block_on(manager.run()).context("serving dashboard")?;
    Ok(())
}

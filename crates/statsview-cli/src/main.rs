//! CLI for statsview: watch this process's runtime stats in the browser.

mod commands;
mod demo;

use clap::{Parser, Subcommand};
use statsview_core::{Theme, TrackingAllocator};

#[global_allocator]
static ALLOC: TrackingAllocator = TrackingAllocator;

#[derive(Parser)]
#[command(name = "statsview")]
#[command(about = "statsview: live runtime stats of a Rust process, charted in the browser")]
#[command(version = statsview_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard for this process until Ctrl+C
    Serve {
        /// Address to listen on
        #[arg(long, default_value = statsview_core::config::DEFAULT_ADDR)]
        addr: String,

        /// Address the page tells the browser to pull from (defaults to --addr)
        #[arg(long)]
        link_addr: Option<String>,

        /// Sampling and pull interval in milliseconds
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,

        /// Points kept per chart
        #[arg(long, default_value_t = statsview_core::config::DEFAULT_MAX_POINTS)]
        max_points: usize,

        /// strftime pattern for point labels
        #[arg(long, default_value = statsview_core::config::DEFAULT_TIME_FORMAT)]
        time_format: String,

        /// Chart theme: westeros or macarons
        #[arg(long, default_value = "macarons")]
        theme: Theme,

        /// Open the dashboard in the default browser once listening
        #[arg(long)]
        open: bool,

        /// Add a demo chart that cycles 0..9
        #[arg(long)]
        demo: bool,

        /// Base URL for ECharts and theme scripts
        #[arg(long, default_value = statsview_core::config::DEFAULT_ASSETS_HOST)]
        assets_host: String,
    },

    /// Sample this process once and print the stats as JSON
    Snapshot,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            addr,
            link_addr,
            interval_ms,
            max_points,
            time_format,
            theme,
            open,
            demo,
            assets_host,
        } => commands::serve::run(commands::serve::ServeCommandConfig {
            addr,
            link_addr,
            interval_ms,
            max_points,
            time_format,
            theme,
            open,
            demo,
            assets_host,
        }),
        Commands::Snapshot => commands::snapshot::run(),
    }
}

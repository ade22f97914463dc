//! `statsview snapshot`: one sample of this process, as JSON.

use anyhow::Context;
use statsview_core::{AllocCounters, ProcessProbe, StatsProbe};

pub fn run() -> anyhow::Result<()> {
    let stats = ProcessProbe
        .sample()
        .context("sampling process statistics")?;
    let report = serde_json::json!({
        "stats": stats,
        "allocator": AllocCounters::load(),
    });
    let text = serde_json::to_string_pretty(&report).context("encoding snapshot")?;
    println!("{text}");
    Ok(())
}

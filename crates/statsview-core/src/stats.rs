//! Runtime statistics of the current process.
//!
//! The counters are the process-level figures a Rust program can observe
//! about itself without elevated privileges:
//! - thread count, stack and data segment sizes from `/proc/self/status`,
//! - CPU time from `/proc/self/stat`,
//! - allocation activity from [`TrackingAllocator`](crate::alloc::TrackingAllocator)
//!   when the application installs it.
//!
//! Values that cannot be observed on the current platform stay at zero.

use serde::Serialize;

use crate::alloc::AllocCounters;
use crate::error::StatsError;

/// One sample of process runtime statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RuntimeStats {
    /// OS threads in the process.
    pub threads: u64,
    /// Live heap bytes (allocator counters, or `VmData` without them).
    pub heap_bytes: u64,
    /// Main thread stack mapping size.
    pub stack_bytes: u64,
    /// Resident set size.
    pub rss_bytes: u64,
    /// Cumulative allocation calls.
    pub alloc_count: u64,
    /// Cumulative bytes returned to the allocator.
    pub freed_bytes: u64,
    /// Share of available CPU time used by the process since it started.
    pub cpu_fraction: f64,
}

/// Reads runtime statistics for one scheduler refresh.
///
/// Implementations run on a blocking thread and may take a while, but should
/// return rather than hang: the scheduler gives up after one interval and
/// keeps serving the previous snapshot.
pub trait StatsProbe: Send + Sync {
    fn sample(&self) -> Result<RuntimeStats, StatsError>;
}

/// Default probe: procfs plus the tracking allocator counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessProbe;

impl StatsProbe for ProcessProbe {
    fn sample(&self) -> Result<RuntimeStats, StatsError> {
        let alloc = AllocCounters::load();
        #[cfg_attr(not(target_os = "linux"), allow(unused_mut))]
        let mut stats = RuntimeStats {
            alloc_count: alloc.allocs,
            freed_bytes: alloc.freed_bytes,
            heap_bytes: alloc.live_bytes(),
            ..RuntimeStats::default()
        };

        #[cfg(target_os = "linux")]
        {
            let status = read_proc("/proc/self/status")?;
            let fields = parse_status(&status)?;
            stats.threads = fields.threads;
            stats.stack_bytes = fields.stack_bytes;
            stats.rss_bytes = fields.rss_bytes;
            if !alloc.active {
                stats.heap_bytes = fields.data_bytes;
            }

            let stat = read_proc("/proc/self/stat")?;
            let times = parse_stat(&stat)?;
            let uptime = read_proc("/proc/uptime")?;
            let uptime_secs = parse_uptime(&uptime)?;
            stats.cpu_fraction = cpu_fraction(
                times.cpu_ticks(),
                times.start_ticks,
                uptime_secs,
                linux_clk_tck(),
                available_cores(),
            );
        }

        Ok(stats)
    }
}

#[cfg(target_os = "linux")]
fn read_proc(path: &'static str) -> Result<String, StatsError> {
    std::fs::read_to_string(path).map_err(|source| StatsError::Io { path, source })
}

#[cfg(target_os = "linux")]
fn linux_clk_tck() -> f64 {
    // SAFETY: `sysconf` is thread-safe for this query and has no side effects.
    let hz = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if hz > 0 { hz as f64 } else { 100.0 }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

// ---------------------------------------------------------------------------
// procfs parsing
// ---------------------------------------------------------------------------

/// Fields of interest from `/proc/<pid>/status`, in bytes where applicable.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatusFields {
    pub threads: u64,
    pub data_bytes: u64,
    pub stack_bytes: u64,
    pub rss_bytes: u64,
}

/// Parse `/proc/<pid>/status`. `Threads:` is required; the `Vm*` lines are
/// absent for kernel threads and default to zero.
pub fn parse_status(raw: &str) -> Result<StatusFields, StatsError> {
    let mut out = StatusFields::default();
    let mut saw_threads = false;

    for line in raw.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(value) = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok())
        else {
            continue;
        };
        match key {
            "Threads" => {
                out.threads = value;
                saw_threads = true;
            }
            "VmData" => out.data_bytes = value * 1024,
            "VmStk" => out.stack_bytes = value * 1024,
            "VmRSS" => out.rss_bytes = value * 1024,
            _ => {}
        }
    }

    if saw_threads {
        Ok(out)
    } else {
        Err(StatsError::Parse("/proc/self/status"))
    }
}

/// CPU and start times from `/proc/<pid>/stat`, in clock ticks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatTimes {
    pub utime: u64,
    pub stime: u64,
    pub start_ticks: u64,
}

impl StatTimes {
    pub fn cpu_ticks(&self) -> u64 {
        self.utime + self.stime
    }
}

/// Parse `/proc/<pid>/stat`. The command name may contain spaces and
/// parentheses, so fields are counted from the last `)`.
pub fn parse_stat(raw: &str) -> Result<StatTimes, StatsError> {
    let after_comm = raw
        .rfind(')')
        .map(|i| &raw[i + 1..])
        .ok_or(StatsError::Parse("/proc/self/stat"))?;
    // Field 3 (state) is index 0 here; utime is field 14, stime 15,
    // starttime 22.
    let fields: Vec<&str> = after_comm.split_whitespace().collect();
    let field = |idx: usize| -> Result<u64, StatsError> {
        fields
            .get(idx)
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or(StatsError::Parse("/proc/self/stat"))
    };
    Ok(StatTimes {
        utime: field(11)?,
        stime: field(12)?,
        start_ticks: field(19)?,
    })
}

/// Parse the first field of `/proc/uptime` (seconds since boot).
pub fn parse_uptime(raw: &str) -> Result<f64, StatsError> {
    raw.split_whitespace()
        .next()
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or(StatsError::Parse("/proc/uptime"))
}

/// Fraction of the CPU time available since process start that the process
/// actually used, in `[0, 1]`.
pub fn cpu_fraction(
    cpu_ticks: u64,
    start_ticks: u64,
    uptime_secs: f64,
    clk_tck: f64,
    cores: usize,
) -> f64 {
    let elapsed = uptime_secs - start_ticks as f64 / clk_tck;
    if elapsed <= 0.0 || cores == 0 {
        return 0.0;
    }
    let used = cpu_ticks as f64 / clk_tck;
    (used / (elapsed * cores as f64)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = "Name:\tstatsview\n\
        Umask:\t0022\n\
        State:\tS (sleeping)\n\
        VmPeak:\t  123456 kB\n\
        VmRSS:\t    8192 kB\n\
        VmData:\t   20480 kB\n\
        VmStk:\t     132 kB\n\
        Threads:\t7\n\
        SigQ:\t0/63371\n";

    // -----------------------------------------------------------------------
    // /proc/self/status
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_status_fields() {
        let f = parse_status(STATUS).unwrap();
        assert_eq!(f.threads, 7);
        assert_eq!(f.rss_bytes, 8192 * 1024);
        assert_eq!(f.data_bytes, 20480 * 1024);
        assert_eq!(f.stack_bytes, 132 * 1024);
    }

    #[test]
    fn test_parse_status_kernel_thread_has_no_vm_lines() {
        let f = parse_status("Name:\tkthreadd\nThreads:\t1\n").unwrap();
        assert_eq!(f.threads, 1);
        assert_eq!(f.data_bytes, 0);
        assert_eq!(f.stack_bytes, 0);
    }

    #[test]
    fn test_parse_status_requires_threads() {
        assert!(parse_status("Name:\tx\nVmRSS:\t1 kB\n").is_err());
        assert!(parse_status("").is_err());
    }

    // -----------------------------------------------------------------------
    // /proc/self/stat
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_stat_simple_comm() {
        let raw = "1234 (statsview) S 1 1234 1234 0 -1 4194560 500 0 0 0 \
                   250 50 0 0 20 0 7 0 98765 1000000 2048 18446744073709551615";
        let t = parse_stat(raw).unwrap();
        assert_eq!(t.utime, 250);
        assert_eq!(t.stime, 50);
        assert_eq!(t.start_ticks, 98765);
        assert_eq!(t.cpu_ticks(), 300);
    }

    #[test]
    fn test_parse_stat_comm_with_parens_and_spaces() {
        let raw = "42 (my (odd) proc) R 1 42 42 0 -1 0 0 0 0 0 \
                   10 20 0 0 20 0 1 0 500 0 0";
        let t = parse_stat(raw).unwrap();
        assert_eq!(t.utime, 10);
        assert_eq!(t.stime, 20);
        assert_eq!(t.start_ticks, 500);
    }

    #[test]
    fn test_parse_stat_truncated() {
        assert!(parse_stat("1 (x) S 1 2 3").is_err());
        assert!(parse_stat("no parens here").is_err());
    }

    #[test]
    fn test_parse_uptime() {
        assert!((parse_uptime("12345.67 54321.00\n").unwrap() - 12345.67).abs() < 1e-9);
        assert!(parse_uptime("").is_err());
    }

    // -----------------------------------------------------------------------
    // CPU fraction
    // -----------------------------------------------------------------------

    #[test]
    fn test_cpu_fraction_half_of_one_core() {
        // Started at t=100s, now t=110s, used 5s of CPU on 1 core.
        let f = cpu_fraction(500, 10_000, 110.0, 100.0, 1);
        assert!((f - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_cpu_fraction_scales_with_cores() {
        let f = cpu_fraction(500, 10_000, 110.0, 100.0, 4);
        assert!((f - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_cpu_fraction_no_elapsed_time() {
        assert_eq!(cpu_fraction(10, 10_000, 100.0, 100.0, 1), 0.0);
        assert_eq!(cpu_fraction(10, 10_000, 50.0, 100.0, 1), 0.0);
    }

    #[test]
    fn test_cpu_fraction_clamped() {
        assert_eq!(cpu_fraction(100_000, 0, 1.0, 100.0, 1), 1.0);
    }

    // -----------------------------------------------------------------------
    // Live probe
    // -----------------------------------------------------------------------

    #[cfg(target_os = "linux")]
    #[test]
    fn test_process_probe_reads_self() {
        let stats = ProcessProbe.sample().unwrap();
        assert!(stats.threads >= 1);
        assert!(stats.rss_bytes > 0);
        assert!((0.0..=1.0).contains(&stats.cpu_fraction));
    }
}

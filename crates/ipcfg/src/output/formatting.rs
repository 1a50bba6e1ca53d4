//! Shared formatting helpers for text output.

/// Format a link speed in bits per second (Kbps, Mbps, Gbps).
///
/// # Example
///
/// ```
/// use ipcfg::output::format_rate_bps;
///
/// assert_eq!(format_rate_bps(100_000_000), "100.0Mbps");
/// assert_eq!(format_rate_bps(1_000_000_000), "1.0Gbps");
/// ```
pub fn format_rate_bps(bits_per_sec: u64) -> String {
    const KBPS: f64 = 1_000.0;
    const MBPS: f64 = 1_000_000.0;
    const GBPS: f64 = 1_000_000_000.0;

    // The host reports an unknown speed as all ones.
    if bits_per_sec == u64::MAX {
        return "unknown".to_string();
    }

    let rate = bits_per_sec as f64;
    if rate >= GBPS {
        format!("{:.1}Gbps", rate / GBPS)
    } else if rate >= MBPS {
        format!("{:.1}Mbps", rate / MBPS)
    } else if rate >= KBPS {
        format!("{:.1}Kbps", rate / KBPS)
    } else {
        format!("{}bps", bits_per_sec)
    }
}

/// Format an address or route lifetime in seconds, `forever` for infinite.
pub fn format_duration_secs(secs: u32) -> String {
    if secs == u32::MAX {
        "forever".to_string()
    } else {
        format!("{secs}sec")
    }
}

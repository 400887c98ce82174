//! Human-readable formatting for sizes, speeds and ETAs.

/// ETA value (100 days) the daemon reports for "unknown" or "infinite".
pub const INFINITE_ETA_SECS: i64 = 8_640_000;

/// Rendered in place of an unknown ETA.
pub const INFINITY_MARKER: &str = "∞";

const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Formats a byte count with base-1024 units and two decimals, e.g. `1.50 MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{size:.2} {}", UNITS[unit])
}

/// Formats a transfer rate in bytes per second, e.g. `512.00 KB/s`.
pub fn format_speed(bytes_per_sec: u64) -> String {
    if bytes_per_sec == 0 {
        return "0 B/s".to_string();
    }
    format!("{}/s", format_size(bytes_per_sec))
}

/// Formats an ETA in seconds using its two coarsest units.
///
/// Non-positive values and anything at or beyond [`INFINITE_ETA_SECS`] render as
/// [`INFINITY_MARKER`].
pub fn format_eta(eta_secs: i64) -> String {
    if eta_secs <= 0 || eta_secs >= INFINITE_ETA_SECS {
        return INFINITY_MARKER.to_string();
    }

    let (minutes, seconds) = (eta_secs / 60, eta_secs % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    let (days, hours) = (hours / 24, hours % 24);

    if days > 0 {
        format!("{days}d {hours:02}h")
    } else if hours > 0 {
        format!("{hours}h {minutes:02}m")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}

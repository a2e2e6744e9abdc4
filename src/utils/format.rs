//! Human-readable durations

/// Format a remaining time as `M:SS`, or `H:MM:SS` from one hour up.
///
/// Seconds round up so a timer shows `0:01` until it actually reaches zero.
pub fn format_remaining(ms: u64) -> String {
    let total_seconds = ms.div_ceil(1000);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::format_remaining;

    #[test]
    fn formats_minutes_and_hours() {
        assert_eq!(format_remaining(0), "0:00");
        assert_eq!(format_remaining(1), "0:01");
        assert_eq!(format_remaining(65_000), "1:05");
        assert_eq!(format_remaining(3_600_000), "1:00:00");
        assert_eq!(format_remaining(3_725_400), "1:02:06");
    }
}

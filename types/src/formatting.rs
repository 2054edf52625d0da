//! Human-readable formatting for log lines and run summaries.
//!
//! The analytics document itself always carries raw integers; these helpers
//! exist for the places a person reads the numbers (tracing output and the
//! command-line summary).

/// Format a match-clock value as `M:SS`.
///
/// Unknown times (negative) render as `--:--`.
///
/// # Examples
/// ```
/// use aegis_types::formatting::format_match_time;
/// assert_eq!(format_match_time(125), "2:05");
/// assert_eq!(format_match_time(0), "0:00");
/// assert_eq!(format_match_time(-1), "--:--");
/// ```
pub fn format_match_time(secs: i64) -> String {
    if secs < 0 {
        return "--:--".to_string();
    }
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Format a large number with K/M suffix for compact display.
///
/// The sign is kept, so a Dire lead reads as `-1.50K`.
///
/// # Examples
/// ```
/// use aegis_types::formatting::format_compact;
/// assert_eq!(format_compact(500), "500");
/// assert_eq!(format_compact(1_500), "1.50K");
/// assert_eq!(format_compact(-1_500), "-1.50K");
/// assert_eq!(format_compact(1_500_000), "1.50M");
/// ```
pub fn format_compact(n: i64) -> String {
    let abs = n.unsigned_abs();
    if abs >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if abs >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}

/// Format a team-signed economic lead: positive favours Radiant, negative Dire.
///
/// # Examples
/// ```
/// use aegis_types::formatting::format_lead;
/// assert_eq!(format_lead(2_500), "Radiant +2.50K");
/// assert_eq!(format_lead(-800), "Dire +800");
/// assert_eq!(format_lead(0), "even");
/// ```
pub fn format_lead(lead: i64) -> String {
    match lead.signum() {
        1 => format!("Radiant +{}", format_compact(lead)),
        -1 => format!("Dire +{}", format_compact(-lead)),
        _ => "even".to_string(),
    }
}

/// Format a percentage from count/total.
///
/// Returns `"0%"` if total is zero.
///
/// # Examples
/// ```
/// use aegis_types::formatting::format_pct_ratio;
/// assert_eq!(format_pct_ratio(3, 10), "30.0%");
/// assert_eq!(format_pct_ratio(0, 0), "0%");
/// ```
pub fn format_pct_ratio(count: i64, total: i64) -> String {
    if total == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", count as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_match_time() {
        assert_eq!(format_match_time(0), "0:00");
        assert_eq!(format_match_time(59), "0:59");
        assert_eq!(format_match_time(60), "1:00");
        assert_eq!(format_match_time(3_725), "62:05");
        assert_eq!(format_match_time(-1), "--:--");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(0), "0");
        assert_eq!(format_compact(999), "999");
        assert_eq!(format_compact(1_000), "1.00K");
        assert_eq!(format_compact(-999), "-999");
        assert_eq!(format_compact(-12_340), "-12.34K");
        assert_eq!(format_compact(1_000_000), "1.00M");
    }

    #[test]
    fn test_format_lead() {
        assert_eq!(format_lead(1), "Radiant +1");
        assert_eq!(format_lead(-15_000), "Dire +15.00K");
        assert_eq!(format_lead(0), "even");
    }

    #[test]
    fn test_format_pct_ratio() {
        assert_eq!(format_pct_ratio(1, 4), "25.0%");
        assert_eq!(format_pct_ratio(5, 0), "0%");
    }
}

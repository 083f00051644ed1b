//! Rate parsing and formatting.
//!
//! All metrics are kept in bits per second; these helpers only convert at
//! the edges (configuration input and human-readable output).

const KILO: f64 = 1_000.0;
const MEGA: f64 = 1_000_000.0;
const GIGA: f64 = 1_000_000_000.0;

pub fn mbps_to_bps(mbps: f64) -> f64 {
    mbps * MEGA
}

pub fn bps_to_mbps(bps: f64) -> f64 {
    bps / MEGA
}

/// Parse a rate string (e.g., "1Mbps", "500 kbit", "1.5Gbit/s") to bits per second
///
/// Supports decimal SI prefixes:
/// - Raw bits per second: "1000", "1000bps", "1000bit", "1000bit/s"
/// - Kilobits: "500k", "500kbps", "500kbit", "500kbit/s"
/// - Megabits: "10M", "10Mbps", "10mbit", "10Mbit/s"
/// - Gigabits: "1G", "1Gbps", "1gbit", "1Gbit/s"
///
/// # Arguments
/// * `rate` - The rate string to parse
///
/// # Returns
/// * `Ok(f64)` - The rate in bits per second
/// * `Err(String)` - An error message if parsing fails
///
/// # Examples
/// ```
/// use bottlenet::metrics::units::parse_rate_to_bps;
///
/// assert_eq!(parse_rate_to_bps("1Mbps"), Ok(1_000_000.0));
/// assert_eq!(parse_rate_to_bps("500 kbit"), Ok(500_000.0));
/// assert_eq!(parse_rate_to_bps("2000"), Ok(2000.0));
/// assert!(parse_rate_to_bps("fast").is_err());
/// ```
pub fn parse_rate_to_bps(rate: &str) -> Result<f64, String> {
    let rate = rate.trim();
    let split = rate
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rate.len());
    let (number, unit) = rate.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| format!("Invalid rate format: '{}'", rate))?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "bps" | "bit" | "bit/s" | "b/s" => 1.0,
        "k" | "kbps" | "kbit" | "kbit/s" | "kb/s" => KILO,
        "m" | "mbps" | "mbit" | "mbit/s" | "mb/s" => MEGA,
        "g" | "gbps" | "gbit" | "gbit/s" | "gb/s" => GIGA,
        other => return Err(format!("Unknown rate unit '{}' in '{}'", other, rate)),
    };

    Ok(value * multiplier)
}

/// Format bits per second as a human-readable string
pub fn format_rate(bps: f64) -> String {
    if bps >= GIGA {
        format!("{:.2} Gbps", bps / GIGA)
    } else if bps >= MEGA {
        format!("{:.2} Mbps", bps / MEGA)
    } else if bps >= KILO {
        format!("{:.2} Kbps", bps / KILO)
    } else {
        format!("{:.0} bps", bps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate_to_bps("1Mbps"), Ok(1_000_000.0));
        assert_eq!(parse_rate_to_bps("10 mbit"), Ok(10_000_000.0));
        assert_eq!(parse_rate_to_bps("1.5Gbit/s"), Ok(1_500_000_000.0));
        assert_eq!(parse_rate_to_bps("250k"), Ok(250_000.0));
        assert_eq!(parse_rate_to_bps(" 800bps "), Ok(800.0));
        assert_eq!(parse_rate_to_bps("42"), Ok(42.0));
    }

    #[test]
    fn test_parse_rate_errors() {
        assert!(parse_rate_to_bps("").is_err());
        assert!(parse_rate_to_bps("Mbps").is_err());
        assert!(parse_rate_to_bps("10 furlongs").is_err());
        assert!(parse_rate_to_bps("-1Mbps").is_err());
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(500.0), "500 bps");
        assert_eq!(format_rate(1_500.0), "1.50 Kbps");
        assert_eq!(format_rate(1_000_000.0), "1.00 Mbps");
        assert_eq!(format_rate(2_500_000_000.0), "2.50 Gbps");
    }

    #[test]
    fn test_mbps_conversion() {
        assert_eq!(mbps_to_bps(1.0), 1_000_000.0);
        assert_eq!(bps_to_mbps(250_000.0), 0.25);
    }
}

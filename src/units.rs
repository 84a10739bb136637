use std::sync::LazyLock;

use regex::Regex;

static GB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([\d.]+)([KMGTP])").unwrap());
static PLAIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").unwrap());
static BYTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([\d.]+)\s*([KMGTP])B?$").unwrap());

/// Convert a human-readable size ("5.3M", "731M", "2T") to gigabytes.
/// Unparseable input counts as zero — an absent log never alarms.
pub fn size_to_gb(size: &str) -> f64 {
    let s = size.trim().to_uppercase();
    if s.is_empty() || s == "0" {
        return 0.0;
    }
    let Some(caps) = GB_RE.captures(&s) else {
        return 0.0;
    };
    let num: f64 = caps[1].parse().unwrap_or(0.0);
    let factor = match &caps[2] {
        "K" => 1.0 / 1024.0 / 1024.0,
        "M" => 1.0 / 1024.0,
        "G" => 1.0,
        "T" => 1024.0,
        "P" => 1024.0 * 1024.0,
        _ => 0.0,
    };
    num * factor
}

/// Parse a configuration value as a comparable number: plain decimals stay
/// as-is, unit-suffixed sizes ("30G", "1.2T", "512MB") become bytes.
pub fn to_number(value: &str) -> Option<f64> {
    let s = value.trim();
    if s.is_empty() {
        return None;
    }
    if PLAIN_RE.is_match(s) {
        return s.parse().ok();
    }
    let caps = BYTES_RE.captures(s)?;
    let num: f64 = caps[1].parse().ok()?;
    let exp = match caps[2].to_uppercase().as_str() {
        "K" => 1,
        "M" => 2,
        "G" => 3,
        "T" => 4,
        "P" => 5,
        _ => return None,
    };
    Some(num * 1024f64.powi(exp))
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn megabytes_to_gb() {
        let gb = size_to_gb("5.3M");
        assert!((gb - 5.3 / 1024.0).abs() < 1e-9);
    }

    #[test]
    fn terabytes_to_gb() {
        assert_eq!(size_to_gb("2T"), 2048.0);
    }

    #[test]
    fn zero_and_garbage() {
        assert_eq!(size_to_gb("0"), 0.0);
        assert_eq!(size_to_gb(""), 0.0);
        assert_eq!(size_to_gb("n/a"), 0.0);
    }

    #[test]
    fn lowercase_unit() {
        assert_eq!(size_to_gb("1g"), 1.0);
    }

    #[test]
    fn plain_number() {
        assert_eq!(to_number("1024"), Some(1024.0));
        assert_eq!(to_number("0.5"), Some(0.5));
    }

    #[test]
    fn unit_suffixed() {
        assert_eq!(to_number("30G"), Some(30.0 * 1024.0 * 1024.0 * 1024.0));
        assert_eq!(to_number("1.5K"), Some(1536.0));
        assert_eq!(to_number("512MB"), Some(512.0 * 1024.0 * 1024.0));
    }

    #[test]
    fn unparseable() {
        assert_eq!(to_number(""), None);
        assert_eq!(to_number("auto"), None);
        assert_eq!(to_number("12Q"), None);
    }
}

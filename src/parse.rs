// src/parse.rs
//
// Parsers for the loosely-formatted cells of the scraped-product export.
// Policy throughout: best effort. Malformed trend/geo segments are dropped
// silently and scalar parsers degrade to 0 (or NaN for a garbled numeric
// prefix) instead of failing the row. The export is dirty by nature and a
// partially-parsed row is worth more than no row.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{GeoShare, TrendPoint};

/// JS-`parseFloat` style scan: longest leading `[+-]?digits[.digits]` prefix,
/// NaN when the string starts with no number at all.
fn leading_float(s: &str) -> f64 {
    let t = s.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in t.char_indices() {
        match c {
            '+' | '-' if i == 0 => end = i + 1,
            '0'..='9' => {
                seen_digit = true;
                end = i + 1;
            }
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return f64::NAN;
    }
    t[..end].trim_end_matches('.').parse().unwrap_or(f64::NAN)
}

fn suffix_multiplier(c: char) -> Option<f64> {
    match c {
        'K' => Some(1e3),
        'M' => Some(1e6),
        'B' => Some(1e9),
        _ => None,
    }
}

/// "219.9K" -> 219_900, "1.5M" -> 1_500_000, "" / "0" -> 0.
///
/// A garbled numeric prefix yields NaN (propagated, not raised); use
/// [`try_parse_visits`] when "zero" and "unparsable" must stay distinct.
pub fn parse_visits(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() || t == "0" {
        return 0.0;
    }
    match t.chars().last().and_then(suffix_multiplier) {
        Some(mult) => leading_float(&t[..t.len() - 1]) * mult,
        None => leading_float(t),
    }
}

/// Strict variant of [`parse_visits`]: `None` unless the whole string is a
/// clean number with an optional K/M/B suffix.
pub fn try_parse_visits(s: &str) -> Option<f64> {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\s*([+-]?\d+(?:\.\d+)?)\s*([KMB])?\s*$").unwrap());
    let c = RE.captures(s)?;
    let num: f64 = c.get(1)?.as_str().parse().ok()?;
    let mult = c
        .get(2)
        .and_then(|m| m.as_str().chars().next())
        .and_then(suffix_multiplier)
        .unwrap_or(1.0);
    Some(num * mult)
}

/// "HH:MM:SS" -> seconds; 0 unless exactly 3 colon-separated parts.
pub fn parse_duration(s: &str) -> f64 {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 3 {
        return 0.0;
    }
    let h = leading_float(parts[0]);
    let m = leading_float(parts[1]);
    let sec = leading_float(parts[2]);
    h * 3600.0 + m * 60.0 + sec
}

/// "45.31%" -> 45.31; 0 for empty input.
pub fn parse_bounce_rate(s: &str) -> f64 {
    let t = s.trim();
    if t.is_empty() {
        return 0.0;
    }
    leading_float(t.trim_end_matches('%'))
}

/// "Aug 2025: 219.9K | Sep 2025: 192.8K" -> ordered points.
/// Segments not matching `<label>: <number><optional K/M>` are dropped.
pub fn parse_trend_data(s: &str) -> Vec<TrendPoint> {
    static SEG: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?P<label>[^:]+):\s*(?P<num>\d+(?:\.\d+)?)(?P<suf>[KM])?\s*$").unwrap()
    });

    s.split('|')
        .filter_map(|seg| {
            let c = SEG.captures(seg.trim())?;
            let num: f64 = c.name("num")?.as_str().parse().ok()?;
            let mult = c
                .name("suf")
                .and_then(|m| m.as_str().chars().next())
                .and_then(suffix_multiplier)
                .unwrap_or(1.0);
            let suf = c.name("suf").map(|m| m.as_str()).unwrap_or("");
            Some(TrendPoint {
                period: c.name("label")?.as_str().trim().to_string(),
                value: num * mult,
                formatted_value: format!("{}{}", c.name("num")?.as_str(), suf),
            })
        })
        .collect()
}

/// "RU: 24% | US: 10.31%" -> shares. Segments not matching
/// `<2-letter code or "Others">: <float>%` are dropped.
pub fn parse_geo_distribution(s: &str) -> Vec<GeoShare> {
    static SEG: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^(?P<code>[A-Za-z]{2}|Others):\s*(?P<pct>\d+(?:\.\d+)?)%$").unwrap()
    });

    s.split('|')
        .filter_map(|seg| {
            let c = SEG.captures(seg.trim())?;
            Some(GeoShare {
                code: c.name("code")?.as_str().to_string(),
                percentage: c.name("pct")?.as_str().parse().ok()?,
            })
        })
        .collect()
}

/// Inverse of [`parse_visits`] for report output: 1_500_000 -> "1.5M".
pub fn format_visits(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let (scaled, suffix) = if v.abs() >= 1e9 {
        (v / 1e9, "B")
    } else if v.abs() >= 1e6 {
        (v / 1e6, "M")
    } else if v.abs() >= 1e3 {
        (v / 1e3, "K")
    } else {
        (v, "")
    };
    let mut num = format!("{:.1}", scaled);
    if num.ends_with(".0") {
        num.truncate(num.len() - 2);
    }
    format!("{}{}", num, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_suffixes() {
        assert_eq!(parse_visits("1.5M"), 1_500_000.0);
        assert_eq!(parse_visits("219.9K"), 219_900.0);
        assert_eq!(parse_visits("2B"), 2_000_000_000.0);
        assert_eq!(parse_visits("512"), 512.0);
    }

    #[test]
    fn visits_empty_and_zero() {
        assert_eq!(parse_visits(""), 0.0);
        assert_eq!(parse_visits("0"), 0.0);
        assert_eq!(parse_visits("  "), 0.0);
    }

    #[test]
    fn visits_garbage_is_nan_not_panic() {
        assert!(parse_visits("n/a").is_nan());
        // parseFloat semantics: leading number wins, tail ignored
        assert_eq!(parse_visits("12.3abc"), 12.3);
    }

    #[test]
    fn try_visits_distinguishes_zero_from_garbage() {
        assert_eq!(try_parse_visits("0"), Some(0.0));
        assert_eq!(try_parse_visits("1.5M"), Some(1_500_000.0));
        assert_eq!(try_parse_visits("n/a"), None);
        assert_eq!(try_parse_visits("12.3abc"), None);
    }

    #[test]
    fn duration_exact_three_parts() {
        assert_eq!(parse_duration("01:02:03"), 3723.0);
        assert_eq!(parse_duration("00:00:00"), 0.0);
        assert_eq!(parse_duration(""), 0.0);
        assert_eq!(parse_duration("1:2"), 0.0);
        assert_eq!(parse_duration("1:2:3:4"), 0.0);
    }

    #[test]
    fn bounce_rate() {
        assert_eq!(parse_bounce_rate("45.31%"), 45.31);
        assert_eq!(parse_bounce_rate("60"), 60.0);
        assert_eq!(parse_bounce_rate(""), 0.0);
    }

    #[test]
    fn trend_parses_in_source_order() {
        let pts = parse_trend_data("Aug 2025: 219.9K | Sep 2025: 192.8K | Oct 2025: 1.2M");
        assert_eq!(pts.len(), 3);
        assert_eq!(pts[0].period, "Aug 2025");
        assert_eq!(pts[0].value, 219_900.0);
        assert_eq!(pts[0].formatted_value, "219.9K");
        assert_eq!(pts[2].value, 1_200_000.0);
    }

    #[test]
    fn trend_drops_malformed_segments_silently() {
        let pts = parse_trend_data("Aug 2025: 10K | garbage | Sep 2025: oops | Oct 2025: 12K");
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].period, "Aug 2025");
        assert_eq!(pts[1].period, "Oct 2025");
    }

    #[test]
    fn trend_empty_input() {
        assert!(parse_trend_data("").is_empty());
    }

    #[test]
    fn geo_matches_codes_and_others() {
        let g = parse_geo_distribution("RU: 24% | US: 10.31% | Others: 5%");
        assert_eq!(g.len(), 3);
        assert_eq!(g[0].code, "RU");
        assert_eq!(g[0].percentage, 24.0);
        assert_eq!(g[2].code, "Others");
    }

    #[test]
    fn geo_drops_malformed_segments_silently() {
        let g = parse_geo_distribution("USA: 24% | US: 10% | DE 5% | FR: x%");
        assert_eq!(g.len(), 1);
        assert_eq!(g[0].code, "US");
    }

    #[test]
    fn format_visits_roundtrips_common_scales() {
        assert_eq!(format_visits(1_500_000.0), "1.5M");
        assert_eq!(format_visits(219_900.0), "219.9K");
        assert_eq!(format_visits(2_000_000_000.0), "2B");
        assert_eq!(format_visits(512.0), "512");
        assert_eq!(format_visits(f64::NAN), "0");
    }
}

// src/process.rs
//
// Raw CSV rows -> typed products with derived growth metrics. Pure value
// mapping, no I/O; identical input yields identical output.

use tracing::debug;

use crate::models::{ProcessedProduct, RawProduct, TrendPoint};
use crate::parse::{
    parse_bounce_rate, parse_duration, parse_geo_distribution, parse_trend_data, parse_visits,
};

/// Endpoint-to-endpoint percentage change of the series; 0 when there are
/// fewer than 2 points or the first value is 0.
pub fn calculate_growth_rate(trend: &[TrendPoint]) -> f64 {
    if trend.len() < 2 {
        return 0.0;
    }
    let first = trend[0].value;
    let last = trend[trend.len() - 1].value;
    if first == 0.0 {
        return 0.0;
    }
    (last - first) / first * 100.0
}

/// Mean of period-over-period percentage changes, skipping any step whose
/// previous value is 0; 0 when no valid step exists.
pub fn calculate_avg_growth_rate(trend: &[TrendPoint]) -> f64 {
    if trend.len() < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut steps = 0usize;
    for w in trend.windows(2) {
        if w[0].value == 0.0 {
            continue;
        }
        sum += (w[1].value - w[0].value) / w[0].value * 100.0;
        steps += 1;
    }
    if steps == 0 {
        0.0
    } else {
        sum / steps as f64
    }
}

fn split_list(s: &str, sep: &str) -> Vec<String> {
    s.split(sep)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// A scraper `error` cell is a string; anything non-empty that isn't a
/// spelled-out false counts as flagged.
fn is_error_row(raw: &RawProduct) -> bool {
    let t = raw.error.trim();
    !(t.is_empty() || t.eq_ignore_ascii_case("false") || t == "0")
}

pub fn process_product(raw: &RawProduct) -> ProcessedProduct {
    let trend = parse_trend_data(&raw.trend_data);
    let growth_rate = calculate_growth_rate(&trend);
    let avg_growth_rate = calculate_avg_growth_rate(&trend);

    ProcessedProduct {
        name: raw.name.trim().to_string(),
        url: raw.url.trim().to_string(),
        description: raw.description.trim().to_string(),
        feature_list: split_list(&raw.features, "||"),
        visit_number: parse_visits(&raw.monthly_visits),
        duration_seconds: parse_duration(&raw.avg_duration),
        rank_number: parse_visits(&raw.rank),
        bounce_number: parse_bounce_rate(&raw.bounce_rate),
        category_list: split_list(&raw.category, "|"),
        geo: parse_geo_distribution(&raw.geo_distribution),
        trend,
        growth_rate,
        avg_growth_rate,
    }
}

/// Drops rows the scraper flagged as failed, then types the rest.
pub fn process_all_products(raw: &[RawProduct]) -> Vec<ProcessedProduct> {
    let before = raw.len();
    let out: Vec<ProcessedProduct> = raw
        .iter()
        .filter(|r| !is_error_row(r))
        .map(process_product)
        .collect();
    let dropped = before - out.len();
    if dropped > 0 {
        debug!("Dropped flagged rows - dropped={}, retained={}", dropped, out.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str, category: &str, visits: &str, trend: &str, error: &str) -> RawProduct {
        RawProduct {
            name: name.to_string(),
            url: format!("https://example.com/{}", name),
            scraped_at: "2025-11-01T00:00:00Z".to_string(),
            category: category.to_string(),
            description: String::new(),
            features: String::new(),
            monthly_visits: visits.to_string(),
            avg_duration: "00:01:30".to_string(),
            rank: "1200".to_string(),
            bounce_rate: "45%".to_string(),
            trend_data: trend.to_string(),
            geo_distribution: String::new(),
            error: error.to_string(),
        }
    }

    fn pts(values: &[f64]) -> Vec<TrendPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| TrendPoint {
                period: format!("P{}", i),
                value: v,
                formatted_value: v.to_string(),
            })
            .collect()
    }

    #[test]
    fn growth_rate_needs_two_points() {
        assert_eq!(calculate_growth_rate(&pts(&[])), 0.0);
        assert_eq!(calculate_growth_rate(&pts(&[100.0])), 0.0);
        assert_eq!(calculate_avg_growth_rate(&pts(&[100.0])), 0.0);
    }

    #[test]
    fn growth_rate_endpoint_to_endpoint() {
        assert_eq!(calculate_growth_rate(&pts(&[100.0, 150.0])), 50.0);
        assert_eq!(calculate_growth_rate(&pts(&[100.0, 300.0, 150.0])), 50.0);
        assert_eq!(calculate_growth_rate(&pts(&[0.0, 150.0])), 0.0);
    }

    #[test]
    fn avg_growth_rate_skips_zero_previous() {
        // 100 -> 200 (+100%), 200 -> 0 (-100%), 0 -> 50 (skipped)
        let t = pts(&[100.0, 200.0, 0.0, 50.0]);
        assert_eq!(calculate_avg_growth_rate(&t), 0.0); // (+100 - 100) / 2
        let t = pts(&[0.0, 0.0, 0.0]);
        assert_eq!(calculate_avg_growth_rate(&t), 0.0);
    }

    #[test]
    fn process_parses_and_derives() {
        let p = process_product(&raw(
            "alpha",
            " AI Writing | SEO | AI Writing ",
            "10K",
            "Jan: 10K | Feb: 20K",
            "",
        ));
        assert_eq!(p.visit_number, 10_000.0);
        assert_eq!(p.duration_seconds, 90.0);
        assert_eq!(p.bounce_number, 45.0);
        // trimmed, order-preserving, duplicates kept
        assert_eq!(p.category_list, vec!["AI Writing", "SEO", "AI Writing"]);
        assert_eq!(p.growth_rate, 100.0);
        assert_eq!(p.avg_growth_rate, 100.0);
    }

    #[test]
    fn error_rows_never_survive() {
        let rows = vec![
            raw("a", "X", "10K", "", ""),
            raw("b", "Y", "5K", "", "true"),
            raw("c", "Z", "1K", "", "fetch failed"),
            raw("d", "W", "2K", "", "false"),
        ];
        let out = process_all_products(&rows);
        let names: Vec<&str> = out.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "d"]);
    }

    #[test]
    fn processing_is_idempotent() {
        let rows = vec![
            raw("a", "X|Y", "10K", "Jan: 10K | Feb: 20K", ""),
            raw("b", "X", "5K", "Jan: 5K | Feb: 4K", ""),
        ];
        assert_eq!(process_all_products(&rows), process_all_products(&rows));
    }
}

use serde::{Deserialize, Serialize};

/// One row of the scraped-product CSV export. Every cell arrives as a string;
/// the processor owns all typing. `error` is set by the scraper when a fetch
/// failed and the row carries junk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProduct {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub scraped_at: String, // ISO8601-ish, untrusted
    #[serde(default)]
    pub category: String, // pipe-delimited, e.g. "AI Writing|SEO"
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub features: String, // double-pipe-delimited
    #[serde(default)]
    pub monthly_visits: String, // "219.9K", "1.5M"
    #[serde(default)]
    pub avg_duration: String, // "HH:MM:SS"
    #[serde(default)]
    pub rank: String,
    #[serde(default)]
    pub bounce_rate: String, // "45.31%"
    #[serde(default)]
    pub trend_data: String, // "Aug 2025: 219.9K | Sep 2025: 192.8K"
    #[serde(default)]
    pub geo_distribution: String, // "RU: 24% | US: 10.31%"
    #[serde(default)]
    pub error: String,
}

/// One point of a product's monthly traffic series, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: String,
    pub value: f64,
    pub formatted_value: String, // original segment text, e.g. "219.9K"
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoShare {
    pub code: String, // "US", "RU", or "Others"
    pub percentage: f64,
}

/// A product after typing and metric derivation. Built once per row, never
/// mutated afterwards.
///
/// The two growth fields are deliberately distinct: `growth_rate` is the
/// endpoint-to-endpoint percentage change of the trend series, while
/// `avg_growth_rate` is the mean of the period-over-period changes. Different
/// views read different fields; do not collapse them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedProduct {
    pub name: String,
    pub url: String,
    pub description: String,
    pub feature_list: Vec<String>,
    pub visit_number: f64,
    pub duration_seconds: f64,
    pub rank_number: f64,
    pub bounce_number: f64, // 0..100
    /// Trimmed, order-preserving, duplicates from the source kept. A product
    /// with N tags contributes to N category buckets downstream.
    pub category_list: Vec<String>,
    pub trend: Vec<TrendPoint>,
    pub geo: Vec<GeoShare>,
    /// Percentage change from first to last trend point; 0 when the series
    /// has fewer than 2 points or starts at 0.
    pub growth_rate: f64,
    /// Mean of period-over-period percentage changes, skipping steps whose
    /// previous value is 0; 0 when no valid step exists.
    pub avg_growth_rate: f64,
}

/// Aggregates for one distinct tag across the whole dataset.
///
/// `growth_rate` / `avg_growth_rate` mirror the product-level pair: mean of
/// member `growth_rate`s vs mean of member `avg_growth_rate`s.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub category: String,
    pub product_count: usize,
    pub total_visits: f64,
    pub avg_visits: f64,
    pub avg_growth_rate: f64,
    pub growth_rate: f64,
    pub avg_bounce_rate: f64,
    pub avg_duration: f64,
    /// Top 3 members by `avg_growth_rate` descending.
    pub top_products: Vec<ProcessedProduct>,
}

/// A category that passed the niche filter, with its opportunity score.
#[derive(Debug, Clone, Serialize)]
pub struct OpportunityCategory {
    pub category: String,
    pub product_count: usize,
    pub avg_visits: f64,
    pub avg_growth_rate: f64,
    /// 0..100; 70% capped growth + 30% inverse scale.
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboTrendPoint {
    pub period: String,
    pub total_visits: f64,
    pub avg_visits: f64,
}

/// A k-element tag set plus every product whose `category_list` covers it
/// (extra tags on the product are allowed).
#[derive(Debug, Clone, Serialize)]
pub struct TagCombination {
    pub combo_id: String, // stable xxh3 of the tag set
    pub tags: Vec<String>,
    pub product_count: usize,
    pub product_names: Vec<String>,
    pub total_visits: f64,
    pub avg_visits: f64,
    pub avg_growth_rate: f64,
    pub growth_rate: f64,
    pub avg_bounce_rate: f64,
    pub avg_duration: f64,
    /// Union of member trend periods, sorted by period string.
    pub trend: Vec<ComboTrendPoint>,
}

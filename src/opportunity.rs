// src/opportunity.rs
//
// Surfaces "small but fast-growing" niches: categories with few products and
// high average growth. The scorer itself never retries; when a threshold is
// too strict the caller loosens it (see the ladder in pipeline.rs).

use crate::models::{CategoryStats, OpportunityCategory};
use crate::util::sort_desc_by;

const GROWTH_WEIGHT: f64 = 70.0;
const SCALE_WEIGHT: f64 = 30.0;

/// Filter `product_count <= max_product_count && avg_growth_rate >=
/// min_growth_rate`, score, sort descending. Growth above 100% earns no
/// extra credit; smaller categories score higher on the scale term.
/// Returns `[]` when nothing qualifies.
pub fn find_opportunity_categories(
    stats: &[CategoryStats],
    max_product_count: usize,
    min_growth_rate: f64,
) -> Vec<OpportunityCategory> {
    let mut out: Vec<OpportunityCategory> = stats
        .iter()
        .filter(|c| c.product_count <= max_product_count && c.avg_growth_rate >= min_growth_rate)
        .map(|c| {
            let growth_term = (c.avg_growth_rate / 100.0).min(1.0) * GROWTH_WEIGHT;
            let scale_term =
                (1.0 - c.product_count as f64 / max_product_count as f64) * SCALE_WEIGHT;
            OpportunityCategory {
                category: c.category.clone(),
                product_count: c.product_count,
                avg_visits: c.avg_visits,
                avg_growth_rate: c.avg_growth_rate,
                score: growth_term + scale_term,
            }
        })
        .collect();
    sort_desc_by(&mut out, |o| o.score);
    out
}

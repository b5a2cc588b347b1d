// src/categories.rs
//
// Multi-label category aggregation: a product with N tags lands in N
// buckets, so product counts across categories exceed the dataset size.
// That multiplicity is the taxonomy, not double counting.

use std::collections::HashMap;

use crate::models::{CategoryStats, ProcessedProduct};
use crate::util::sort_desc_by;

const TOP_PRODUCTS_PER_CATEGORY: usize = 3;

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// One pass over the dataset building a tag -> members multimap, then a
/// reduction per bucket. Result order is first-occurrence order of each tag,
/// not a ranking; use the `get_top_*` sorts for that.
pub fn calculate_category_stats(products: &[ProcessedProduct]) -> Vec<CategoryStats> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<&ProcessedProduct>> = HashMap::new();

    for p in products {
        for tag in &p.category_list {
            if !buckets.contains_key(tag) {
                order.push(tag.clone());
            }
            buckets.entry(tag.clone()).or_default().push(p);
        }
    }

    order
        .into_iter()
        .map(|category| {
            let members = &buckets[&category];
            let n = members.len();
            let total_visits: f64 = members.iter().map(|p| p.visit_number).sum();
            let avg_growth_rate = mean(members.iter().map(|p| p.avg_growth_rate).sum(), n);
            let growth_rate = mean(members.iter().map(|p| p.growth_rate).sum(), n);
            let avg_bounce_rate = mean(members.iter().map(|p| p.bounce_number).sum(), n);
            let avg_duration = mean(members.iter().map(|p| p.duration_seconds).sum(), n);

            let mut ranked: Vec<&ProcessedProduct> = members.clone();
            sort_desc_by(&mut ranked, |p| p.avg_growth_rate);
            let top_products: Vec<ProcessedProduct> = ranked
                .into_iter()
                .take(TOP_PRODUCTS_PER_CATEGORY)
                .cloned()
                .collect();

            CategoryStats {
                category,
                product_count: n,
                avg_visits: mean(total_visits, n),
                total_visits,
                avg_growth_rate,
                growth_rate,
                avg_bounce_rate,
                avg_duration,
                top_products,
            }
        })
        .collect()
}

/// Stable sort by `avg_growth_rate` descending, truncated. Non-mutating.
pub fn get_top_growth_categories(stats: &[CategoryStats], limit: usize) -> Vec<CategoryStats> {
    let mut out: Vec<CategoryStats> = stats.to_vec();
    sort_desc_by(&mut out, |c| c.avg_growth_rate);
    out.truncate(limit);
    out
}

/// Stable sort by `total_visits` descending, truncated. Non-mutating.
pub fn get_top_traffic_categories(stats: &[CategoryStats], limit: usize) -> Vec<CategoryStats> {
    let mut out: Vec<CategoryStats> = stats.to_vec();
    sort_desc_by(&mut out, |c| c.total_visits);
    out.truncate(limit);
    out
}

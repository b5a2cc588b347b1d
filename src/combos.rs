// src/combos.rs
//
// Tag co-occurrence analysis: enumerate k-element subsets of the tag
// vocabulary, find every product carrying the whole subset, and rank the
// surviving combinations. This is the expensive part of the pipeline,
// O(C(n,k) * m) before the cap, so the per-combination matching runs on
// rayon and enumeration stops at a hard cap.

use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::models::{ComboTrendPoint, ProcessedProduct, TagCombination};
use crate::util::sort_desc_by;

/// Enumeration stops after this many subsets unless overridden. Truncation
/// is silent and order-dependent: the same input always yields the same
/// truncated set, but a large vocabulary means not every subset is seen.
pub const DEFAULT_COMBINATION_CAP: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboSortKey {
    ProductCount,
    TotalVisits,
    AvgGrowthRate,
}

/// Distinct tags across all products, in order of first appearance.
fn distinct_tags(products: &[ProcessedProduct]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for p in products {
        for tag in &p.category_list {
            if seen.insert(tag.clone()) {
                out.push(tag.clone());
            }
        }
    }
    out
}

/// Head/tail subset generation: at each element, branch into "take it" then
/// "skip it". Not lexicographic, but deterministic for a fixed input order,
/// which is what makes the cap reproducible.
fn generate(
    tags: &[String],
    k: usize,
    prefix: &mut Vec<String>,
    out: &mut Vec<Vec<String>>,
    cap: usize,
) {
    if out.len() >= cap {
        return;
    }
    if k == 0 {
        out.push(prefix.clone());
        return;
    }
    if tags.len() < k {
        return;
    }
    prefix.push(tags[0].clone());
    generate(&tags[1..], k - 1, prefix, out, cap);
    prefix.pop();
    generate(&tags[1..], k, prefix, out, cap);
}

fn combinations_capped(tags: &[String], k: usize, cap: usize) -> Vec<Vec<String>> {
    let mut out = Vec::new();
    let mut prefix = Vec::with_capacity(k);
    generate(tags, k, &mut prefix, &mut out, cap);
    if out.len() >= cap {
        debug!(
            "Combination cap hit - tags={}, size={}, cap={}",
            tags.len(),
            k,
            cap
        );
    }
    out
}

fn mean(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn combination_stats(tags: Vec<String>, members: Vec<&ProcessedProduct>) -> TagCombination {
    let n = members.len();
    let total_visits: f64 = members.iter().map(|p| p.visit_number).sum();

    // period -> (total visits, #members reporting that period)
    let mut periods: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for p in &members {
        for pt in &p.trend {
            let e = periods.entry(pt.period.clone()).or_insert((0.0, 0));
            e.0 += pt.value;
            e.1 += 1;
        }
    }
    let trend: Vec<ComboTrendPoint> = periods
        .into_iter()
        .map(|(period, (total, count))| ComboTrendPoint {
            period,
            total_visits: total,
            avg_visits: mean(total, count),
        })
        .collect();

    let combo_id = format!("{:016x}", xxh3_64(tags.join("|").as_bytes()));

    TagCombination {
        combo_id,
        product_count: n,
        product_names: members.iter().map(|p| p.name.clone()).collect(),
        avg_visits: mean(total_visits, n),
        total_visits,
        avg_growth_rate: mean(members.iter().map(|p| p.avg_growth_rate).sum(), n),
        growth_rate: mean(members.iter().map(|p| p.growth_rate).sum(), n),
        avg_bounce_rate: mean(members.iter().map(|p| p.bounce_number).sum(), n),
        avg_duration: mean(members.iter().map(|p| p.duration_seconds).sum(), n),
        tags,
        trend,
    }
}

/// Enumerate capped k-subsets of the tag vocabulary, keep those carried in
/// full by at least `min_products` products (extra tags on a product are
/// fine), aggregate each, and sort by member count descending.
pub fn analyze_tag_combinations(
    products: &[ProcessedProduct],
    min_products: usize,
    combination_size: usize,
    max_combinations: usize,
) -> Vec<TagCombination> {
    if combination_size == 0 {
        return Vec::new();
    }
    let tags = distinct_tags(products);
    let subsets = combinations_capped(&tags, combination_size, max_combinations);
    debug!(
        "Combination enumeration - vocabulary={}, size={}, candidates={}",
        tags.len(),
        combination_size,
        subsets.len()
    );

    // Matching is the hot loop; rayon keeps input order on collect, so the
    // result is independent of scheduling.
    let mut combos: Vec<TagCombination> = subsets
        .into_par_iter()
        .filter_map(|subset| {
            let members: Vec<&ProcessedProduct> = products
                .iter()
                .filter(|p| subset.iter().all(|t| p.category_list.contains(t)))
                .collect();
            if members.len() < min_products {
                return None;
            }
            Some(combination_stats(subset, members))
        })
        .collect();

    sort_desc_by(&mut combos, |c| c.product_count as f64);
    combos
}

/// Re-rank by the requested key and truncate. Stable and non-mutating.
pub fn get_top_tag_combinations(
    combos: &[TagCombination],
    sort_key: ComboSortKey,
    limit: usize,
) -> Vec<TagCombination> {
    let mut out: Vec<TagCombination> = combos.to_vec();
    match sort_key {
        ComboSortKey::ProductCount => sort_desc_by(&mut out, |c| c.product_count as f64),
        ComboSortKey::TotalVisits => sort_desc_by(&mut out, |c| c.total_visits),
        ComboSortKey::AvgGrowthRate => sort_desc_by(&mut out, |c| c.avg_growth_rate),
    }
    out.truncate(limit);
    out
}

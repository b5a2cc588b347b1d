// src/similarity.rs

use crate::models::ProcessedProduct;
use crate::util::sort_desc_by;

#[derive(Debug, Clone, Copy)]
pub struct SimilarityWeights {
    pub category_overlap: f64, // 0.40
    pub visit_scale: f64,      // 0.30
    pub growth_proximity: f64, // 0.30
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            category_overlap: 0.40,
            visit_scale: 0.30,
            growth_proximity: 0.30,
        }
    }
}

/// Shared-tag count over the larger list length. Deliberately not true
/// Jaccard (the denominator is max, not union); duplicates on the first list
/// count once each, matching how the tag lists are carried everywhere else.
fn category_overlap(a: &[String], b: &[String]) -> f64 {
    let longer = a.len().max(b.len());
    if longer == 0 {
        return 0.0;
    }
    let shared = a.iter().filter(|t| b.contains(t)).count();
    shared as f64 / longer as f64
}

/// min/max of the two visit counts: symmetric, in [0,1]. Two zero-traffic
/// products contribute 0 here rather than 0/0.
fn visit_scale_ratio(a: f64, b: f64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi > 0.0 {
        lo / hi
    } else {
        0.0
    }
}

/// 1 at equal growth, fading linearly to 0 once the gap reaches 100 points.
fn growth_proximity(a: f64, b: f64) -> f64 {
    (1.0 - (a - b).abs() / 100.0).max(0.0)
}

pub fn product_similarity(
    a: &ProcessedProduct,
    b: &ProcessedProduct,
    w: SimilarityWeights,
) -> f64 {
    w.category_overlap * category_overlap(&a.category_list, &b.category_list)
        + w.visit_scale * visit_scale_ratio(a.visit_number, b.visit_number)
        + w.growth_proximity * growth_proximity(a.growth_rate, b.growth_rate)
}

/// Nearest neighbours of `target` (excluded by name equality), best first,
/// at most `limit`. Ties keep input order (stable sort).
pub fn find_similar_products(
    target: &ProcessedProduct,
    all: &[ProcessedProduct],
    limit: usize,
    weights: SimilarityWeights,
) -> Vec<ProcessedProduct> {
    let mut scored: Vec<(f64, &ProcessedProduct)> = all
        .iter()
        .filter(|p| p.name != target.name)
        .map(|p| (product_similarity(target, p, weights), p))
        .collect();
    sort_desc_by(&mut scored, |(s, _)| *s);
    scored.into_iter().take(limit).map(|(_, p)| p.clone()).collect()
}

// src/pipeline.rs

use std::path::PathBuf;

use anyhow::{bail, Result};
use tracing::{debug, info, warn};

use crate::categories::{
    calculate_category_stats, get_top_growth_categories, get_top_traffic_categories,
};
use crate::combos::analyze_tag_combinations;
use crate::load::read_products_file;
use crate::models::{
    CategoryStats, OpportunityCategory, ProcessedProduct, RawProduct, TagCombination,
};
use crate::opportunity::find_opportunity_categories;
use crate::process::process_all_products;
use crate::report::write_all_reports;
use crate::similarity::{find_similar_products, SimilarityWeights};
use crate::util::sort_desc_by;

pub struct RunParams {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub min_products: usize,
    pub combination_size: usize,
    pub max_combinations: usize,
    pub max_category_size: usize,
    pub min_growth: f64,
    pub top_limit: usize,
    pub similar_limit: usize,
}

/// Everything one run derives from the raw rows. Recomputed from scratch
/// each run; earlier stages are never mutated by later ones.
pub struct Analysis {
    pub products: Vec<ProcessedProduct>,
    pub stats: Vec<CategoryStats>,
    pub top_growth: Vec<CategoryStats>,
    pub top_traffic: Vec<CategoryStats>,
    pub opportunities: Vec<OpportunityCategory>,
    /// The threshold the ladder settled on.
    pub opportunity_threshold: f64,
    pub combos: Vec<TagCombination>,
    /// (product name, nearest neighbours) for the top products by traffic.
    pub similar: Vec<(String, Vec<ProcessedProduct>)>,
}

/// The scorer returns `[]` when a threshold is too strict; loosen stepwise
/// rather than show an empty matrix.
fn opportunity_ladder(
    stats: &[CategoryStats],
    max_category_size: usize,
    min_growth: f64,
) -> (Vec<OpportunityCategory>, f64) {
    let mut rungs = vec![min_growth];
    for fallback in [5.0, 0.0, -100.0] {
        if fallback < min_growth && !rungs.contains(&fallback) {
            rungs.push(fallback);
        }
    }
    let last = *rungs.last().unwrap();
    for threshold in rungs {
        let found = find_opportunity_categories(stats, max_category_size, threshold);
        if !found.is_empty() {
            if threshold != min_growth {
                warn!(
                    "Opportunity threshold loosened - requested={}, used={}, matches={}",
                    min_growth,
                    threshold,
                    found.len()
                );
            }
            return (found, threshold);
        }
        debug!("No opportunities at threshold {}", threshold);
    }
    (Vec::new(), last)
}

pub fn analyze(raw: &[RawProduct], params: &RunParams) -> Analysis {
    let stage = std::time::Instant::now();
    let products = process_all_products(raw);
    info!(
        "Processing completed - rows={}, products={}, duration={:.2}s",
        raw.len(),
        products.len(),
        stage.elapsed().as_secs_f32()
    );

    let stage = std::time::Instant::now();
    let stats = calculate_category_stats(&products);
    let top_growth = get_top_growth_categories(&stats, params.top_limit);
    let top_traffic = get_top_traffic_categories(&stats, params.top_limit);
    info!(
        "Category aggregation completed - categories={}, duration={:.2}s",
        stats.len(),
        stage.elapsed().as_secs_f32()
    );

    let (opportunities, opportunity_threshold) =
        opportunity_ladder(&stats, params.max_category_size, params.min_growth);
    info!(
        "Opportunity scoring completed - niches={}, threshold={}",
        opportunities.len(),
        opportunity_threshold
    );

    let stage = std::time::Instant::now();
    let combos = analyze_tag_combinations(
        &products,
        params.min_products,
        params.combination_size,
        params.max_combinations,
    );
    info!(
        "Tag combination analysis completed - combinations={}, duration={:.2}s",
        combos.len(),
        stage.elapsed().as_secs_f32()
    );

    let stage = std::time::Instant::now();
    let mut by_traffic: Vec<&ProcessedProduct> = products.iter().collect();
    sort_desc_by(&mut by_traffic, |p| p.visit_number);
    let weights = SimilarityWeights::default();
    let similar: Vec<(String, Vec<ProcessedProduct>)> = by_traffic
        .into_iter()
        .take(params.top_limit)
        .map(|p| {
            (
                p.name.clone(),
                find_similar_products(p, &products, params.similar_limit, weights),
            )
        })
        .collect();
    info!(
        "Similarity pass completed - targets={}, duration={:.2}s",
        similar.len(),
        stage.elapsed().as_secs_f32()
    );

    Analysis {
        products,
        stats,
        top_growth,
        top_traffic,
        opportunities,
        opportunity_threshold,
        combos,
        similar,
    }
}

pub fn run(params: &RunParams) -> Result<()> {
    let pipeline_start = std::time::Instant::now();
    info!(
        "Pipeline started - input={}, output_dir={}",
        params.input.display(),
        params.output_dir.display()
    );

    let raw = read_products_file(&params.input)?;
    if raw.is_empty() {
        bail!("No rows in {} (empty export?)", params.input.display());
    }

    let analysis = analyze(&raw, params);
    if analysis.products.is_empty() {
        bail!("Every row was flagged by the scraper; nothing to analyze");
    }

    write_all_reports(&params.output_dir, &params.input.display().to_string(), &analysis)?;

    info!(
        "Pipeline completed - duration={:.2}s, products={}, categories={}, combinations={}",
        pipeline_start.elapsed().as_secs_f32(),
        analysis.products.len(),
        analysis.stats.len(),
        analysis.combos.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::read_products;

    fn params() -> RunParams {
        RunParams {
            input: PathBuf::from("unused.csv"),
            output_dir: PathBuf::from("out"),
            min_products: 2,
            combination_size: 2,
            max_combinations: 1000,
            max_category_size: 10,
            min_growth: 5.0,
            top_limit: 10,
            similar_limit: 5,
        }
    }

    const SCENARIO_CSV: &str = "\
name,category,monthly_visits,trend_data,error
A,X|Y,10K,Jan: 10K | Feb: 20K,
B,X,5K,Jan: 5K | Feb: 4K,
C,Y,1K,,true
";

    #[test]
    fn end_to_end_scenario() {
        let raw = read_products(SCENARIO_CSV.as_bytes()).unwrap();
        let analysis = analyze(&raw, &params());

        // C is flagged and never appears
        assert_eq!(analysis.products.len(), 2);
        assert!(analysis.products.iter().all(|p| p.name != "C"));

        let a = analysis.products.iter().find(|p| p.name == "A").unwrap();
        let b = analysis.products.iter().find(|p| p.name == "B").unwrap();
        assert_eq!(a.growth_rate, 100.0);
        assert_eq!(b.growth_rate, -20.0);

        let x = analysis.stats.iter().find(|c| c.category == "X").unwrap();
        assert_eq!(x.product_count, 2);
        assert_eq!(x.total_visits, 15_000.0);
        let y = analysis.stats.iter().find(|c| c.category == "Y").unwrap();
        assert_eq!(y.product_count, 1);
    }

    #[test]
    fn ladder_loosens_until_something_matches() {
        let raw = read_products(SCENARIO_CSV.as_bytes()).unwrap();
        let products = process_all_products(&raw);
        let stats = calculate_category_stats(&products);

        // X averages (100 + -20)/2 = 40, Y averages 100: both pass at 5
        let (found, used) = opportunity_ladder(&stats, 10, 5.0);
        assert!(!found.is_empty());
        assert_eq!(used, 5.0);

        // an absurd threshold falls through the ladder
        let (found, used) = opportunity_ladder(&stats, 10, 100_000.0);
        assert!(!found.is_empty());
        assert_eq!(used, 5.0);

        // nothing at all qualifies only when the scale filter blocks it
        let (found, _) = opportunity_ladder(&stats, 0, 5.0);
        assert!(found.is_empty());
    }

    #[test]
    fn combinations_from_scenario() {
        let raw = read_products(SCENARIO_CSV.as_bytes()).unwrap();
        let analysis = analyze(&raw, &params());
        // only A carries both X and Y, below min_products=2
        assert!(analysis.combos.is_empty());
    }
}

// src/report.rs
//
// Writes the analysis as JSON artifacts plus a human-readable markdown
// summary into the output directory.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{fs, path::Path};

use crate::models::ProcessedProduct;
use crate::parse::format_visits;
use crate::pipeline::Analysis;

/* -------------------------------------------------------------------------- */
/* Entry point                                                                */
/* -------------------------------------------------------------------------- */

pub fn write_all_reports(out_dir: &Path, source: &str, a: &Analysis) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;

    write_json(out_dir.join("products.json"), &a.products)?;
    write_json(out_dir.join("categories.json"), &a.stats)?;
    write_json(out_dir.join("top_growth.json"), &a.top_growth)?;
    write_json(out_dir.join("top_traffic.json"), &a.top_traffic)?;
    write_json(
        out_dir.join("opportunities.json"),
        &json!({
            "min_growth_used": a.opportunity_threshold,
            "categories": &a.opportunities,
        }),
    )?;
    write_json(out_dir.join("combinations.json"), &a.combos)?;
    write_json(out_dir.join("similar.json"), &build_similar(&a.similar))?;

    let idx = json!({
        "source": source,
        "version": 1,
        "counts": {
            "products": a.products.len(),
            "categories": a.stats.len(),
            "opportunities": a.opportunities.len(),
            "combinations": a.combos.len(),
        },
        "files": [
            "products.json",
            "categories.json",
            "top_growth.json",
            "top_traffic.json",
            "opportunities.json",
            "combinations.json",
            "similar.json",
            "summary.md"
        ]
    });
    write_json(out_dir.join("index.json"), &idx)?;

    fs::write(out_dir.join("summary.md"), render_summary(a))
        .with_context(|| format!("write {:?}", out_dir.join("summary.md")))?;

    Ok(())
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    fs::write(path.as_ref(), serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("write {:?}", path.as_ref()))
}

/* -------------------------------------------------------------------------- */
/* Similar products                                                           */
/* -------------------------------------------------------------------------- */

#[derive(Serialize)]
struct NeighbourRef {
    name: String,
    visits: f64,
    growth_rate: f64,
    categories: Vec<String>,
}

#[derive(Serialize)]
struct SimilarEntry {
    product: String,
    neighbours: Vec<NeighbourRef>,
}

fn build_similar(similar: &[(String, Vec<ProcessedProduct>)]) -> Vec<SimilarEntry> {
    similar
        .iter()
        .map(|(product, neighbours)| SimilarEntry {
            product: product.clone(),
            neighbours: neighbours
                .iter()
                .map(|p| NeighbourRef {
                    name: p.name.clone(),
                    visits: p.visit_number,
                    growth_rate: p.growth_rate,
                    categories: p.category_list.clone(),
                })
                .collect(),
        })
        .collect()
}

/* -------------------------------------------------------------------------- */
/* Markdown summary                                                           */
/* -------------------------------------------------------------------------- */

fn render_summary(a: &Analysis) -> String {
    let mut md = String::new();
    md.push_str("# Product Niche Report\n\n");
    md.push_str(&format!(
        "{} products across {} categories.\n\n",
        a.products.len(),
        a.stats.len()
    ));

    if !a.top_growth.is_empty() {
        md.push_str("## Fastest Growing Categories\n");
        for c in &a.top_growth {
            md.push_str(&format!(
                "- **{}** — {:+.1}% avg growth, {} products, {} visits\n",
                c.category,
                c.avg_growth_rate,
                c.product_count,
                format_visits(c.total_visits)
            ));
        }
        md.push('\n');
    }

    if !a.top_traffic.is_empty() {
        md.push_str("## Biggest Categories by Traffic\n");
        for c in &a.top_traffic {
            md.push_str(&format!(
                "- **{}** — {} visits across {} products\n",
                c.category,
                format_visits(c.total_visits),
                c.product_count
            ));
        }
        md.push('\n');
    }

    if !a.opportunities.is_empty() {
        md.push_str(&format!(
            "## Opportunity Niches (growth ≥ {}%)\n",
            a.opportunity_threshold
        ));
        for o in a.opportunities.iter().take(10) {
            md.push_str(&format!(
                "- **{}** — score {:.0}, {} products, {:+.1}% avg growth\n",
                o.category, o.score, o.product_count, o.avg_growth_rate
            ));
        }
        md.push('\n');
    }

    if !a.combos.is_empty() {
        md.push_str("## Strongest Tag Combinations\n");
        for c in a.combos.iter().take(10) {
            md.push_str(&format!(
                "- **{}** — {} products, {} visits\n",
                c.tags.join(" + "),
                c.product_count,
                format_visits(c.total_visits)
            ));
        }
        md.push('\n');
    }

    if !a.similar.is_empty() {
        md.push_str("## Similar Products\n");
        for (name, neighbours) in a.similar.iter().take(5) {
            let list: Vec<&str> = neighbours.iter().map(|p| p.name.as_str()).collect();
            md.push_str(&format!("- **{}** → {}\n", name, list.join(", ")));
        }
        md.push('\n');
    }

    md
}

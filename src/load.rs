// src/load.rs

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::RawProduct;

/// Read the product export from any reader. Header mode, all cells kept as
/// strings, empty lines skipped (csv default); typing happens downstream.
pub fn read_products<R: Read>(reader: R) -> Result<Vec<RawProduct>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, rec) in rdr.deserialize().enumerate() {
        // +2: one for the header row, one for 1-based line numbers
        let row: RawProduct = rec.with_context(|| format!("CSV row {}", i + 2))?;
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_products_file(path: &Path) -> Result<Vec<RawProduct>> {
    let start = std::time::Instant::now();
    let file =
        std::fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rows = read_products(file).with_context(|| format!("parse {}", path.display()))?;
    info!(
        "CSV load completed - file={}, rows={}, duration={:.2}s",
        path.display(),
        rows.len(),
        start.elapsed().as_secs_f32()
    );
    Ok(rows)
}

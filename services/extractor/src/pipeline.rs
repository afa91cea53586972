//! End-to-end extraction: grid -> blocks -> rows -> final table.
//!
//! This function is DETERMINISTIC: same grid + same config = same table.

use crate::config::ExtractConfig;
use crate::emit::{finalize, FinalTable};
use crate::error::Result;
use crate::grid::RawGrid;
use crate::reconstruct::reconstruct_block;
use crate::scan::{scan_blocks, ScanOutcome};
use std::collections::BTreeSet;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub scan: ScanOutcome,
    pub raw_records: usize,
    pub table: FinalTable,
}

impl Extraction {
    pub fn years(&self) -> BTreeSet<i32> {
        self.table.records.iter().map(|r| r.year).collect()
    }

    pub fn entity_count(&self) -> usize {
        self.table
            .records
            .iter()
            .map(|r| r.entity.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

pub fn extract(grid: &RawGrid, config: &ExtractConfig) -> Result<Extraction> {
    let scan = scan_blocks(grid, config);
    let aliases = config.alias_table();

    let mut raw = Vec::new();
    for block in &scan.blocks {
        let records = reconstruct_block(grid, block, config, &aliases);
        info!(
            "Block {} (sheet row {}): {} records",
            block.year,
            block.header_row + 1,
            records.len()
        );
        raw.extend(records);
    }

    let raw_records = raw.len();
    let table = finalize(raw)?;

    info!(
        "Extracted {} records ({} raw, {} merged by summation)",
        table.records.len(),
        raw_records,
        table.collapsed
    );

    Ok(Extraction {
        scan,
        raw_records,
        table,
    })
}

//! Row reconstruction inside one block.
//!
//! Long entity names are sometimes wrapped by the source layout onto a row of
//! their own, with the figures on the following row:
//!
//! ```text
//!  No | Country          | Jan | Feb | ...
//!     | CONGO, THE       |     |     |
//!  12 | DEMOCRATIC REP.. | 140 | 152 | ...
//! ```
//!
//! Rows without any month value are accumulated into a pending prefix that is
//! prepended to the next row that does carry values.

use crate::alias::AliasTable;
use crate::config::ExtractConfig;
use crate::grid::{Cell, RawGrid};
use crate::numeric::{coerce_cell, looks_like_number};
use crate::record::ArrivalRecord;
use crate::scan::Block;
use crate::text::normalize_text;
use tracing::debug;

/// Name text waiting for the next data row of the block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingPrefix(String);

impl PendingPrefix {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn push(mut self, fragment: &str) -> Self {
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        self.0.push_str(fragment);
        self
    }

    /// Prepends the pending text to `name`, consuming the prefix.
    pub fn attach(self, name: &str) -> String {
        if self.0.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", self.0, name)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Blank name or a totals row; the prefix was reset
    Discarded,
    /// No month values; the name went into the prefix
    Fragment,
    /// Canonical name is a known wrap leftover
    SplitArtifact(String),
    Emitted(Vec<ArrivalRecord>),
}

/// Space-joins the normalized text of every non-month cell that is neither
/// blank nor number-like (rank and sequence columns).
pub fn candidate_name(cells: &[Cell], block: &Block) -> String {
    block
        .name_columns
        .iter()
        .filter_map(|&col| match cells.get(col) {
            None | Some(Cell::Empty) => None,
            Some(cell) => Some(normalize_text(&cell.as_text())),
        })
        .filter(|s| !s.is_empty() && !looks_like_number(s))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Month number and value for every month column holding a number.
fn month_values(cells: &[Cell], block: &Block) -> Vec<(u32, f64)> {
    block
        .month_columns
        .iter()
        .filter_map(|(&col, &month)| {
            let value = coerce_cell(cells.get(col).unwrap_or(&Cell::Empty))?;
            Some((month, value))
        })
        .collect()
}

/// Processes one row, threading the pending prefix through.
pub fn process_row(
    cells: &[Cell],
    block: &Block,
    config: &ExtractConfig,
    aliases: &AliasTable,
    prefix: PendingPrefix,
) -> (PendingPrefix, RowOutcome) {
    let name = candidate_name(cells, block);

    if name.is_empty() || name.to_uppercase().starts_with(&config.totals_marker.to_uppercase()) {
        return (PendingPrefix::default(), RowOutcome::Discarded);
    }

    let values = month_values(cells, block);
    if values.is_empty() {
        return (prefix.push(&name), RowOutcome::Fragment);
    }

    let entity = aliases.resolve(&prefix.attach(&name));
    if config.is_split_artifact(&entity) {
        return (PendingPrefix::default(), RowOutcome::SplitArtifact(entity));
    }

    let records = values
        .into_iter()
        .filter_map(|(month, arrivals)| ArrivalRecord::new(block.year, month, entity.as_str(), arrivals))
        .collect();

    (PendingPrefix::default(), RowOutcome::Emitted(records))
}

/// Walks every data row of `block` and returns the records it yields.
pub fn reconstruct_block(
    grid: &RawGrid,
    block: &Block,
    config: &ExtractConfig,
    aliases: &AliasTable,
) -> Vec<ArrivalRecord> {
    let mut records = Vec::new();
    let mut prefix = PendingPrefix::default();

    for row in block.data_rows() {
        let (next, outcome) = process_row(grid.row(row), block, config, aliases, prefix);
        prefix = next;

        match outcome {
            RowOutcome::Emitted(mut emitted) => records.append(&mut emitted),
            RowOutcome::SplitArtifact(name) => {
                debug!("Dropping split artifact '{}' at sheet row {}", name, row + 1);
            }
            RowOutcome::Fragment => {
                debug!("Name fragment at sheet row {}: '{}'", row + 1, prefix.as_str());
            }
            RowOutcome::Discarded => {}
        }
    }

    if !prefix.is_empty() {
        debug!(
            "Block {} ended with unused name fragment '{}'",
            block.year,
            prefix.as_str()
        );
    }

    records
}

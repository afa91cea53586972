//! Header detection, block formation and year inference.
//!
//! A sheet holds one table per reporting year. Each table starts at a header
//! row carrying the entity-label marker plus month-name columns; the year sits
//! somewhere above the header in the first column (a title such as
//! "Tourist arrivals by country of residence - 2021").

use crate::config::ExtractConfig;
use crate::grid::{Cell, RawGrid};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

const MONTHS: &[(&str, u32)] = &[
    ("JAN", 1),
    ("FEB", 2),
    ("MAR", 3),
    ("APR", 4),
    ("MAY", 5),
    ("JUN", 6),
    ("JUL", 7),
    ("AUG", 8),
    ("SEP", 9),
    ("OCT", 10),
    ("NOV", 11),
    ("DEC", 12),
    ("JANUARY", 1),
    ("FEBRUARY", 2),
    ("MARCH", 3),
    ("APRIL", 4),
    ("JUNE", 6),
    ("JULY", 7),
    ("AUGUST", 8),
    ("SEPTEMBER", 9),
    ("OCTOBER", 10),
    ("NOVEMBER", 11),
    ("DECEMBER", 12),
];

static YEAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(20\d{2})\b").expect("year pattern is valid"));

/// Month number for a header label such as "Jan" or " SEPTEMBER ".
pub fn month_number(label: &str) -> Option<u32> {
    let upper = label.trim().to_uppercase();
    MONTHS
        .iter()
        .find(|(name, _)| *name == upper)
        .map(|(_, month)| *month)
}

/// One year's table inside the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub header_row: usize,
    /// Start of the next header, or the grid length
    pub end_row: usize,
    pub year: i32,
    /// Column index -> month number, in column order
    pub month_columns: BTreeMap<usize, u32>,
    /// Every other column of the header row, in column order
    pub name_columns: Vec<usize>,
}

impl Block {
    pub fn data_rows(&self) -> std::ops::Range<usize> {
        (self.header_row + 1)..self.end_row
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    TooFewMonthColumns { found: usize },
    NoYear,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::TooFewMonthColumns { found } => {
                write!(f, "only {} distinct month columns", found)
            }
            RejectReason::NoYear => write!(f, "no year found above header"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RejectedBlock {
    pub header_row: usize,
    pub reason: RejectReason,
}

/// Result of scanning the whole grid once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub header_rows: Vec<usize>,
    pub blocks: Vec<Block>,
    pub rejected: Vec<RejectedBlock>,
}

/// True when the row carries the entity marker and enough month-name cells.
pub fn is_header_row(cells: &[Cell], config: &ExtractConfig) -> bool {
    let marker = config.entity_marker.trim().to_uppercase();
    let mut has_marker = false;
    let mut month_hits = 0;

    for cell in cells {
        let label = cell.as_text().trim().to_uppercase();
        if label == marker {
            has_marker = true;
        }
        if month_number(&label).is_some() {
            month_hits += 1;
        }
    }

    has_marker && month_hits >= config.min_month_columns
}

pub fn find_header_rows(grid: &RawGrid, config: &ExtractConfig) -> Vec<usize> {
    (0..grid.len())
        .filter(|&i| is_header_row(grid.row(i), config))
        .collect()
}

/// Searches upward from `header_row` (exclusive) for a 20xx year in the first column.
/// The nearest match wins; nothing within `window` rows gives `None`.
pub fn infer_year(grid: &RawGrid, header_row: usize, window: usize) -> Option<i32> {
    (1..=window)
        .map_while(|back| header_row.checked_sub(back))
        .find_map(|row| {
            let text = grid.cell(row, 0).as_text();
            let year = YEAR_PATTERN
                .captures(&text)
                .and_then(|caps| caps[1].parse::<i32>().ok());
            year
        })
}

/// Builds a block from a header row, re-checking month columns against the
/// realized column labels.
fn build_block(
    grid: &RawGrid,
    header_row: usize,
    end_row: usize,
    config: &ExtractConfig,
) -> Result<Block, RejectReason> {
    let year = infer_year(grid, header_row, config.year_search_window).ok_or(RejectReason::NoYear)?;

    let mut month_columns = BTreeMap::new();
    let mut name_columns = Vec::new();
    let mut distinct_labels = HashSet::new();

    for (col, cell) in grid.row(header_row).iter().enumerate() {
        let label = cell.as_text().trim().to_uppercase();
        match month_number(&label) {
            Some(month) => {
                month_columns.insert(col, month);
                distinct_labels.insert(label);
            }
            None => name_columns.push(col),
        }
    }

    if distinct_labels.len() < config.min_month_columns {
        return Err(RejectReason::TooFewMonthColumns {
            found: distinct_labels.len(),
        });
    }

    Ok(Block {
        header_row,
        end_row,
        year,
        month_columns,
        name_columns,
    })
}

/// Scans the grid for headers and turns each into a block or a rejection.
pub fn scan_blocks(grid: &RawGrid, config: &ExtractConfig) -> ScanOutcome {
    let header_rows = find_header_rows(grid, config);
    info!("Found {} header rows", header_rows.len());

    let mut outcome = ScanOutcome::default();

    for (idx, &header_row) in header_rows.iter().enumerate() {
        let end_row = header_rows.get(idx + 1).copied().unwrap_or(grid.len());

        match build_block(grid, header_row, end_row, config) {
            Ok(block) => {
                debug!(
                    "Block at sheet row {}: year {}, {} month columns, rows {}..{}",
                    header_row + 1,
                    block.year,
                    block.month_columns.len(),
                    header_row + 2,
                    end_row
                );
                outcome.blocks.push(block);
            }
            Err(reason) => {
                info!("Skipping block at sheet row {}: {}", header_row + 1, reason);
                outcome.rejected.push(RejectedBlock { header_row, reason });
            }
        }
    }

    outcome.header_rows = header_rows;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(months: &[&str]) -> Vec<Cell> {
        let mut row = vec![Cell::text("No"), Cell::text("Country")];
        row.extend(months.iter().map(|m| Cell::text(m)));
        row
    }

    const SIX: &[&str] = &["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

    // -------------------------------------------------------------------------
    // MONTH TABLE
    // -------------------------------------------------------------------------

    #[test]
    fn test_month_number_short_and_long() {
        assert_eq!(month_number("Jan"), Some(1));
        assert_eq!(month_number(" september "), Some(9));
        assert_eq!(month_number("MAY"), Some(5));
        assert_eq!(month_number("Sept"), None);
        assert_eq!(month_number("Total"), None);
    }

    // -------------------------------------------------------------------------
    // HEADER DETECTION
    // -------------------------------------------------------------------------

    #[test]
    fn test_header_requires_marker_and_six_months() {
        let config = ExtractConfig::default();
        assert!(is_header_row(&header(SIX), &config));
        assert!(!is_header_row(&header(&SIX[..5]), &config));

        let mut no_marker = header(SIX);
        no_marker[1] = Cell::text("Nation");
        assert!(!is_header_row(&no_marker, &config));
    }

    #[test]
    fn test_header_marker_case_and_padding() {
        let config = ExtractConfig::default();
        let mut row = header(SIX);
        row[1] = Cell::text("  country ");
        assert!(is_header_row(&row, &config));
    }

    #[test]
    fn test_header_marker_must_be_whole_cell() {
        let config = ExtractConfig::default();
        let mut row = header(SIX);
        row[1] = Cell::text("Country of residence");
        assert!(!is_header_row(&row, &config));
    }

    #[test]
    fn test_find_header_rows() {
        let config = ExtractConfig::default();
        let grid = RawGrid::new(vec![
            vec![Cell::text("Arrivals 2020")],
            header(SIX),
            vec![Cell::Number(1.0), Cell::text("FRANCE")],
            header(&SIX[..3]),
            header(SIX),
        ]);
        assert_eq!(find_header_rows(&grid, &config), vec![1, 4]);
    }

    // -------------------------------------------------------------------------
    // YEAR INFERENCE
    // -------------------------------------------------------------------------

    #[test]
    fn test_infer_year_nearest_wins() {
        let grid = RawGrid::new(vec![
            vec![Cell::text("Report 2019")],
            vec![Cell::text("Tourist arrivals - 2021")],
            vec![Cell::Empty],
            header(SIX),
        ]);
        assert_eq!(infer_year(&grid, 3, 44), Some(2021));
    }

    #[test]
    fn test_infer_year_numeric_cell() {
        let grid = RawGrid::new(vec![vec![Cell::Number(2022.0)], header(SIX)]);
        assert_eq!(infer_year(&grid, 1, 44), Some(2022));
    }

    #[test]
    fn test_infer_year_respects_window() {
        let mut rows = vec![vec![Cell::text("Year 2020")]];
        rows.extend((0..5).map(|_| vec![Cell::Empty]));
        rows.push(header(SIX));
        let grid = RawGrid::new(rows);
        assert_eq!(infer_year(&grid, 6, 6), Some(2020));
        assert_eq!(infer_year(&grid, 6, 5), None);
    }

    #[test]
    fn test_infer_year_never_looks_down_or_at_header() {
        let grid = RawGrid::new(vec![
            vec![Cell::text("2023 header")],
            vec![Cell::text("2024 below")],
        ]);
        assert_eq!(infer_year(&grid, 0, 44), None);
    }

    #[test]
    fn test_infer_year_ignores_other_centuries_and_embedded_digits() {
        let grid = RawGrid::new(vec![
            vec![Cell::text("1999 figures")],
            vec![Cell::text("ref 120215")],
            header(SIX),
        ]);
        assert_eq!(infer_year(&grid, 2, 44), None);
    }

    #[test]
    fn test_infer_year_only_first_column() {
        let grid = RawGrid::new(vec![
            vec![Cell::Empty, Cell::text("2020")],
            header(SIX),
        ]);
        assert_eq!(infer_year(&grid, 1, 44), None);
    }

    // -------------------------------------------------------------------------
    // BLOCKS
    // -------------------------------------------------------------------------

    #[test]
    fn test_scan_blocks_ranges_and_columns() {
        let config = ExtractConfig::default();
        let grid = RawGrid::new(vec![
            vec![Cell::text("2020")],
            header(SIX),
            vec![Cell::Number(1.0), Cell::text("FRANCE")],
            vec![Cell::text("2021")],
            header(SIX),
            vec![Cell::Number(1.0), Cell::text("FRANCE")],
        ]);
        let outcome = scan_blocks(&grid, &config);
        assert_eq!(outcome.header_rows, vec![1, 4]);
        assert_eq!(outcome.blocks.len(), 2);

        let first = &outcome.blocks[0];
        assert_eq!(first.year, 2020);
        assert_eq!(first.data_rows(), 2..4);
        assert_eq!(first.name_columns, vec![0, 1]);
        assert_eq!(first.month_columns.get(&2), Some(&1));
        assert_eq!(first.month_columns.get(&7), Some(&6));

        let second = &outcome.blocks[1];
        assert_eq!(second.year, 2021);
        assert_eq!(second.data_rows(), 5..6);
    }

    #[test]
    fn test_block_without_year_is_rejected() {
        let config = ExtractConfig::default();
        let grid = RawGrid::new(vec![header(SIX), vec![Cell::text("FRANCE")]]);
        let outcome = scan_blocks(&grid, &config);
        assert!(outcome.blocks.is_empty());
        assert_eq!(
            outcome.rejected,
            vec![RejectedBlock {
                header_row: 0,
                reason: RejectReason::NoYear
            }]
        );
    }

    #[test]
    fn test_repeated_month_labels_rejected_on_recheck() {
        let config = ExtractConfig::default();
        let grid = RawGrid::new(vec![
            vec![Cell::text("2020")],
            header(&["Jan", "Jan", "Feb", "Feb", "Mar", "Mar"]),
        ]);
        let outcome = scan_blocks(&grid, &config);
        assert_eq!(outcome.header_rows, vec![1]);
        assert!(outcome.blocks.is_empty());
        assert_eq!(
            outcome.rejected[0].reason,
            RejectReason::TooFewMonthColumns { found: 3 }
        );
    }

    #[test]
    fn test_no_headers_is_not_an_error() {
        let config = ExtractConfig::default();
        let grid = RawGrid::new(vec![vec![Cell::text("nothing here")]]);
        let outcome = scan_blocks(&grid, &config);
        assert!(outcome.header_rows.is_empty());
        assert!(outcome.blocks.is_empty());
        assert!(outcome.rejected.is_empty());
    }
}

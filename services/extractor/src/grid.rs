//! Raw cell grid loaded from a workbook sheet or a CSV export.
//!
//! The grid is read once and never mutated; every downstream step borrows it.

use crate::error::{ExtractError, Result};
use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader};
use encoding_rs::{UTF_8, WINDOWS_1252};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// A single untyped spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(s: &str) -> Self {
        Cell::Text(s.to_string())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// Display form used for header labels and name building.
    /// Integral numbers render without a fractional part ("2020", not "2020.0").
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                Cow::Owned(format!("{}", *n as i64))
            }
            Cell::Number(n) => Cow::Owned(n.to_string()),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Text(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::DateTime(dt) => date_cell(dt),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        }
    }
}

/// Date-formatted cells render as the calendar text a spreadsheet shows, so a
/// title dated in the sheet still carries its year. Durations stay numeric.
fn date_cell(dt: &ExcelDateTime) -> Cell {
    if !dt.is_datetime() {
        return Cell::Number(dt.as_f64());
    }
    dt.as_datetime()
        .map(|d| Cell::Text(d.format("%Y-%m-%d %H:%M:%S").to_string()))
        .unwrap_or_else(|| Cell::Number(dt.as_f64()))
}

/// Rebuilds absolute sheet positions. Calamine ranges start at the first used
/// cell, so leading blank rows and columns are padded back in.
fn rows_from_range(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    rows.extend(range.rows().map(|row| {
        let mut cells = vec![Cell::Empty; col_offset];
        cells.extend(row.iter().map(Cell::from));
        cells
    }));
    rows
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Ordered rows of ordered cells. Rows may have different lengths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, idx: usize) -> &[Cell] {
        self.rows.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.row(row).get(col).unwrap_or(&EMPTY_CELL)
    }

    /// Loads a grid from `path`, dispatching on the file extension.
    /// `.csv` goes through the CSV reader; anything else is handed to calamine.
    pub fn load(path: &Path, sheet: Option<&str>) -> Result<Self> {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            let bytes = fs::read(path)?;
            Self::from_csv_bytes(&bytes)
        } else {
            Self::from_workbook(path, sheet)
        }
    }

    /// Reads one sheet of a workbook (xlsx, xlsm, xlsb, xls, ods).
    /// Without a sheet name the first sheet is used.
    pub fn from_workbook(path: &Path, sheet: Option<&str>) -> Result<Self> {
        info!("Opening workbook: {}", path.display());

        let mut workbook = open_workbook_auto(path).map_err(|source| ExtractError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

        let sheet_names = workbook.sheet_names().to_vec();
        let sheet_name = match sheet {
            Some(name) => sheet_names
                .iter()
                .find(|s| s.as_str() == name)
                .cloned()
                .ok_or_else(|| ExtractError::MissingSheet {
                    path: path.to_path_buf(),
                    sheet: name.to_string(),
                })?,
            None => sheet_names.first().cloned().ok_or_else(|| ExtractError::NoSheets {
                path: path.to_path_buf(),
            })?,
        };

        info!(
            "Reading sheet: '{}' (of {} sheets)",
            sheet_name,
            sheet_names.len()
        );

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|source| ExtractError::Workbook {
                path: path.to_path_buf(),
                source,
            })?;

        let (row_count, col_count) = range.get_size();
        debug!("Sheet size: {} rows x {} columns", row_count, col_count);

        Ok(Self::new(rows_from_range(&range)))
    }

    /// Parses a headerless CSV export. UTF-8 (with or without BOM) is tried first;
    /// bytes that are not valid UTF-8 are decoded as Windows-1252.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let (decoded, _, had_errors) = UTF_8.decode(bytes);
        let content = if had_errors {
            warn!("Input is not valid UTF-8, decoding as Windows-1252");
            WINDOWS_1252.decode(bytes).0
        } else {
            decoded
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(csv_cell).collect());
        }

        Ok(Self::new(rows))
    }
}

fn csv_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Text(raw.to_string()),
    }
}

//! Persisting the final table and the optional run report.

use crate::error::{ExtractError, Result};
use crate::pipeline::Extraction;
use crate::record::ArrivalRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Writes `date,year,month,entity,arrivals` rows to `path`.
///
/// Rows go to a temporary file next to the target which is then renamed over
/// it, so a failed run never leaves a half-written table behind.
pub fn write_table(path: &Path, records: &[ArrivalRecord]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    // Only the final rename can collide with a program holding the target open.
    fs::create_dir_all(&dir)?;
    let tmp = NamedTempFile::new_in(&dir)?;
    {
        let mut writer = csv::Writer::from_writer(tmp.as_file());
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }

    tmp.persist(path)
        .map_err(|e| ExtractError::from_write(path.to_path_buf(), e.error))?;
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct AcceptedBlockReport {
    pub header_row: usize,
    pub year: i32,
    pub month_columns: usize,
}

#[derive(Debug, Serialize)]
pub struct RejectedBlockReport {
    pub header_row: usize,
    pub reason: String,
}

/// Machine-readable summary of one run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub input: String,
    pub output: Option<String>,
    pub headers_found: usize,
    pub accepted_blocks: Vec<AcceptedBlockReport>,
    pub rejected_blocks: Vec<RejectedBlockReport>,
    pub raw_records: usize,
    pub final_records: usize,
    pub collapsed_keys: usize,
    pub duplicate_keys: usize,
    pub years: Vec<i32>,
    pub entities: usize,
}

impl RunReport {
    /// Sheet rows in the report are 1-based, as a spreadsheet shows them.
    pub fn new(extraction: &Extraction, input: &Path, output: Option<&Path>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            input: input.display().to_string(),
            output: output.map(|p| p.display().to_string()),
            headers_found: extraction.scan.header_rows.len(),
            accepted_blocks: extraction
                .scan
                .blocks
                .iter()
                .map(|b| AcceptedBlockReport {
                    header_row: b.header_row + 1,
                    year: b.year,
                    month_columns: b.month_columns.len(),
                })
                .collect(),
            rejected_blocks: extraction
                .scan
                .rejected
                .iter()
                .map(|r| RejectedBlockReport {
                    header_row: r.header_row + 1,
                    reason: r.reason.to_string(),
                })
                .collect(),
            raw_records: extraction.raw_records,
            final_records: extraction.table.records.len(),
            collapsed_keys: extraction.table.collapsed,
            duplicate_keys: crate::emit::count_duplicate_keys(&extraction.table.records),
            years: extraction.years().into_iter().collect(),
            entities: extraction.entity_count(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let file =
            fs::File::create(path).map_err(|e| ExtractError::from_write(path.to_path_buf(), e))?;
        serde_json::to_writer_pretty(&file, self)
            .map_err(|e| ExtractError::from_write(path.to_path_buf(), e.into()))?;
        Ok(())
    }
}

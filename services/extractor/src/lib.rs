//! Monthly arrivals extractor.
//!
//! Turns multi-year statistical workbooks (one table per year, repeated down a
//! single sheet) into a long-format `date,year,month,entity,arrivals` table.
//!
//! CRITICAL: extraction is DETERMINISTIC.
//! Same workbook + same config = byte-identical output.

pub mod alias;
pub mod config;
pub mod emit;
pub mod error;
pub mod grid;
pub mod numeric;
pub mod output;
pub mod pipeline;
pub mod reconstruct;
pub mod record;
pub mod scan;
pub mod text;

pub use config::ExtractConfig;
pub use error::{ExtractError, Result};
pub use grid::{Cell, RawGrid};
pub use pipeline::{extract, Extraction};
pub use record::ArrivalRecord;

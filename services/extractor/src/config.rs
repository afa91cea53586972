//! Extraction constants and the optional JSON file that overrides them.
//!
//! Example `config/extract.json`:
//!
//! ```json
//! {
//!   "entity_marker": "COUNTRY",
//!   "year_search_window": 44,
//!   "split_artifacts": ["REPUBLIC"],
//!   "aliases": { "TURKIYE": "TURKEY" }
//! }
//! ```

use crate::alias::AliasTable;
use crate::error::{ExtractError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn default_entity_marker() -> String {
    "COUNTRY".to_string()
}

fn default_totals_marker() -> String {
    "TOTAL".to_string()
}

fn default_min_month_columns() -> usize {
    6
}

fn default_year_search_window() -> usize {
    44
}

fn default_split_artifacts() -> Vec<String> {
    vec!["REPUBLIC".to_string()]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractConfig {
    /// Header cell that marks the entity-name column (compared uppercased)
    #[serde(default = "default_entity_marker")]
    pub entity_marker: String,

    /// Rows whose name starts with this are totals and reset the pending prefix
    #[serde(default = "default_totals_marker")]
    pub totals_marker: String,

    #[serde(default = "default_min_month_columns")]
    pub min_month_columns: usize,

    /// How many rows above a header are searched for the block year
    #[serde(default = "default_year_search_window")]
    pub year_search_window: usize,

    /// Canonical names that are leftovers of a wrapped name and never real entities
    #[serde(default = "default_split_artifacts")]
    pub split_artifacts: Vec<String>,

    /// Extra variant -> canonical spellings on top of the built-in table
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            entity_marker: default_entity_marker(),
            totals_marker: default_totals_marker(),
            min_month_columns: default_min_month_columns(),
            year_search_window: default_year_search_window(),
            split_artifacts: default_split_artifacts(),
            aliases: BTreeMap::new(),
        }
    }
}

impl ExtractConfig {
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|source| ExtractError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn alias_table(&self) -> AliasTable {
        AliasTable::builtin().with_extra(&self.aliases)
    }

    pub fn is_split_artifact(&self, canonical: &str) -> bool {
        self.split_artifacts
            .iter()
            .any(|a| a.eq_ignore_ascii_case(canonical))
    }
}

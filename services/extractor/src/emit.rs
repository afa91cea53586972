//! Aggregation of raw records into the final (entity, year, month) table.
//!
//! Colliding keys, which happen when two source blocks report the same year,
//! are merged by summing their arrivals.

use crate::error::{ExtractError, Result};
use crate::record::ArrivalRecord;
use std::collections::{BTreeMap, HashSet};

/// Sums arrivals per (entity, year, month) and returns the rows sorted by
/// entity, then date.
pub fn aggregate(records: Vec<ArrivalRecord>) -> Vec<ArrivalRecord> {
    let mut grouped: BTreeMap<(String, i32, u32), ArrivalRecord> = BTreeMap::new();

    for record in records {
        let key = (record.entity.clone(), record.year, record.month);
        grouped
            .entry(key)
            .and_modify(|existing| existing.arrivals += record.arrivals)
            .or_insert(record);
    }

    grouped.into_values().collect()
}

/// Number of rows whose key already appeared earlier in `records`.
pub fn count_duplicate_keys(records: &[ArrivalRecord]) -> usize {
    let mut seen = HashSet::new();
    records.iter().filter(|r| !seen.insert(r.key())).count()
}

pub fn ensure_unique(records: &[ArrivalRecord]) -> Result<()> {
    match count_duplicate_keys(records) {
        0 => Ok(()),
        count => Err(ExtractError::DuplicateInvariant { count }),
    }
}

/// Aggregated, verified output table plus how many raw rows were merged away.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalTable {
    pub records: Vec<ArrivalRecord>,
    pub collapsed: usize,
}

/// Aggregates the raw stream and enforces key uniqueness.
/// An empty stream is fatal: the input did not look like the expected tables.
pub fn finalize(raw: Vec<ArrivalRecord>) -> Result<FinalTable> {
    if raw.is_empty() {
        return Err(ExtractError::EmptyResult);
    }

    let raw_count = raw.len();
    let records = aggregate(raw);
    ensure_unique(&records)?;

    Ok(FinalTable {
        collapsed: raw_count - records.len(),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(entity: &str, year: i32, month: u32, arrivals: f64) -> ArrivalRecord {
        ArrivalRecord::new(year, month, entity, arrivals).unwrap()
    }

    #[test]
    fn test_collisions_are_summed() {
        let out = aggregate(vec![rec("FRANCE", 2020, 1, 50.0), rec("FRANCE", 2020, 1, 70.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].arrivals, 120.0);
    }

    #[test]
    fn test_sorted_by_entity_then_date() {
        let out = aggregate(vec![
            rec("JAPAN", 2021, 1, 1.0),
            rec("FRANCE", 2021, 2, 1.0),
            rec("FRANCE", 2020, 12, 1.0),
            rec("FRANCE", 2021, 1, 1.0),
            rec("CHINA", 2022, 5, 1.0),
        ]);
        let keys: Vec<_> = out.iter().map(|r| (r.entity.as_str(), r.date.to_string())).collect();
        assert_eq!(
            keys,
            vec![
                ("CHINA", "2022-05-01".to_string()),
                ("FRANCE", "2020-12-01".to_string()),
                ("FRANCE", "2021-01-01".to_string()),
                ("FRANCE", "2021-02-01".to_string()),
                ("JAPAN", "2021-01-01".to_string()),
            ]
        );
    }

    #[test]
    fn test_count_duplicate_keys() {
        let rows = vec![
            rec("FRANCE", 2020, 1, 1.0),
            rec("FRANCE", 2020, 1, 2.0),
            rec("FRANCE", 2020, 1, 3.0),
            rec("FRANCE", 2020, 2, 1.0),
        ];
        assert_eq!(count_duplicate_keys(&rows), 2);
        assert_eq!(count_duplicate_keys(&aggregate(rows)), 0);
    }

    #[test]
    fn test_ensure_unique_fails_on_duplicates() {
        let rows = vec![rec("FRANCE", 2020, 1, 1.0), rec("FRANCE", 2020, 1, 2.0)];
        let err = ensure_unique(&rows).unwrap_err();
        assert!(matches!(err, ExtractError::DuplicateInvariant { count: 1 }));
    }

    #[test]
    fn test_finalize_empty_is_fatal() {
        assert!(matches!(finalize(Vec::new()), Err(ExtractError::EmptyResult)));
    }

    #[test]
    fn test_finalize_reports_collapsed_rows() {
        let table = finalize(vec![
            rec("FRANCE", 2020, 1, 50.0),
            rec("FRANCE", 2020, 1, 70.0),
            rec("INDIA", 2020, 1, 5.0),
        ])
        .unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.collapsed, 1);
    }

    #[test]
    fn test_negative_values_are_summed_unchecked() {
        let out = aggregate(vec![rec("FRANCE", 2020, 1, -10.0), rec("FRANCE", 2020, 1, 4.0)]);
        assert_eq!(out[0].arrivals, -6.0);
    }
}

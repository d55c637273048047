//! Per-entity coverage of the fetched series.

use indexmap::IndexMap;
use serde::Serialize;

use crate::record::Record;

/// How complete one entity's series is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageStats {
    pub entity_code: String,
    pub entity_name: String,
    pub observations: usize,
    pub missing: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
}

impl CoverageStats {
    fn new(record: &Record) -> Self {
        CoverageStats {
            entity_code: record.entity_code.clone(),
            entity_name: record.entity_name.clone(),
            ..Default::default()
        }
    }

    fn push(&mut self, record: &Record) {
        self.observations += 1;
        if record.value.is_none() {
            self.missing += 1;
        }

        if let Some(year) = record.year() {
            if self.first_year.is_none_or(|first| year < first) {
                self.first_year = Some(year);
            }
            if self.last_year.is_none_or(|last| year > last) {
                self.last_year = Some(year);
            }
        }
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    /// Share of observations that carry a value.
    pub fn coverage_pct(&self) -> f64 {
        Self::pct(self.observations - self.missing, self.observations)
    }
}

/// Per-entity coverage in first-appearance order.
pub fn coverage(records: &[Record]) -> Vec<CoverageStats> {
    let mut by_entity: IndexMap<&str, CoverageStats> = IndexMap::new();
    for record in records {
        by_entity
            .entry(record.entity_code.as_str())
            .or_insert_with(|| CoverageStats::new(record))
            .push(record);
    }
    by_entity.into_values().collect()
}

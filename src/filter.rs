//! Filter Engine: period range plus optional entity subset.

use std::collections::BTreeSet;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::record::Record;

pub const DEFAULT_PERIOD_START: i32 = 1972;
pub const DEFAULT_PERIOD_END: i32 = 2022;

/// User-controlled filter predicate. An empty `entity_codes` set passes every entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub period_start: i32,
    pub period_end: i32,
    pub entity_codes: BTreeSet<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            period_start: DEFAULT_PERIOD_START,
            period_end: DEFAULT_PERIOD_END,
            entity_codes: BTreeSet::new(),
        }
    }
}

impl FilterState {
    pub fn new(period_start: i32, period_end: i32) -> Self {
        Self {
            period_start,
            period_end,
            entity_codes: BTreeSet::new(),
        }
    }

    pub fn with_entities<I, S>(mut self, entity_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_codes = entity_codes.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_period_start(&mut self, start: i32) {
        self.period_start = start;
    }

    pub fn set_period_end(&mut self, end: i32) {
        self.period_end = end;
    }

    /// Adds the entity if absent, removes it otherwise.
    pub fn toggle_entity(&mut self, entity_code: &str) {
        if !self.entity_codes.remove(entity_code) {
            self.entity_codes.insert(entity_code.to_string());
        }
    }

    pub fn clear_entities(&mut self) {
        self.entity_codes.clear();
    }

    pub fn matches(&self, record: &Record) -> bool {
        let in_range = record
            .year()
            .is_some_and(|y| self.period_start <= y && y <= self.period_end);

        in_range && (self.entity_codes.is_empty() || self.entity_codes.contains(&record.entity_code))
    }

    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Returns the records inside `[period_start, period_end]` whose entity is in
/// `entity_codes` (or any entity when the set is empty), in input order.
///
/// Records whose period is not a year never pass.
pub fn filter_records(
    records: &[Record],
    period_start: i32,
    period_end: i32,
    entity_codes: &BTreeSet<String>,
) -> Vec<Record> {
    let state = FilterState {
        period_start,
        period_end,
        entity_codes: entity_codes.clone(),
    };
    state.apply(records)
}

/// Parses one user-entered period bound.
pub fn parse_period(input: &str) -> Result<i32, FilterError> {
    input
        .trim()
        .parse()
        .map_err(|_| FilterError::InvalidPeriod(input.to_string()))
}

/// Distinct entity codes in first-seen order.
pub fn available_entities(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.entity_code.as_str())
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Year labels offered by the start and end selectors.
pub fn period_options(start: i32, end: i32) -> Vec<String> {
    (start..=end).map(|y| y.to_string()).collect()
}

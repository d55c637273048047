//! Series Grouper: regroups a record sequence into one point series per entity.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::record::Record;

/// One chart point. `x` is the period label, never interpolated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: String,
    pub y: f64,
}

/// Points for one entity, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<Point>,
}

/// Groups `records` by entity code.
///
/// Series come out in first-appearance order. The first record seen for a
/// code fixes the series name. Absent values become `0.0` here and nowhere
/// else.
pub fn group_series(records: &[Record]) -> Vec<Series> {
    let mut grouped: IndexMap<&str, Series> = IndexMap::new();

    for record in records {
        grouped
            .entry(record.entity_code.as_str())
            .or_insert_with(|| Series {
                name: record.entity_name.clone(),
                points: Vec::new(),
            })
            .points
            .push(Point {
                x: record.period.clone(),
                y: record.value.unwrap_or(0.0),
            });
    }

    grouped.into_values().collect()
}

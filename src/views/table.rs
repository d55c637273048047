//! Sortable, paginated table over the filtered (ungrouped) records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::NO_DATA_MESSAGE;
use crate::error::FilterError;
use crate::record::Record;

pub const ROWS_PER_PAGE_OPTIONS: [usize; 3] = [5, 10, 25];
pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Period,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sort and paging state owned by the table view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    order_by: SortColumn,
    order: SortOrder,
    page: usize,
    rows_per_page: usize,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            order_by: SortColumn::Period,
            order: SortOrder::Desc,
            page: 0,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

impl TableState {
    pub fn order_by(&self) -> SortColumn {
        self.order_by
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Column header activation. A column that is already ascending flips to
    /// descending; anything else becomes ascending.
    pub fn sort_by(&mut self, column: SortColumn) {
        let is_asc = self.order_by == column && self.order == SortOrder::Asc;
        self.order = if is_asc { SortOrder::Desc } else { SortOrder::Asc };
        self.order_by = column;
    }

    pub fn set_sort(&mut self, column: SortColumn, order: SortOrder) {
        self.order_by = column;
        self.order = order;
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Changes the page size and returns to the first page.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> Result<(), FilterError> {
        if rows_per_page == 0 {
            return Err(FilterError::EmptyPageSize);
        }
        self.rows_per_page = rows_per_page;
        self.page = 0;
        Ok(())
    }

    pub fn page_count(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.rows_per_page)
    }

    /// Sorted copy of `records`. Ties keep their input order.
    pub fn sorted(&self, records: &[Record]) -> Vec<Record> {
        let mut sorted = records.to_vec();
        sorted.sort_by(|a, b| {
            let ord = match self.order_by {
                SortColumn::Period => a.year().cmp(&b.year()),
                SortColumn::Value => a
                    .value
                    .unwrap_or(0.0)
                    .total_cmp(&b.value.unwrap_or(0.0)),
            };
            match self.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        sorted
    }

    pub fn render(&self, records: &[Record]) -> TableView {
        if records.is_empty() {
            return TableView::NoData {
                message: NO_DATA_MESSAGE,
            };
        }

        let start = self.page.saturating_mul(self.rows_per_page);
        let rows = self
            .sorted(records)
            .into_iter()
            .skip(start)
            .take(self.rows_per_page)
            .map(TableRow::from)
            .collect();

        TableView::Page(TablePage {
            rows,
            page: self.page,
            rows_per_page: self.rows_per_page,
            total_rows: records.len(),
            page_count: self.page_count(records.len()),
            order_by: self.order_by,
            order: self.order,
        })
    }
}

/// Table cell for a measurement: absent values stay distinguishable from zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueCell(pub Option<f64>);

impl fmt::Display for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => f.write_str(&format_value(v)),
            None => f.write_str("N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub entity_name: String,
    pub period: String,
    pub value: ValueCell,
}

impl From<Record> for TableRow {
    fn from(r: Record) -> Self {
        Self {
            entity_name: r.entity_name,
            period: r.period,
            value: ValueCell(r.value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    pub rows: Vec<TableRow>,
    pub page: usize,
    pub rows_per_page: usize,
    pub total_rows: usize,
    pub page_count: usize,
    pub order_by: SortColumn,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TableView {
    NoData { message: &'static str },
    Page(TablePage),
}

/// Formats with thousands separators and at most three fraction digits,
/// e.g. `6343.21875` as `6,343.219`.
pub fn format_value(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }

    let rounded = (v * 1000.0).round() / 1000.0;
    let text = format!("{:.3}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 5);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if !frac_part.is_empty() {
        grouped.push('.');
        grouped.push_str(frac_part);
    }
    grouped
}

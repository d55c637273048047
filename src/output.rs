//! Output formatting and persistence for records and views.
//!
//! Supports JSON export, CSV export and a plain-text rendering of one table
//! page.

use std::fmt::Write as _;
use std::fs::File;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

use crate::record::Record;
use crate::views::TablePage;

/// Writes a value as pretty-printed JSON to `path`, replacing the file.
pub fn write_json(path: &str, value: &impl Serialize) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating '{path}'"))?;
    serde_json::to_writer_pretty(file, value)?;
    debug!(path, "JSON written");
    Ok(())
}

/// Writes `records` to a CSV file with a header row, replacing the file.
///
/// An absent value is written as an empty cell.
pub fn write_records(path: &str, records: &[Record]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating '{path}'"))?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path, rows = records.len(), "CSV written");
    Ok(())
}

/// Renders one table page as aligned text with a page footer.
pub fn render_table(page: &TablePage) -> String {
    let headers = ["Country", "Year", "Emissions (Mt CO₂e)"];
    let cells: Vec<[String; 3]> = page
        .rows
        .iter()
        .map(|r| [r.entity_name.clone(), r.period.clone(), r.value.to_string()])
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let line = |out: &mut String, row: [&str; 3]| {
        let _ = writeln!(
            out,
            "{:<w0$}  {:<w1$}  {:>w2$}",
            row[0],
            row[1],
            row[2],
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2]
        );
    };

    line(&mut out, headers);
    for row in &cells {
        line(&mut out, [row[0].as_str(), row[1].as_str(), row[2].as_str()]);
    }

    if page.rows.is_empty() {
        let _ = write!(out, "0 of {}", page.total_rows);
    } else {
        let offset = page.page.saturating_mul(page.rows_per_page);
        let first = offset.saturating_add(1);
        let last = offset.saturating_add(page.rows.len());
        let _ = write!(
            out,
            "{first}-{last} of {} (page {} of {})",
            page.total_rows,
            page.page.saturating_add(1),
            page.page_count
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::{TableState, TableView};
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new("USA", "United States", "2000", Some(6343.2)),
            Record::new("USA", "United States", "1999", None),
        ]
    }

    #[test]
    fn test_write_records_header_and_empty_cell() {
        let path = temp_path("ghg_emissions_test_records.csv");
        let _ = fs::remove_file(&path);

        write_records(&path, &records()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "entity_code,entity_name,period,value");
        assert_eq!(lines[1], "USA,United States,2000,6343.2");
        assert_eq!(lines[2], "USA,United States,1999,");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_json_roundtrips_records() {
        let path = temp_path("ghg_emissions_test_records.json");
        write_json(&path, &records()).unwrap();

        let back: Vec<Record> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, records());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_render_table_page() {
        let TableView::Page(page) = TableState::default().render(&records()) else {
            panic!("expected a page");
        };

        let text = render_table(&page);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Country"));
        assert!(lines[1].starts_with("United States  2000"));
        assert!(lines[1].ends_with("6,343.2"));
        assert!(lines[2].ends_with("N/A"));
        assert_eq!(lines[3], "1-2 of 2 (page 1 of 1)");
    }

    #[test]
    fn test_render_table_far_page_does_not_overflow() {
        let mut state = TableState::default();
        state.set_page(usize::MAX - 1);
        let TableView::Page(page) = state.render(&records()[..1]) else {
            panic!("expected a page");
        };

        assert!(page.rows.is_empty());
        assert!(render_table(&page).ends_with("0 of 1"));

        let mut far = page.clone();
        far.rows = vec![records().remove(0).into()];
        let text = render_table(&far);
        assert!(text.ends_with(&format!("of 1 (page {} of 1)", usize::MAX)));
    }
}

//! The controlling view: owns the fetched data plus all user-facing state and
//! derives every view from scratch on request.

use serde::Serialize;

use crate::aggregator::Aggregate;
use crate::error::FilterError;
use crate::filter::{
    DEFAULT_PERIOD_END, DEFAULT_PERIOD_START, FilterState, available_entities, period_options,
};
use crate::record::Record;
use crate::series::{Series, group_series};
use crate::views::{ChartKind, ChartView, SortColumn, TableState, TableView, Tab, chart_view};

pub const TOTAL_FAILURE_MESSAGE: &str = "Failed to fetch emissions data for every country.";
pub const EMPTY_MESSAGE: &str = "No emissions data was returned for any country.";

/// What the dashboard shows for the active tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardView {
    Error { message: &'static str },
    Chart(ChartView),
    Table(TableView),
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    aggregate: Aggregate,
    filter: FilterState,
    tab: Tab,
    table: TableState,
}

impl Dashboard {
    pub fn new(aggregate: Aggregate) -> Self {
        Self::with_filter(aggregate, FilterState::default())
    }

    pub fn with_filter(aggregate: Aggregate, filter: FilterState) -> Self {
        Self {
            aggregate,
            filter,
            tab: Tab::default(),
            table: TableState::default(),
        }
    }

    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    pub fn records(&self) -> &[Record] {
        self.aggregate.records()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn table_state(&self) -> &TableState {
        &self.table
    }

    pub fn set_period_range(&mut self, start: i32, end: i32) {
        self.filter.set_period_start(start);
        self.filter.set_period_end(end);
    }

    pub fn toggle_entity(&mut self, entity_code: &str) {
        self.filter.toggle_entity(entity_code);
    }

    pub fn set_entities<I, S>(&mut self, entity_codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = self.filter.clone().with_entities(entity_codes);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn sort_table(&mut self, column: SortColumn) {
        self.table.sort_by(column);
    }

    pub fn table_state_mut(&mut self) -> &mut TableState {
        &mut self.table
    }

    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> Result<(), FilterError> {
        self.table.set_rows_per_page(rows_per_page)
    }

    pub fn set_page(&mut self, page: usize) {
        self.table.set_page(page);
    }

    /// Entity codes offered by the selector, from the unfiltered data.
    pub fn available_entities(&self) -> Vec<String> {
        available_entities(self.records())
    }

    /// Years offered by the start and end selectors. Fixed, so a narrowed
    /// range can always be widened again.
    pub fn period_options(&self) -> Vec<String> {
        period_options(DEFAULT_PERIOD_START, DEFAULT_PERIOD_END)
    }

    pub fn filtered(&self) -> Vec<Record> {
        self.filter.apply(self.records())
    }

    pub fn series(&self) -> Vec<Series> {
        group_series(&self.filtered())
    }

    /// The no-data error shown instead of any chart or table, if one applies.
    pub fn error(&self) -> Option<&'static str> {
        match self.aggregate {
            Aggregate::Data { .. } => None,
            Aggregate::Empty { .. } => Some(EMPTY_MESSAGE),
            Aggregate::TotalFailure { .. } => Some(TOTAL_FAILURE_MESSAGE),
        }
    }

    pub fn chart(&self, kind: ChartKind) -> DashboardView {
        match self.error() {
            Some(message) => DashboardView::Error { message },
            None => DashboardView::Chart(chart_view(kind, &self.series())),
        }
    }

    pub fn table(&self) -> DashboardView {
        match self.error() {
            Some(message) => DashboardView::Error { message },
            None => DashboardView::Table(self.table.render(&self.filtered())),
        }
    }

    pub fn view(&self) -> DashboardView {
        match self.tab {
            Tab::LineChart => self.chart(ChartKind::Line),
            Tab::Heatmap => self.chart(ChartKind::Heatmap),
            Tab::Table => self.table(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::EntityFailure;
    use crate::error::FetchError;
    use crate::series::Point;
    use crate::views::{NO_DATA_MESSAGE, SortOrder};

    fn data() -> Aggregate {
        Aggregate::Data {
            records: vec![
                Record::new("USA", "United States", "2000", Some(10.0)),
                Record::new("USA", "United States", "2001", Some(20.0)),
                Record::new("FRA", "France", "2000", Some(5.0)),
            ],
            failures: vec![],
        }
    }

    #[test]
    fn test_end_to_end_single_year() {
        let mut dashboard = Dashboard::new(data());
        dashboard.set_period_range(2000, 2000);

        assert_eq!(dashboard.filtered().len(), 2);
        assert_eq!(
            dashboard.series(),
            vec![
                Series {
                    name: "United States".into(),
                    points: vec![Point { x: "2000".into(), y: 10.0 }],
                },
                Series {
                    name: "France".into(),
                    points: vec![Point { x: "2000".into(), y: 5.0 }],
                },
            ]
        );
    }

    #[test]
    fn test_period_options_do_not_follow_filter() {
        let mut dashboard = Dashboard::new(data());
        dashboard.set_period_range(2000, 2000);

        let options = dashboard.period_options();
        assert_eq!(options.len(), 51);
        assert_eq!(options.first().map(String::as_str), Some("1972"));
        assert_eq!(options.last().map(String::as_str), Some("2022"));
    }

    #[test]
    fn test_total_failure_shows_error_on_every_tab() {
        let failures = ["USA", "JPN", "CHN", "IND", "FRA", "BRA"]
            .into_iter()
            .map(|code| EntityFailure {
                entity_code: code.into(),
                error: FetchError::Status(500),
            })
            .collect();
        let mut dashboard = Dashboard::new(Aggregate::TotalFailure { failures });

        for tab in Tab::ALL {
            dashboard.select_tab(tab);
            assert_eq!(
                dashboard.view(),
                DashboardView::Error { message: TOTAL_FAILURE_MESSAGE }
            );
        }
    }

    #[test]
    fn test_empty_aggregate_is_an_error_state() {
        let dashboard = Dashboard::new(Aggregate::Empty { failures: vec![] });
        assert_eq!(dashboard.view(), DashboardView::Error { message: EMPTY_MESSAGE });
    }

    #[test]
    fn test_filter_excluding_everything_is_no_data_not_error() {
        let mut dashboard = Dashboard::new(data());
        dashboard.set_period_range(1980, 1985);

        assert_eq!(
            dashboard.view(),
            DashboardView::Chart(ChartView::NoData { message: NO_DATA_MESSAGE })
        );
        dashboard.select_tab(Tab::Table);
        assert_eq!(
            dashboard.view(),
            DashboardView::Table(TableView::NoData { message: NO_DATA_MESSAGE })
        );
    }

    #[test]
    fn test_entity_selection_drives_views() {
        let mut dashboard = Dashboard::new(data());
        dashboard.toggle_entity("FRA");

        let names: Vec<String> = dashboard.series().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["France"]);
        assert_eq!(dashboard.available_entities(), vec!["USA", "FRA"]);

        dashboard.toggle_entity("FRA");
        assert_eq!(dashboard.series().len(), 2);
    }

    #[test]
    fn test_table_state_survives_filter_changes() {
        let mut dashboard = Dashboard::new(data());
        dashboard.select_tab(Tab::Table);
        dashboard.sort_table(SortColumn::Value);
        dashboard.set_entities(["USA"]);

        let DashboardView::Table(TableView::Page(page)) = dashboard.view() else {
            panic!("expected a table page");
        };
        assert_eq!(page.order, SortOrder::Asc);
        let periods: Vec<&str> = page.rows.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(periods, vec!["2000", "2001"]);
    }

    #[test]
    fn test_missing_value_is_zero_in_chart_and_na_in_table() {
        let aggregate = Aggregate::Data {
            records: vec![Record::new("USA", "United States", "1999", None)],
            failures: vec![],
        };
        let mut dashboard = Dashboard::new(aggregate);

        assert_eq!(
            dashboard.series()[0].points,
            vec![Point { x: "1999".into(), y: 0.0 }]
        );

        dashboard.select_tab(Tab::Table);
        let DashboardView::Table(TableView::Page(page)) = dashboard.view() else {
            panic!("expected a table page");
        };
        assert_eq!(page.rows[0].value.to_string(), "N/A");
    }
}

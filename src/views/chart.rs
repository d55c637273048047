//! Line, stacked-area and heatmap adapters over a series list.

use indexmap::IndexSet;
use serde::Serialize;

use super::NO_DATA_MESSAGE;
use crate::series::Series;

pub const VALUE_UNIT: &str = "Mt CO₂e";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    StackedArea,
    Heatmap,
}

impl ChartKind {
    fn y_axis_title(self) -> String {
        match self {
            ChartKind::Line | ChartKind::StackedArea => format!("GHG Emissions ({VALUE_UNIT})"),
            ChartKind::Heatmap => "Country".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Categorical x axis: one label per distinct period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAxis {
    pub title: String,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_axis: CategoryAxis,
    pub y_axis_title: String,
    pub value_unit: &'static str,
    pub stacked: bool,
    /// Colour-scale bounds; heatmaps only.
    pub value_range: Option<ValueRange>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartView {
    NoData { message: &'static str },
    Ready(ChartSpec),
}

/// Builds the view model for `kind`. An empty series list is `NoData`.
pub fn chart_view(kind: ChartKind, series: &[Series]) -> ChartView {
    if series.is_empty() {
        return ChartView::NoData {
            message: NO_DATA_MESSAGE,
        };
    }

    let value_range = match kind {
        ChartKind::Heatmap => value_range(series),
        ChartKind::Line | ChartKind::StackedArea => None,
    };

    ChartView::Ready(ChartSpec {
        kind,
        x_axis: CategoryAxis {
            title: "Year".to_string(),
            categories: period_categories(series),
        },
        y_axis_title: kind.y_axis_title(),
        value_unit: VALUE_UNIT,
        stacked: kind == ChartKind::StackedArea,
        value_range,
        series: series.to_vec(),
    })
}

/// Distinct periods across all series, ordered by year. Labels that are not
/// years keep their first-seen order after the years.
pub fn period_categories(series: &[Series]) -> Vec<String> {
    let mut categories: Vec<String> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.x.as_str()))
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    categories.sort_by_key(|label| match label.trim().parse::<i32>() {
        Ok(year) => (false, year),
        Err(_) => (true, 0),
    });
    categories
}

fn value_range(series: &[Series]) -> Option<ValueRange> {
    series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.y))
        .fold(None, |range, y| match range {
            None => Some(ValueRange { min: y, max: y }),
            Some(r) => Some(ValueRange {
                min: r.min.min(y),
                max: r.max.max(y),
            }),
        })
}

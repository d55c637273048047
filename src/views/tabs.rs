use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tab {
    #[default]
    LineChart,
    Heatmap,
    Table,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::LineChart, Tab::Heatmap, Tab::Table];

    pub fn label(self) -> &'static str {
        match self {
            Tab::LineChart => "Line Chart",
            Tab::Heatmap => "Heatmap",
            Tab::Table => "Table",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_and_default() {
        assert_eq!(Tab::default(), Tab::LineChart);
        let labels: Vec<String> = Tab::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["Line Chart", "Heatmap", "Table"]);
    }
}

//! Runtime configuration: which indicator to request, for which entities, from where.
//!
//! Stored as an optional JSON file; every key is optional:
//! ```json
//! {
//!   "indicator": "EN.GHG.ALL.LU.MT.CE.AR5",
//!   "entity_codes": ["USA", "DEU"],
//!   "request_timeout_secs": 15
//! }
//! ```

use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::filter::{DEFAULT_PERIOD_END, DEFAULT_PERIOD_START, FilterState};

pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2/country";

/// Total greenhouse gas emissions excluding LULUCF (Mt CO2e).
pub const INDICATOR_EXCLUDING_LULUCF: &str = "EN.GHG.ALL.MT.CE.AR5";
/// Total greenhouse gas emissions including LULUCF (Mt CO2e).
pub const INDICATOR_INCLUDING_LULUCF: &str = "EN.GHG.ALL.LU.MT.CE.AR5";

/// Deadline for establishing a connection, applied whatever the request timeout.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_ENTITY_CODES: [&str; 6] = ["USA", "JPN", "CHN", "IND", "FRA", "BRA"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub base_url: String,
    pub indicator: String,
    pub entity_codes: Vec<String>,
    /// Per-request deadline in seconds; `0` disables it.
    pub request_timeout_secs: u64,
    pub period_start: i32,
    pub period_end: i32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            indicator: INDICATOR_EXCLUDING_LULUCF.to_string(),
            entity_codes: DEFAULT_ENTITY_CODES.iter().map(|c| c.to_string()).collect(),
            request_timeout_secs: 30,
            period_start: DEFAULT_PERIOD_START,
            period_end: DEFAULT_PERIOD_END,
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading config '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("parsing config '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        if self.indicator.trim().is_empty() {
            bail!("indicator must not be empty");
        }
        if self.entity_codes.is_empty() {
            bail!("entity_codes must list at least one entity");
        }
        if let Some(code) = self.entity_codes.iter().find(|c| c.trim().is_empty()) {
            bail!("entity_codes contains a blank code {code:?}");
        }
        if self.period_start > self.period_end {
            bail!(
                "period_start {} is after period_end {}",
                self.period_start,
                self.period_end
            );
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    /// Initial filter: the configured period range, every entity.
    pub fn default_filter(&self) -> FilterState {
        FilterState::new(self.period_start, self.period_end)
    }
}

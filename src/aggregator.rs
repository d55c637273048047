//! Fetch Aggregator: one request per entity, run concurrently, merged into
//! a single oldest-first record sequence.

use std::sync::Arc;

use tracing::{Instrument, debug, error, info, warn};

use crate::error::FetchError;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::record::{Record, dedup_last_write_wins, decode_response};

/// One entity whose fetch was absorbed as an empty contribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityFailure {
    pub entity_code: String,
    pub error: FetchError,
}

/// Outcome of fetching every configured entity.
///
/// Emptiness is never overloaded: `Empty` means at least one entity answered
/// but nobody had observations, `TotalFailure` means every fetch failed.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    Data {
        records: Vec<Record>,
        failures: Vec<EntityFailure>,
    },
    Empty {
        failures: Vec<EntityFailure>,
    },
    TotalFailure {
        failures: Vec<EntityFailure>,
    },
}

impl Aggregate {
    /// The flat record sequence; empty for both no-data outcomes.
    pub fn records(&self) -> &[Record] {
        match self {
            Aggregate::Data { records, .. } => records,
            Aggregate::Empty { .. } | Aggregate::TotalFailure { .. } => &[],
        }
    }

    pub fn failures(&self) -> &[EntityFailure] {
        match self {
            Aggregate::Data { failures, .. }
            | Aggregate::Empty { failures }
            | Aggregate::TotalFailure { failures } => failures,
        }
    }

    pub fn has_data(&self) -> bool {
        matches!(self, Aggregate::Data { .. })
    }

    fn from_parts(records: Vec<Record>, failures: Vec<EntityFailure>, attempted: usize) -> Self {
        if !records.is_empty() {
            Aggregate::Data { records, failures }
        } else if attempted > 0 && failures.len() == attempted {
            Aggregate::TotalFailure { failures }
        } else {
            Aggregate::Empty { failures }
        }
    }
}

/// Builds the per-entity indicator URL.
pub fn entity_url(base_url: &str, entity_code: &str, indicator: &str) -> String {
    format!(
        "{}/{}/indicator/{}?format=json",
        base_url.trim_end_matches('/'),
        entity_code,
        indicator
    )
}

/// Fetches one entity and returns its records oldest period first.
pub async fn fetch_entity<C: HttpClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<Vec<Record>, FetchError> {
    let bytes = fetch_bytes(client, url).await?;
    let (envelope, mut records) = decode_response(&bytes)?;
    debug!(
        page = ?envelope.page,
        pages = ?envelope.pages,
        total = ?envelope.total,
        records = records.len(),
        "Entity response decoded"
    );
    // Upstream sends newest first.
    records.reverse();
    Ok(records)
}

/// Issues every entity fetch at once and joins them in input order.
pub struct Aggregator<C> {
    client: Arc<C>,
    base_url: String,
    indicator: String,
}

impl<C: HttpClient + 'static> Aggregator<C> {
    pub fn new(client: C, base_url: impl Into<String>, indicator: impl Into<String>) -> Self {
        Self {
            client: Arc::new(client),
            base_url: base_url.into(),
            indicator: indicator.into(),
        }
    }

    pub fn url_for(&self, entity_code: &str) -> String {
        entity_url(&self.base_url, entity_code, &self.indicator)
    }

    /// Fetches all `entity_codes` concurrently.
    ///
    /// A failing entity contributes nothing and is listed in the outcome's
    /// failures; it never aborts the others. Records are concatenated in
    /// `entity_codes` order.
    #[tracing::instrument(skip(self, entity_codes), fields(indicator = %self.indicator, entities = entity_codes.len()))]
    pub async fn fetch_all(&self, entity_codes: &[String]) -> Aggregate {
        let mut tasks = Vec::with_capacity(entity_codes.len());

        for code in entity_codes {
            let client = Arc::clone(&self.client);
            let url = self.url_for(code);

            let span = tracing::info_span!("fetch_entity", entity_code = %code, url = %url);
            let task = tokio::spawn(
                async move {
                    let result = fetch_entity(client.as_ref(), &url).await;
                    match &result {
                        Ok(records) => info!(records = records.len(), "Entity fetched"),
                        Err(e) => warn!(error = %e, "Entity fetch failed, contributing no records"),
                    }
                    result
                }
                .instrument(span),
            );

            tasks.push((code.clone(), task));
        }

        let mut records = Vec::new();
        let mut failures = Vec::new();

        for (entity_code, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(e) => Err(FetchError::Task(e.to_string())),
            };

            match result {
                Ok(entity_records) => records.extend(entity_records),
                Err(error) => failures.push(EntityFailure { entity_code, error }),
            }
        }

        let records = dedup_last_write_wins(records);
        let aggregate = Aggregate::from_parts(records, failures, entity_codes.len());

        match &aggregate {
            Aggregate::Data { records, failures } => info!(
                records = records.len(),
                failed = failures.len(),
                "Aggregation complete"
            ),
            Aggregate::Empty { failures } => {
                warn!(failed = failures.len(), "No entity returned observations")
            }
            Aggregate::TotalFailure { failures } => {
                error!(failed = failures.len(), "Every entity fetch failed")
            }
        }

        aggregate
    }
}

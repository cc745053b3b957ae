use skyfare_core::{AirportCandidate, FlightProvider, FlightResult};
use std::sync::Arc;
use tracing::warn;

/// Resolves typed text into airport suggestions. Debouncing, caching and the
/// minimum-length rule are the caller's business.
pub struct AirportLookup {
    provider: Arc<dyn FlightProvider>,
}

impl AirportLookup {
    pub fn new(provider: Arc<dyn FlightProvider>) -> Self {
        Self { provider }
    }

    /// Candidates in provider (relevance) order.
    pub async fn lookup(&self, query: &str) -> FlightResult<Vec<AirportCandidate>> {
        let airports = self
            .provider
            .search_airports(query)
            .await?
            .into_data("airport search")?;

        Ok(airports.into_iter().map(AirportCandidate::from).collect())
    }

    /// Soft-fail variant: a flaky lookup must never block typing, so failures are
    /// logged and yield no suggestions.
    pub async fn lookup_or_empty(&self, query: &str) -> Vec<AirportCandidate> {
        match self.lookup(query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Airport lookup for '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

use skyfare_core::{
    FlightProvider, FlightResult, FlightSearchParams, MarketSettings, SearchCriteria, SearchSession,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Results requested per search unless configured otherwise.
pub const DEFAULT_RESULT_LIMIT: u32 = 100;

/// Runs one itinerary search per call and normalizes the answer.
pub struct FlightSearchClient {
    provider: Arc<dyn FlightProvider>,
    market: MarketSettings,
    limit: u32,
}

impl FlightSearchClient {
    pub fn new(provider: Arc<dyn FlightProvider>, market: MarketSettings) -> Self {
        Self {
            provider,
            market,
            limit: DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn market(&self) -> &MarketSettings {
        &self.market
    }

    pub fn build_params(&self, criteria: &SearchCriteria, limit: u32) -> FlightSearchParams {
        FlightSearchParams::from_criteria(criteria, &self.market, limit.max(1))
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> FlightResult<SearchSession> {
        self.search_with_limit(criteria, self.limit).await
    }

    /// Issues exactly one provider request. Criteria are not validated here; an
    /// empty itinerary list is a successful, empty session.
    pub async fn search_with_limit(
        &self,
        criteria: &SearchCriteria,
        limit: u32,
    ) -> FlightResult<SearchSession> {
        if criteria.is_same_airport() {
            warn!("Searching with identical origin and destination");
        }

        let params = self.build_params(criteria, limit);
        debug!(
            "Searching {} -> {} on {} (limit {})",
            params.origin_sky_id, params.destination_sky_id, params.date, params.limit
        );

        let data = self
            .provider
            .search_flights(&params)
            .await?
            .into_data("flight search")?;

        let session = SearchSession::from_raw(data, criteria);
        info!(
            "Search session {} returned {} itineraries",
            session.session_id,
            session.results.len()
        );
        Ok(session)
    }
}

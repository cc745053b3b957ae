use async_trait::async_trait;

use crate::detail::DetailQuery;
use crate::search::FlightSearchParams;
use crate::wire::{Envelope, RawAirport, RawDetailData, RawSearchData};
use crate::FlightResult;

/// The external flight-data provider. Implementations own transport and credentials;
/// they return the provider's envelopes untouched and map network failures to
/// `FlightError::Transport`.
#[async_trait]
pub trait FlightProvider: Send + Sync {
    /// `GET searchAirport?query=`
    async fn search_airports(&self, query: &str) -> FlightResult<Envelope<Vec<RawAirport>>>;

    /// `GET searchFlights` with the full parameter set.
    async fn search_flights(
        &self,
        params: &FlightSearchParams,
    ) -> FlightResult<Envelope<RawSearchData>>;

    /// `GET getFlightDetails` for one itinerary of a session.
    async fn get_flight_details(
        &self,
        query: &DetailQuery,
    ) -> FlightResult<Envelope<RawDetailData>>;
}

use async_trait::async_trait;
use serde_json::{json, Value};
use skyfare_core::wire::{Envelope, RawAirport, RawDetailData, RawSearchData};
use skyfare_core::{DetailQuery, FlightError, FlightProvider, FlightResult, FlightSearchParams};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

pub(crate) type DetailReply = FlightResult<Envelope<RawDetailData>>;

/// Provider whose answers are scripted per test. Detail fetches block on a gate
/// per itinerary id so tests control completion order.
#[derive(Default)]
pub(crate) struct ScriptedProvider {
    airports: Mutex<Option<FlightResult<Envelope<Vec<RawAirport>>>>>,
    flights: Mutex<Option<FlightResult<Envelope<RawSearchData>>>>,
    detail_gates: Mutex<HashMap<String, oneshot::Receiver<DetailReply>>>,
    pub airport_queries: Mutex<Vec<String>>,
    pub search_params: Mutex<Vec<FlightSearchParams>>,
    pub detail_queries: Mutex<Vec<DetailQuery>>,
}

impl ScriptedProvider {
    pub fn with_airports(reply: FlightResult<Envelope<Vec<RawAirport>>>) -> Self {
        let provider = Self::default();
        *provider.airports.lock().unwrap() = Some(reply);
        provider
    }

    pub fn with_flights(reply: FlightResult<Envelope<RawSearchData>>) -> Self {
        let provider = Self::default();
        *provider.flights.lock().unwrap() = Some(reply);
        provider
    }

    /// Register a gate for `itinerary_id`; the fetch completes when the sender fires.
    pub fn gate_details(&self, itinerary_id: &str) -> oneshot::Sender<DetailReply> {
        let (tx, rx) = oneshot::channel();
        self.detail_gates
            .lock()
            .unwrap()
            .insert(itinerary_id.to_string(), rx);
        tx
    }

    pub fn detail_started(&self, itinerary_id: &str) -> bool {
        self.detail_queries
            .lock()
            .unwrap()
            .iter()
            .any(|q| q.itinerary_id == itinerary_id)
    }

    pub fn search_calls(&self) -> usize {
        self.search_params.lock().unwrap().len()
    }
}

#[async_trait]
impl FlightProvider for ScriptedProvider {
    async fn search_airports(&self, query: &str) -> FlightResult<Envelope<Vec<RawAirport>>> {
        self.airport_queries.lock().unwrap().push(query.to_string());
        self.airports
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(FlightError::Transport("unscripted".to_string())))
    }

    async fn search_flights(
        &self,
        params: &FlightSearchParams,
    ) -> FlightResult<Envelope<RawSearchData>> {
        self.search_params.lock().unwrap().push(params.clone());
        self.flights
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(FlightError::Transport("unscripted".to_string())))
    }

    async fn get_flight_details(
        &self,
        query: &DetailQuery,
    ) -> FlightResult<Envelope<RawDetailData>> {
        self.detail_queries.lock().unwrap().push(query.clone());
        let gate = self.detail_gates.lock().unwrap().remove(&query.itinerary_id);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(FlightError::Transport("gate dropped".to_string()))),
            None => Err(FlightError::Transport("unscripted".to_string())),
        }
    }
}

pub(crate) fn envelope<T: serde::de::DeserializeOwned>(value: Value) -> Envelope<T> {
    serde_json::from_value(value).expect("Failed to deserialize envelope")
}

/// A `getFlightDetails` payload whose single leg departs from `origin`.
pub(crate) fn detail_reply(origin: &str) -> DetailReply {
    Ok(envelope(json!({
        "status": true,
        "data": {
            "itinerary": {
                "legs": [{
                    "origin": { "id": origin, "displayCode": origin, "city": origin },
                    "destination": { "id": "LAX", "displayCode": "LAX", "city": "Los Angeles" },
                    "duration": 330,
                    "stopCount": 0,
                    "segments": []
                }],
                "pricingOptions": [{ "totalPrice": 199.0, "agents": [] }]
            }
        }
    })))
}

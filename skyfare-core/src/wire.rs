use serde::Deserialize;
use serde_json::Value;

use crate::{FlightError, FlightResult};

// ============================================================================
// Sky Scrapper response shapes
//
// Every field the provider may omit is optional or defaulted; the conversion
// into view models lives next to each model (`AirportCandidate::from`,
// `ItinerarySummary::from_raw`, `DetailView::from_raw`).
// ============================================================================

/// `{ "status": bool, "data": ..., "message": ... }` wrapper used by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<Value>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            status: false,
            data: None,
            message: Some(Value::String(message.to_string())),
        }
    }

    /// Unwrap the payload, turning `status: false` or a missing `data` into a provider error.
    pub fn into_data(self, operation: &str) -> FlightResult<T> {
        if !self.status {
            let detail = match self.message {
                Some(Value::String(msg)) => msg,
                Some(other) => other.to_string(),
                None => "status flag was false".to_string(),
            };
            return Err(FlightError::Provider(format!("{} failed: {}", operation, detail)));
        }

        self.data
            .ok_or_else(|| FlightError::Provider(format!("{} returned no data", operation)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAirport {
    pub sky_id: String,
    pub entity_id: String,
    pub presentation: RawPresentation,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPresentation {
    pub title: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSearchData {
    pub itineraries: Vec<RawItinerary>,
    pub flights_session_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawItinerary {
    pub id: String,
    pub price: Option<RawPrice>,
    pub legs: Vec<RawLeg>,
    pub fare_policy: Option<RawFarePolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPrice {
    pub raw: Option<f64>,
    pub formatted: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawLeg {
    pub origin: Option<RawPlace>,
    pub destination: Option<RawPlace>,
    pub duration_in_minutes: Option<u32>,
    pub stop_count: Option<u32>,
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub carriers: Option<RawCarriers>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPlace {
    pub id: Option<String>,
    pub display_code: Option<String>,
    pub city: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawCarriers {
    pub marketing: Vec<RawCarrier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawCarrier {
    pub name: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFarePolicy {
    pub is_change_allowed: bool,
    pub is_partially_changeable: bool,
    pub is_cancellation_allowed: bool,
    pub is_partially_refundable: bool,
}

/// Payload of `getFlightDetails`. The provider answers either with the itinerary
/// directly or, in its booking mode, with a polling handshake.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDetailData {
    pub itinerary: Option<RawItineraryDetail>,
    pub polling_completed: Option<bool>,
    pub booking_session_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawItineraryDetail {
    pub legs: Vec<RawDetailLeg>,
    pub pricing_options: Vec<RawPricingOption>,
    pub destination_image: Option<String>,
    pub fare_policy: Option<RawFarePolicy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDetailLeg {
    pub origin: Option<RawPlace>,
    pub destination: Option<RawPlace>,
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub duration: Option<u32>,
    pub stop_count: Option<u32>,
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSegment {
    pub origin: Option<RawPlace>,
    pub destination: Option<RawPlace>,
    pub flight_number: Option<String>,
    pub departure: Option<String>,
    pub arrival: Option<String>,
    pub duration: Option<u32>,
    pub marketing_carrier: Option<RawMarketingCarrier>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMarketingCarrier {
    pub name: Option<String>,
    pub display_code: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPricingOption {
    pub total_price: Option<f64>,
    pub agents: Vec<RawAgent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAgent {
    pub name: Option<String>,
}

use serde::{Deserialize, Serialize};

use crate::search::{format_duration, place, Carrier, LegPlace, LegRef, MarketSettings};
use crate::wire::{Envelope, RawDetailData, RawFarePolicy, RawItineraryDetail, RawSegment};
use crate::{FlightError, FlightResult};

pub const DETAIL_UNAVAILABLE_MESSAGE: &str = "Unable to fetch flight details";

/// What the detail endpoint accepts for each leg: display codes only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegDescriptor {
    pub origin: String,
    pub destination: String,
    pub date: String,
}

impl From<&LegRef> for LegDescriptor {
    fn from(leg: &LegRef) -> Self {
        Self {
            origin: leg.origin.display_code.clone(),
            destination: leg.destination.display_code.clone(),
            date: leg.date.clone(),
        }
    }
}

fn default_adults() -> u32 {
    1
}

/// Detail lookup for one selected itinerary of a search session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailFetchRequest {
    pub itinerary_id: String,
    pub legs: Vec<LegRef>,
    pub session_id: String,
    #[serde(default = "default_adults")]
    pub adults: u32,
}

impl DetailFetchRequest {
    pub fn new(itinerary_id: &str, legs: Vec<LegRef>, session_id: &str) -> Self {
        Self {
            itinerary_id: itinerary_id.to_string(),
            legs,
            session_id: session_id.to_string(),
            adults: default_adults(),
        }
    }

    pub fn leg_descriptors(&self) -> Vec<LegDescriptor> {
        self.legs.iter().map(LegDescriptor::from).collect()
    }

    /// A fetch is only worth issuing once both ids are known.
    pub fn validate(&self) -> FlightResult<()> {
        if self.itinerary_id.is_empty() || self.session_id.is_empty() {
            return Err(FlightError::Validation(
                "An itinerary and search session are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Query string of `getFlightDetails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailQuery {
    pub itinerary_id: String,
    /// JSON-encoded `[LegDescriptor]`.
    pub legs: String,
    pub session_id: String,
    pub adults: u32,
    pub currency: String,
    pub locale: String,
    pub market: String,
    pub country_code: String,
}

impl DetailQuery {
    pub fn new(request: &DetailFetchRequest, market: &MarketSettings) -> FlightResult<Self> {
        let legs = serde_json::to_string(&request.leg_descriptors())
            .map_err(|e| FlightError::Validation(format!("Cannot encode legs: {}", e)))?;

        Ok(Self {
            itinerary_id: request.itinerary_id.clone(),
            legs,
            session_id: request.session_id.clone(),
            adults: request.adults.max(1),
            currency: market.currency.clone(),
            locale: market.locale.clone(),
            market: market.market.clone(),
            country_code: market.country_code.clone(),
        })
    }
}

// ============================================================================
// Detail view
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarePolicy {
    pub is_change_allowed: bool,
    pub is_partially_changeable: bool,
    pub is_cancellation_allowed: bool,
    pub is_partially_refundable: bool,
}

impl From<RawFarePolicy> for FarePolicy {
    fn from(raw: RawFarePolicy) -> Self {
        Self {
            is_change_allowed: raw.is_change_allowed,
            is_partially_changeable: raw.is_partially_changeable,
            is_cancellation_allowed: raw.is_cancellation_allowed,
            is_partially_refundable: raw.is_partially_refundable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub flight_number: String,
    pub marketing_carrier: Carrier,
    pub origin: String,
    pub destination: String,
    pub departure: String,
    pub arrival: String,
    pub duration: u32,
}

impl From<RawSegment> for Segment {
    fn from(raw: RawSegment) -> Self {
        let carrier = raw.marketing_carrier.unwrap_or_default();
        Self {
            flight_number: raw.flight_number.unwrap_or_default(),
            marketing_carrier: Carrier {
                name: carrier.name.or(carrier.display_code).unwrap_or_default(),
                logo_url: carrier.logo.unwrap_or_default(),
            },
            origin: place(raw.origin).display_code,
            destination: place(raw.destination).display_code,
            departure: raw.departure.unwrap_or_default(),
            arrival: raw.arrival.unwrap_or_default(),
            duration: raw.duration.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailLeg {
    pub origin: LegPlace,
    pub destination: LegPlace,
    pub departure: String,
    pub arrival: String,
    /// Minutes.
    pub duration: u32,
    pub stop_count: u32,
    pub segments: Vec<Segment>,
}

impl DetailLeg {
    pub fn duration_label(&self) -> String {
        format_duration(self.duration)
    }

    pub fn stops_label(&self) -> String {
        match self.stop_count {
            0 => "Direct".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{} stops", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingOption {
    pub total_price: f64,
    pub agents: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub legs: Vec<DetailLeg>,
    pub pricing_options: Vec<PricingOption>,
    pub destination_image: Option<String>,
    pub fare_policy: Option<FarePolicy>,
}

impl DetailView {
    pub fn from_raw(raw: RawItineraryDetail) -> Self {
        let legs = raw
            .legs
            .into_iter()
            .map(|leg| DetailLeg {
                origin: place(leg.origin),
                destination: place(leg.destination),
                departure: leg.departure.unwrap_or_default(),
                arrival: leg.arrival.unwrap_or_default(),
                duration: leg.duration.unwrap_or(0),
                stop_count: leg.stop_count.unwrap_or(0),
                segments: leg.segments.into_iter().map(Segment::from).collect(),
            })
            .collect();

        let pricing_options = raw
            .pricing_options
            .into_iter()
            .filter_map(|opt| {
                opt.total_price.map(|total_price| PricingOption {
                    total_price,
                    agents: opt.agents.into_iter().filter_map(|a| a.name).collect(),
                })
            })
            .collect();

        Self {
            legs,
            pricing_options,
            destination_image: raw.destination_image,
            fare_policy: raw.fare_policy.map(FarePolicy::from),
        }
    }

    /// Convert a `getFlightDetails` response. Only the direct itinerary shape is
    /// supported; the booking handshake is reported as a provider error.
    pub fn from_envelope(envelope: Envelope<RawDetailData>) -> FlightResult<Self> {
        if !envelope.status {
            return Err(FlightError::Provider(DETAIL_UNAVAILABLE_MESSAGE.to_string()));
        }
        let data = envelope
            .data
            .ok_or_else(|| FlightError::Provider(DETAIL_UNAVAILABLE_MESSAGE.to_string()))?;

        match data.itinerary {
            Some(itinerary) => Ok(Self::from_raw(itinerary)),
            None => match data.booking_session_id {
                Some(booking_session_id) => Err(FlightError::Provider(format!(
                    "Provider answered with a booking handshake ({}), polling completed: {}",
                    booking_session_id,
                    data.polling_completed.unwrap_or(false)
                ))),
                None => Err(FlightError::Provider(DETAIL_UNAVAILABLE_MESSAGE.to_string())),
            },
        }
    }

    /// Cheapest total across pricing options, as shown under "Price Details".
    pub fn best_price(&self) -> Option<f64> {
        self.pricing_options
            .iter()
            .map(|p| p.total_price)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn total_stops(&self) -> u32 {
        self.legs.iter().map(|l| l.stop_count).sum()
    }
}

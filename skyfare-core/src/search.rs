use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::airport::AirportCandidate;
use crate::wire::{RawItinerary, RawPlace, RawSearchData};
use crate::{FlightError, FlightResult};

/// Placeholder for provider fields that are missing from an itinerary.
pub const NOT_AVAILABLE: &str = "N/A";

pub const MISSING_FIELDS_MESSAGE: &str = "Please select both airports and date";

// ============================================================================
// Enumerations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub const ALL: [CabinClass; 4] = [
        CabinClass::Economy,
        CabinClass::PremiumEconomy,
        CabinClass::Business,
        CabinClass::First,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium_economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CabinClass::Economy => "Economy",
            CabinClass::PremiumEconomy => "Premium Economy",
            CabinClass::Business => "Business",
            CabinClass::First => "First",
        }
    }

    /// Unknown values fall back to economy.
    pub fn parse_or_default(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == raw)
            .unwrap_or_default()
    }
}

impl From<String> for CabinClass {
    fn from(raw: String) -> Self {
        Self::parse_or_default(&raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum SortBy {
    #[default]
    Best,
    PriceHigh,
    Fastest,
    OutboundTakeOffTime,
    OutboundLandingTime,
    ReturnTakeOffTime,
    ReturnLandingTime,
}

impl SortBy {
    pub const ALL: [SortBy; 7] = [
        SortBy::Best,
        SortBy::PriceHigh,
        SortBy::Fastest,
        SortBy::OutboundTakeOffTime,
        SortBy::OutboundLandingTime,
        SortBy::ReturnTakeOffTime,
        SortBy::ReturnLandingTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Best => "best",
            SortBy::PriceHigh => "price_high",
            SortBy::Fastest => "fastest",
            SortBy::OutboundTakeOffTime => "outbound_take_off_time",
            SortBy::OutboundLandingTime => "outbound_landing_time",
            SortBy::ReturnTakeOffTime => "return_take_off_time",
            SortBy::ReturnLandingTime => "return_landing_time",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortBy::Best => "Best",
            // the provider's "price_high" orders cheapest first
            SortBy::PriceHigh => "Cheapest",
            SortBy::Fastest => "Fastest",
            SortBy::OutboundTakeOffTime => "Departure (outbound)",
            SortBy::OutboundLandingTime => "Arrival (outbound)",
            SortBy::ReturnTakeOffTime => "Departure (return)",
            SortBy::ReturnLandingTime => "Arrival (return)",
        }
    }

    /// Unknown values fall back to "best".
    pub fn parse_or_default(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == raw)
            .unwrap_or_default()
    }
}

impl From<String> for SortBy {
    fn from(raw: String) -> Self {
        Self::parse_or_default(&raw)
    }
}

// ============================================================================
// Criteria & query
// ============================================================================

/// What the user entered in the search form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    pub origin: Option<AirportCandidate>,
    pub destination: Option<AirportCandidate>,
    /// ISO date (`YYYY-MM-DD`); empty means unset.
    pub date: String,
    pub return_date: Option<String>,
    pub cabin_class: CabinClass,
    pub sort_by: SortBy,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            origin: None,
            destination: None,
            date: String::new(),
            return_date: None,
            cabin_class: CabinClass::default(),
            sort_by: SortBy::default(),
            adults: 1,
            children: 0,
            infants: 0,
        }
    }
}

impl SearchCriteria {
    /// Origin, destination and departure date are all present.
    pub fn is_complete(&self) -> bool {
        self.origin.is_some() && self.destination.is_some() && !self.date.is_empty()
    }

    /// Fail-fast check run before any network call.
    pub fn validate(&self) -> FlightResult<()> {
        if !self.is_complete() {
            return Err(FlightError::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }

        parse_iso_date(&self.date, "departure")?;
        if let Some(ret) = self.return_date.as_deref().filter(|d| !d.is_empty()) {
            parse_iso_date(ret, "return")?;
        }

        Ok(())
    }

    /// Origin and destination resolve to the same airport. Allowed, but worth a warning.
    pub fn is_same_airport(&self) -> bool {
        match (&self.origin, &self.destination) {
            (Some(o), Some(d)) => o.sky_id == d.sky_id,
            _ => false,
        }
    }

    pub fn passenger_count(&self) -> u32 {
        self.adults + self.children + self.infants
    }

    /// Date stamped on leg `leg_index` of a result. Legs after the first are the
    /// return trip, so they carry the return date when one is set rather than the
    /// departure date.
    fn return_date_for_leg(&self, leg_index: usize) -> &str {
        match self.return_date.as_deref() {
            Some(ret) if leg_index > 0 && !ret.is_empty() => ret,
            _ => &self.date,
        }
    }
}

/// Blank provider strings count as missing.
fn non_empty(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

fn parse_iso_date(raw: &str, which: &str) -> FlightResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        FlightError::Validation(format!("Invalid {} date: {}", which, raw))
    })
}

/// Currency/market settings sent with every provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub currency: String,
    pub market: String,
    pub country_code: String,
    pub locale: String,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            market: "en-US".to_string(),
            country_code: "US".to_string(),
            locale: "en-US".to_string(),
        }
    }
}

/// Query string of `searchFlights`, field names as the provider expects them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSearchParams {
    pub origin_sky_id: String,
    pub destination_sky_id: String,
    pub origin_entity_id: String,
    pub destination_entity_id: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub cabin_class: CabinClass,
    pub adults: u32,
    pub childrens: u32,
    pub infants: u32,
    pub sort_by: SortBy,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carriers_ids: Option<String>,
    pub currency: String,
    pub market: String,
    pub country_code: String,
}

impl FlightSearchParams {
    /// Build the provider query. Missing airports are sent as empty ids; validation
    /// is the caller's job.
    pub fn from_criteria(criteria: &SearchCriteria, market: &MarketSettings, limit: u32) -> Self {
        let (origin_sky_id, origin_entity_id) = airport_ids(criteria.origin.as_ref());
        let (destination_sky_id, destination_entity_id) =
            airport_ids(criteria.destination.as_ref());

        Self {
            origin_sky_id,
            destination_sky_id,
            origin_entity_id,
            destination_entity_id,
            date: criteria.date.clone(),
            return_date: criteria.return_date.clone().filter(|d| !d.is_empty()),
            cabin_class: criteria.cabin_class,
            adults: criteria.adults.max(1),
            childrens: criteria.children,
            infants: criteria.infants,
            sort_by: criteria.sort_by,
            limit,
            carriers_ids: None,
            currency: or_default(&market.currency, "USD"),
            market: or_default(&market.market, "en-US"),
            country_code: or_default(&market.country_code, "US"),
        }
    }
}

fn airport_ids(airport: Option<&AirportCandidate>) -> (String, String) {
    airport
        .map(|a| (a.sky_id.clone(), a.entity_id.clone()))
        .unwrap_or_default()
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

// ============================================================================
// View models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carrier {
    pub name: String,
    pub logo_url: String,
}

/// The part of a provider place object the rest of the pipeline needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegPlace {
    pub id: String,
    pub display_code: String,
    pub city: String,
}

impl From<RawPlace> for LegPlace {
    fn from(raw: RawPlace) -> Self {
        Self {
            id: raw.id.unwrap_or_default(),
            display_code: raw.display_code.unwrap_or_default(),
            city: raw.city.or(raw.name).unwrap_or_default(),
        }
    }
}

pub(crate) fn place(raw: Option<RawPlace>) -> LegPlace {
    raw.map(LegPlace::from).unwrap_or_default()
}

/// Leg reference kept on a summary so the detail fetch can be issued later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegRef {
    pub origin: LegPlace,
    pub destination: LegPlace,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItinerarySummary {
    pub id: String,
    pub price: String,
    /// Minutes.
    pub duration: u32,
    pub stop_count: u32,
    pub departure: String,
    pub arrival: String,
    pub carriers: Vec<Carrier>,
    pub legs: Vec<LegRef>,
}

impl ItinerarySummary {
    /// Summarize an itinerary from its first leg. Return legs only show up in `legs`
    /// (and later in the detail view).
    pub fn from_raw(raw: RawItinerary, criteria: &SearchCriteria) -> Self {
        let price = raw
            .price
            .and_then(|p| p.formatted)
            .and_then(non_empty)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let first = raw.legs.first().cloned().unwrap_or_default();
        let carriers = first
            .carriers
            .map(|c| {
                c.marketing
                    .into_iter()
                    .map(|carrier| Carrier {
                        name: carrier
                            .name
                            .and_then(non_empty)
                            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                        logo_url: carrier.logo_url.unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let legs = raw
            .legs
            .into_iter()
            .enumerate()
            .map(|(idx, leg)| LegRef {
                origin: place(leg.origin),
                destination: place(leg.destination),
                date: criteria.return_date_for_leg(idx).to_string(),
            })
            .collect();

        Self {
            id: raw.id,
            price,
            duration: first.duration_in_minutes.unwrap_or(0),
            stop_count: first.stop_count.unwrap_or(0),
            departure: first
                .departure
                .and_then(non_empty)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            arrival: first
                .arrival
                .and_then(non_empty)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            carriers,
            legs,
        }
    }

    /// "5h 30m"
    pub fn duration_label(&self) -> String {
        format_duration(self.duration)
    }
}

/// Result of one successful search. Replaced wholesale by the next search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSession {
    pub session_id: String,
    pub results: Vec<ItinerarySummary>,
}

impl SearchSession {
    pub fn from_raw(data: RawSearchData, criteria: &SearchCriteria) -> Self {
        Self {
            session_id: data.flights_session_id.unwrap_or_default(),
            results: data
                .itineraries
                .into_iter()
                .map(|it| ItinerarySummary::from_raw(it, criteria))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn find(&self, itinerary_id: &str) -> Option<&ItinerarySummary> {
        self.results.iter().find(|r| r.id == itinerary_id)
    }
}

pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

use serde::{Deserialize, Serialize};

use crate::wire::RawAirport;

/// Shortest query (in characters) worth sending to the airport lookup.
pub const MIN_LOOKUP_CHARS: usize = 2;

/// An airport suggestion. Identity is `sky_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirportCandidate {
    pub sky_id: String,
    pub entity_id: String,
    pub title: String,
    pub subtitle: String,
}

impl AirportCandidate {
    pub fn new(sky_id: &str, entity_id: &str, title: &str, subtitle: &str) -> Self {
        Self {
            sky_id: sky_id.to_string(),
            entity_id: entity_id.to_string(),
            title: title.to_string(),
            subtitle: subtitle.to_string(),
        }
    }

    /// "John F. Kennedy International (New York)"
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.title, self.subtitle)
    }
}

impl From<RawAirport> for AirportCandidate {
    fn from(raw: RawAirport) -> Self {
        Self {
            sky_id: raw.sky_id,
            entity_id: raw.entity_id,
            title: raw.presentation.title,
            subtitle: raw.presentation.subtitle,
        }
    }
}

/// Callers must not issue a lookup for queries shorter than [`MIN_LOOKUP_CHARS`].
pub fn should_lookup(query: &str) -> bool {
    query.chars().count() >= MIN_LOOKUP_CHARS
}

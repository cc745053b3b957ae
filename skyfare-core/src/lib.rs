pub mod airport;
pub mod detail;
pub mod form;
pub mod provider;
pub mod search;
pub mod wire;

pub use airport::{should_lookup, AirportCandidate, MIN_LOOKUP_CHARS};
pub use detail::{DetailFetchRequest, DetailQuery, DetailView};
pub use provider::FlightProvider;
pub use search::{
    CabinClass, FlightSearchParams, ItinerarySummary, MarketSettings, SearchCriteria,
    SearchSession, SortBy,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlightError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Request was superseded")]
    Cancelled,
}

impl FlightError {
    /// Superseded requests are dropped silently rather than shown to the user.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FlightError::Cancelled)
    }

    /// Message suitable for inline display next to the form or detail view.
    pub fn user_message(&self) -> String {
        match self {
            FlightError::Validation(msg)
            | FlightError::Provider(msg)
            | FlightError::Transport(msg) => msg.clone(),
            FlightError::Cancelled => String::new(),
        }
    }
}

pub type FlightResult<T> = Result<T, FlightError>;

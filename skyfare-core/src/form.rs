use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::airport::{should_lookup, AirportCandidate};
use crate::detail::DetailFetchRequest;
use crate::search::{CabinClass, ItinerarySummary, SearchCriteria, SearchSession, SortBy};
use crate::FlightError;

pub const NO_FLIGHTS_MESSAGE: &str = "No flights available for the selected route and date";
pub const SEARCH_UNAVAILABLE_MESSAGE: &str = "Unable to fetch flight results. Please try again.";
pub const SEARCH_FAILED_MESSAGE: &str = "Error searching flights";

const UNSET_DATE_LABEL: &str = "Select";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportField {
    Origin,
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dropdown {
    Sort,
    Passengers,
    Class,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Passenger {
    Adult,
    Child,
    Infant,
}

impl Passenger {
    fn floor(&self) -> u32 {
        match self {
            Passenger::Adult => 1,
            Passenger::Child | Passenger::Infant => 0,
        }
    }
}

/// Issued when typing into an airport field warrants a lookup. Results are only
/// applied if no newer ticket was issued for the same field in the meantime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub field: AirportField,
    pub query: String,
    pub generation: u64,
}

/// Outcome of trying to start a search from the current form.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStart {
    /// A search is already running; the submit is ignored.
    Busy,
    /// Required fields are missing; the message is on `error`.
    Invalid(FlightError),
    Ready(SearchCriteria),
}

/// Everything the search screen holds between renders.
#[derive(Debug, Clone, Default)]
pub struct SearchFormState {
    pub criteria: SearchCriteria,
    pub origin_input: String,
    pub destination_input: String,
    pub origin_options: Vec<AirportCandidate>,
    pub destination_options: Vec<AirportCandidate>,
    pub open_dropdown: Option<Dropdown>,
    pub results: Vec<ItinerarySummary>,
    pub selected: Option<ItinerarySummary>,
    pub session_id: String,
    pub error: Option<String>,
    pub loading: bool,
    pub has_searched: bool,
    origin_generation: u64,
    destination_generation: u64,
}

impl SearchFormState {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Airports
    // ------------------------------------------------------------------

    /// Record typed text. Returns a ticket when the text is long enough to look up.
    pub fn set_airport_input(&mut self, field: AirportField, text: &str) -> Option<LookupTicket> {
        let generation = self.bump_generation(field);
        match field {
            AirportField::Origin => self.origin_input = text.to_string(),
            AirportField::Destination => self.destination_input = text.to_string(),
        }

        should_lookup(text).then(|| LookupTicket {
            field,
            query: text.to_string(),
            generation,
        })
    }

    pub fn set_origin_input(&mut self, text: &str) -> Option<LookupTicket> {
        self.set_airport_input(AirportField::Origin, text)
    }

    pub fn set_destination_input(&mut self, text: &str) -> Option<LookupTicket> {
        self.set_airport_input(AirportField::Destination, text)
    }

    /// Replace a field's suggestions with lookup results. Stale tickets are dropped.
    pub fn apply_suggestions(
        &mut self,
        ticket: &LookupTicket,
        candidates: Vec<AirportCandidate>,
    ) -> bool {
        if ticket.generation != self.generation(ticket.field) {
            debug!(
                "Dropping stale {:?} suggestions for '{}'",
                ticket.field, ticket.query
            );
            return false;
        }

        match ticket.field {
            AirportField::Origin => self.origin_options = candidates,
            AirportField::Destination => self.destination_options = candidates,
        }
        true
    }

    /// Pick a suggestion: the airport is set, its title mirrored into the input and
    /// the field's suggestion list cleared.
    pub fn choose_airport(&mut self, field: AirportField, airport: AirportCandidate) {
        self.bump_generation(field);
        match field {
            AirportField::Origin => {
                self.origin_input = airport.title.clone();
                self.origin_options.clear();
                self.criteria.origin = Some(airport);
            }
            AirportField::Destination => {
                self.destination_input = airport.title.clone();
                self.destination_options.clear();
                self.criteria.destination = Some(airport);
            }
        }
    }

    pub fn choose_origin(&mut self, airport: AirportCandidate) {
        self.choose_airport(AirportField::Origin, airport);
    }

    pub fn choose_destination(&mut self, airport: AirportCandidate) {
        self.choose_airport(AirportField::Destination, airport);
    }

    /// Exchange origin and destination together with their input texts and
    /// suggestion lists. Lookups in flight for either field become stale.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.criteria.origin, &mut self.criteria.destination);
        std::mem::swap(&mut self.origin_input, &mut self.destination_input);
        std::mem::swap(&mut self.origin_options, &mut self.destination_options);
        self.bump_generation(AirportField::Origin);
        self.bump_generation(AirportField::Destination);
    }

    fn generation(&self, field: AirportField) -> u64 {
        match field {
            AirportField::Origin => self.origin_generation,
            AirportField::Destination => self.destination_generation,
        }
    }

    fn bump_generation(&mut self, field: AirportField) -> u64 {
        let counter = match field {
            AirportField::Origin => &mut self.origin_generation,
            AirportField::Destination => &mut self.destination_generation,
        };
        *counter += 1;
        *counter
    }

    // ------------------------------------------------------------------
    // Dates, cabin, sort, passengers
    // ------------------------------------------------------------------

    pub fn set_date(&mut self, date: &str) {
        self.criteria.date = date.to_string();
    }

    pub fn set_return_date(&mut self, date: &str) {
        self.criteria.return_date = (!date.is_empty()).then(|| date.to_string());
    }

    /// Open the dropdown, or close it if it is already open.
    pub fn toggle_dropdown(&mut self, dropdown: Dropdown) {
        self.open_dropdown = if self.open_dropdown == Some(dropdown) {
            None
        } else {
            Some(dropdown)
        };
    }

    /// Click outside any dropdown.
    pub fn close_dropdowns(&mut self) {
        self.open_dropdown = None;
    }

    pub fn choose_sort(&mut self, sort_by: SortBy) {
        self.criteria.sort_by = sort_by;
        self.open_dropdown = None;
    }

    pub fn choose_cabin_class(&mut self, cabin_class: CabinClass) {
        self.criteria.cabin_class = cabin_class;
        self.open_dropdown = None;
    }

    pub fn increment(&mut self, passenger: Passenger) {
        *self.count_mut(passenger) += 1;
    }

    /// Decrement, never going below 1 adult or 0 children/infants.
    pub fn decrement(&mut self, passenger: Passenger) {
        let floor = passenger.floor();
        let count = self.count_mut(passenger);
        *count = count.saturating_sub(1).max(floor);
    }

    pub fn can_decrement(&self, passenger: Passenger) -> bool {
        self.count(passenger) > passenger.floor()
    }

    pub fn count(&self, passenger: Passenger) -> u32 {
        match passenger {
            Passenger::Adult => self.criteria.adults,
            Passenger::Child => self.criteria.children,
            Passenger::Infant => self.criteria.infants,
        }
    }

    fn count_mut(&mut self, passenger: Passenger) -> &mut u32 {
        match passenger {
            Passenger::Adult => &mut self.criteria.adults,
            Passenger::Child => &mut self.criteria.children,
            Passenger::Infant => &mut self.criteria.infants,
        }
    }

    // ------------------------------------------------------------------
    // Derivations
    // ------------------------------------------------------------------

    pub fn is_search_enabled(&self) -> bool {
        self.criteria.is_complete() && !self.loading
    }

    pub fn cabin_class_label(&self) -> &'static str {
        self.criteria.cabin_class.label()
    }

    pub fn sort_label(&self) -> String {
        format!("Sort: {}", self.criteria.sort_by.label())
    }

    pub fn passenger_summary(&self) -> String {
        match self.criteria.passenger_count() {
            1 => "1 passenger".to_string(),
            n => format!("{} passengers", n),
        }
    }

    pub fn departure_label(&self) -> &str {
        if self.criteria.date.is_empty() {
            UNSET_DATE_LABEL
        } else {
            &self.criteria.date
        }
    }

    pub fn return_label(&self) -> &str {
        match self.criteria.return_date.as_deref() {
            Some(date) if !date.is_empty() => date,
            _ => UNSET_DATE_LABEL,
        }
    }

    // ------------------------------------------------------------------
    // Search lifecycle
    // ------------------------------------------------------------------

    /// Start a search. A second submit while one is running is a no-op.
    pub fn begin_search(&mut self) -> SearchStart {
        if self.loading {
            return SearchStart::Busy;
        }
        self.has_searched = true;

        if let Err(err) = self.criteria.validate() {
            self.error = Some(err.user_message());
            return SearchStart::Invalid(err);
        }

        self.loading = true;
        self.error = None;
        self.results.clear();
        self.selected = None;
        SearchStart::Ready(self.criteria.clone())
    }

    /// Store the outcome of the search started by `begin_search`.
    pub fn finish_search(&mut self, outcome: Result<SearchSession, FlightError>) {
        self.loading = false;

        match outcome {
            Ok(session) => {
                self.session_id = session.session_id;
                if session.results.is_empty() {
                    self.error = Some(NO_FLIGHTS_MESSAGE.to_string());
                }
                self.results = session.results;
            }
            Err(FlightError::Cancelled) => {}
            Err(FlightError::Validation(msg)) => self.error = Some(msg),
            Err(FlightError::Provider(_)) => {
                self.error = Some(SEARCH_UNAVAILABLE_MESSAGE.to_string())
            }
            Err(FlightError::Transport(_)) => self.error = Some(SEARCH_FAILED_MESSAGE.to_string()),
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    pub fn select_result(&mut self, itinerary_id: &str) -> Option<&ItinerarySummary> {
        let found = self.results.iter().find(|r| r.id == itinerary_id).cloned();
        self.selected = found;
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Detail request for the selected result, threaded with the search session.
    pub fn detail_request(&self) -> Option<DetailFetchRequest> {
        let selected = self.selected.as_ref()?;
        if self.session_id.is_empty() {
            return None;
        }
        Some(DetailFetchRequest::new(
            &selected.id,
            selected.legs.clone(),
            &self.session_id,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jfk() -> AirportCandidate {
        AirportCandidate::new("JFK", "95565058", "New York John F. Kennedy", "United States")
    }

    fn lax() -> AirportCandidate {
        AirportCandidate::new("LAX", "95673368", "Los Angeles International", "United States")
    }

    fn summary(id: &str) -> ItinerarySummary {
        ItinerarySummary {
            id: id.to_string(),
            price: "$100".to_string(),
            duration: 300,
            stop_count: 0,
            departure: "2024-06-01T08:00:00".to_string(),
            arrival: "2024-06-01T11:00:00".to_string(),
            carriers: vec![],
            legs: vec![],
        }
    }

    fn ready_form() -> SearchFormState {
        let mut form = SearchFormState::new();
        form.choose_origin(jfk());
        form.choose_destination(lax());
        form.set_date("2024-06-01");
        form
    }

    #[test]
    fn test_swap_twice_is_identity() {
        let mut form = ready_form();
        form.set_origin_input("New Yo");
        form.origin_options = vec![jfk()];
        form.destination_options = vec![lax(), jfk()];

        let before = form.clone();
        form.swap();
        assert_eq!(form.criteria.origin, before.criteria.destination);
        assert_eq!(form.criteria.destination, before.criteria.origin);
        assert_eq!(form.origin_input, before.destination_input);
        assert_eq!(form.origin_options, before.destination_options);

        form.swap();
        assert_eq!(form.criteria, before.criteria);
        assert_eq!(form.origin_input, before.origin_input);
        assert_eq!(form.destination_input, before.destination_input);
        assert_eq!(form.origin_options, before.origin_options);
        assert_eq!(form.destination_options, before.destination_options);
    }

    #[test]
    fn test_short_input_does_not_issue_ticket() {
        let mut form = SearchFormState::new();
        assert!(form.set_origin_input("L").is_none());
        assert_eq!(form.origin_input, "L");

        let ticket = form.set_origin_input("LA").expect("ticket");
        assert_eq!(ticket.query, "LA");
        assert_eq!(ticket.field, AirportField::Origin);
    }

    #[test]
    fn test_stale_suggestions_are_dropped() {
        let mut form = SearchFormState::new();
        let older = form.set_destination_input("Lo").expect("ticket");
        let newer = form.set_destination_input("Los").expect("ticket");

        assert!(form.apply_suggestions(&newer, vec![lax()]));
        // the older response arrives last
        assert!(!form.apply_suggestions(&older, vec![jfk()]));
        assert_eq!(form.destination_options, vec![lax()]);
    }

    #[test]
    fn test_choosing_airport_clears_suggestions_and_invalidates_lookups() {
        let mut form = SearchFormState::new();
        let ticket = form.set_origin_input("New").expect("ticket");
        assert!(form.apply_suggestions(&ticket, vec![jfk()]));

        let pending = form.set_origin_input("New Y").expect("ticket");
        form.choose_origin(jfk());
        assert_eq!(form.origin_input, "New York John F. Kennedy");
        assert!(form.origin_options.is_empty());
        assert!(!form.apply_suggestions(&pending, vec![lax()]));
        assert!(form.origin_options.is_empty());
    }

    #[test]
    fn test_search_enabled() {
        let mut form = SearchFormState::new();
        assert!(!form.is_search_enabled());

        form = ready_form();
        assert!(form.is_search_enabled());

        form.loading = true;
        assert!(!form.is_search_enabled());
    }

    #[test]
    fn test_passenger_steppers_respect_floors() {
        let mut form = SearchFormState::new();
        assert!(!form.can_decrement(Passenger::Adult));
        form.decrement(Passenger::Adult);
        form.decrement(Passenger::Infant);
        assert_eq!(form.count(Passenger::Adult), 1);
        assert_eq!(form.count(Passenger::Infant), 0);

        form.increment(Passenger::Adult);
        form.increment(Passenger::Child);
        form.increment(Passenger::Infant);
        assert!(form.can_decrement(Passenger::Adult));
        assert_eq!(form.passenger_summary(), "4 passengers");

        form.decrement(Passenger::Child);
        form.decrement(Passenger::Infant);
        form.decrement(Passenger::Adult);
        assert_eq!(form.passenger_summary(), "1 passenger");
    }

    #[test]
    fn test_labels() {
        let mut form = SearchFormState::new();
        assert_eq!(form.cabin_class_label(), "Economy");
        assert_eq!(form.sort_label(), "Sort: Best");
        assert_eq!(form.departure_label(), "Select");
        assert_eq!(form.return_label(), "Select");

        form.toggle_dropdown(Dropdown::Class);
        form.choose_cabin_class(CabinClass::PremiumEconomy);
        form.choose_sort(SortBy::PriceHigh);
        form.set_date("2024-06-01");
        form.set_return_date("2024-06-08");

        assert_eq!(form.open_dropdown, None);
        assert_eq!(form.cabin_class_label(), "Premium Economy");
        assert_eq!(form.sort_label(), "Sort: Cheapest");
        assert_eq!(form.departure_label(), "2024-06-01");
        assert_eq!(form.return_label(), "2024-06-08");

        form.set_return_date("");
        assert_eq!(form.criteria.return_date, None);
    }

    #[test]
    fn test_dropdown_toggle() {
        let mut form = SearchFormState::new();
        form.toggle_dropdown(Dropdown::Sort);
        assert_eq!(form.open_dropdown, Some(Dropdown::Sort));
        form.toggle_dropdown(Dropdown::Passengers);
        assert_eq!(form.open_dropdown, Some(Dropdown::Passengers));
        form.toggle_dropdown(Dropdown::Passengers);
        assert_eq!(form.open_dropdown, None);
        form.toggle_dropdown(Dropdown::Sort);
        form.close_dropdowns();
        assert_eq!(form.open_dropdown, None);
    }

    #[test]
    fn test_begin_search_guards() {
        let mut form = SearchFormState::new();
        match form.begin_search() {
            SearchStart::Invalid(FlightError::Validation(_)) => {}
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert!(form.has_searched);
        assert!(form.error.is_some());
        assert!(!form.loading);

        let mut form = ready_form();
        assert!(matches!(form.begin_search(), SearchStart::Ready(_)));
        assert!(form.loading);
        assert!(!form.is_search_enabled());
        assert_eq!(form.begin_search(), SearchStart::Busy);
    }

    #[test]
    fn test_finish_search_messages() {
        let mut form = ready_form();
        form.begin_search();
        form.finish_search(Ok(SearchSession {
            session_id: "abc".to_string(),
            results: vec![],
        }));
        assert!(!form.loading);
        assert_eq!(form.session_id, "abc");
        assert_eq!(form.error.as_deref(), Some(NO_FLIGHTS_MESSAGE));

        form.begin_search();
        form.finish_search(Err(FlightError::Provider("status false".to_string())));
        assert_eq!(form.error.as_deref(), Some(SEARCH_UNAVAILABLE_MESSAGE));

        form.begin_search();
        form.finish_search(Err(FlightError::Transport("connection reset".to_string())));
        assert_eq!(form.error.as_deref(), Some(SEARCH_FAILED_MESSAGE));
        assert!(form.is_search_enabled());
    }

    #[test]
    fn test_selection_builds_detail_request() {
        let mut form = ready_form();
        form.begin_search();
        form.finish_search(Ok(SearchSession {
            session_id: "abc".to_string(),
            results: vec![summary("a"), summary("b")],
        }));
        assert!(form.error.is_none());

        assert!(form.select_result("missing").is_none());
        assert!(form.detail_request().is_none());

        assert_eq!(form.select_result("b").map(|s| s.id.clone()), Some("b".to_string()));
        let request = form.detail_request().expect("detail request");
        assert_eq!(request.itinerary_id, "b");
        assert_eq!(request.session_id, "abc");

        form.clear_selection();
        assert!(form.detail_request().is_none());
    }
}

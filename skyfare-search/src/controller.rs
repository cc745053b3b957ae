//! Glue between `SearchFormState` and the network-facing clients.

use skyfare_core::form::{AirportField, SearchFormState, SearchStart};
use tracing::{debug, error};

use crate::details::{DetailPanel, FlightDetailFetcher};
use crate::flights::FlightSearchClient;
use crate::lookup::AirportLookup;

/// Submit the form. Returns `false` when nothing was sent: a search is already
/// running, or required fields are missing (the message lands on `form.error`).
pub async fn submit_search(form: &mut SearchFormState, client: &FlightSearchClient) -> bool {
    let criteria = match form.begin_search() {
        SearchStart::Busy => {
            debug!("Search already in progress, ignoring submit");
            return false;
        }
        SearchStart::Invalid(err) => {
            debug!("Search not sent: {}", err);
            return false;
        }
        SearchStart::Ready(criteria) => criteria,
    };

    let outcome = client.search(&criteria).await;
    if let Err(e) = &outcome {
        error!("Error searching flights: {}", e);
    }
    form.finish_search(outcome);
    true
}

/// Record typed airport text and refresh the field's suggestions when the text
/// is long enough. Failed lookups leave an empty suggestion list.
pub async fn update_airport_input(
    form: &mut SearchFormState,
    lookup: &AirportLookup,
    field: AirportField,
    text: &str,
) {
    let Some(ticket) = form.set_airport_input(field, text) else {
        return;
    };
    let candidates = lookup.lookup_or_empty(&ticket.query).await;
    form.apply_suggestions(&ticket, candidates);
}

/// Select a result and load its detail into `panel`.
pub async fn open_details(
    form: &mut SearchFormState,
    fetcher: &FlightDetailFetcher,
    panel: &mut DetailPanel,
    itinerary_id: &str,
) {
    form.select_result(itinerary_id);
    let Some(request) = form.detail_request() else {
        debug!("No result {} in the current session", itinerary_id);
        panel.close();
        return;
    };

    panel.open();
    let outcome = fetcher.fetch(&request).await;
    if let Err(e) = &outcome {
        if !e.is_cancelled() {
            error!("Error fetching flight details: {}", e);
        }
    }
    panel.apply(outcome);
}

/// Close the detail view, aborting its request if still in flight.
pub fn close_details(
    form: &mut SearchFormState,
    fetcher: &FlightDetailFetcher,
    panel: &mut DetailPanel,
) {
    fetcher.cancel();
    form.clear_selection();
    panel.close();
}

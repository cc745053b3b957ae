pub mod lookup;
pub mod flights;
pub mod details;
pub mod controller;

#[cfg(test)]
mod fakes;

pub use controller::{close_details, open_details, submit_search, update_airport_input};
pub use details::{DetailPanel, FlightDetailFetcher};
pub use flights::{FlightSearchClient, DEFAULT_RESULT_LIMIT};
pub use lookup::AirportLookup;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use skyfare_core::wire::{Envelope, RawAirport, RawDetailData, RawSearchData};
use skyfare_core::{DetailQuery, FlightError, FlightProvider, FlightResult, FlightSearchParams};
use tracing::{debug, warn};
use url::Url;

use crate::app_config::ProviderConfig;

pub const AIRPORT_SEARCH_PATH: &str = "api/v1/flights/searchAirport";
pub const FLIGHT_SEARCH_PATH: &str = "api/v2/flights/searchFlights";
pub const FLIGHT_DETAILS_PATH: &str = "api/v1/flights/getFlightDetails";

pub const API_KEY_HEADER: &str = "x-rapidapi-key";
pub const API_HOST_HEADER: &str = "x-rapidapi-host";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid provider base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
    #[error("Invalid provider header value: {0}")]
    Header(#[from] InvalidHeaderValue),
    #[error("HTTP client construction failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// `FlightProvider` backed by the Sky Scrapper API on RapidAPI.
#[derive(Debug, Clone)]
pub struct SkyScrapperClient {
    http: Client,
    base_url: Url,
}

impl SkyScrapperClient {
    /// Wrap a pre-configured client. Credentials are expected to be part of its
    /// default headers.
    pub fn with_client(http: Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    /// Build a client that sends the API key and host headers on every request.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ClientError> {
        let mut key = HeaderValue::from_str(config.api_key.expose())?;
        key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);
        headers.insert(API_HOST_HEADER, HeaderValue::from_str(&config.host)?);

        let http = Client::builder()
            .user_agent(concat!("skyfare/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self::with_client(http, Url::parse(&config.base_url)?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn get_envelope<T, Q>(&self, path: &str, query: &Q) -> FlightResult<Envelope<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| FlightError::Transport(format!("cannot build {} URL: {}", path, e)))?;

        debug!("GET {}", url);
        let response = self.http.get(url).query(query).send().await.map_err(|e| {
            warn!("Request to {} failed: {}", path, e);
            FlightError::Transport(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} answered HTTP {}", path, status);
            return Err(FlightError::Transport(format!(
                "Request failed with status code {}",
                status.as_u16()
            )));
        }

        response.json::<Envelope<T>>().await.map_err(|e| {
            warn!("Malformed {} response: {}", path, e);
            FlightError::Provider(format!("malformed provider response: {}", e))
        })
    }
}

#[derive(Serialize)]
struct AirportQuery<'a> {
    query: &'a str,
}

#[async_trait]
impl FlightProvider for SkyScrapperClient {
    async fn search_airports(&self, query: &str) -> FlightResult<Envelope<Vec<RawAirport>>> {
        self.get_envelope(AIRPORT_SEARCH_PATH, &AirportQuery { query }).await
    }

    async fn search_flights(
        &self,
        params: &FlightSearchParams,
    ) -> FlightResult<Envelope<RawSearchData>> {
        self.get_envelope(FLIGHT_SEARCH_PATH, params).await
    }

    async fn get_flight_details(
        &self,
        query: &DetailQuery,
    ) -> FlightResult<Envelope<RawDetailData>> {
        self.get_envelope(FLIGHT_DETAILS_PATH, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{RawQuery, State};
    use axum::http::{HeaderMap as AxumHeaders, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use skyfare_core::search::{CabinClass, MarketSettings, SearchCriteria, SortBy};
    use skyfare_core::{AirportCandidate, DetailFetchRequest};
    use skyfare_shared::Masked;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorded {
        calls: Arc<Mutex<Vec<(String, HashMap<String, String>, Option<String>)>>>,
    }

    impl Recorded {
        fn record(&self, path: &str, query: Option<String>, headers: &AxumHeaders) {
            let params = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
                .into_owned()
                .collect();
            let key = headers
                .get(API_KEY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            self.calls.lock().unwrap().push((path.to_string(), params, key));
        }

        fn calls(&self) -> Vec<(String, HashMap<String, String>, Option<String>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    async fn spawn_provider(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    #[derive(Clone)]
    struct FakeState {
        recorded: Recorded,
        search_body: Value,
    }

    async fn airports(
        State(state): State<FakeState>,
        RawQuery(q): RawQuery,
        headers: AxumHeaders,
    ) -> Json<Value> {
        state.recorded.record("searchAirport", q, &headers);
        Json(json!({
            "status": true,
            "data": [
                { "skyId": "LAX", "entityId": "95673368",
                  "presentation": { "title": "Los Angeles International", "subtitle": "United States" } },
                { "skyId": "LAS", "entityId": "95673365",
                  "presentation": { "title": "Las Vegas Harry Reid", "subtitle": "United States" } }
            ]
        }))
    }

    async fn flights(
        State(state): State<FakeState>,
        RawQuery(q): RawQuery,
        headers: AxumHeaders,
    ) -> Json<Value> {
        state.recorded.record("searchFlights", q, &headers);
        Json(state.search_body)
    }

    async fn details(
        State(state): State<FakeState>,
        RawQuery(q): RawQuery,
        headers: AxumHeaders,
    ) -> (StatusCode, &'static str) {
        state.recorded.record("getFlightDetails", q, &headers);
        (StatusCode::TOO_MANY_REQUESTS, "slow down")
    }

    fn fake_provider(recorded: Recorded, search_body: Value) -> Router {
        Router::new()
            .route("/api/v1/flights/searchAirport", get(airports))
            .route("/api/v2/flights/searchFlights", get(flights))
            .route("/api/v1/flights/getFlightDetails", get(details))
            .with_state(FakeState {
                recorded,
                search_body,
            })
    }

    fn client(base_url: Url) -> SkyScrapperClient {
        let config = ProviderConfig {
            base_url: base_url.to_string(),
            host: "sky-scrapper.p.rapidapi.com".to_string(),
            api_key: Masked::new("test-key".to_string()),
        };
        SkyScrapperClient::from_config(&config).expect("client")
    }

    #[tokio::test]
    async fn test_airport_search_sends_query_and_key() {
        let recorded = Recorded::default();
        let base = spawn_provider(fake_provider(recorded.clone(), json!({}))).await;

        let envelope = client(base).search_airports("LA").await.expect("airports");
        let airports = envelope.into_data("airport search").expect("data");
        assert_eq!(airports.len(), 2);
        assert_eq!(airports[0].sky_id, "LAX");

        let calls = recorded.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.get("query").map(String::as_str), Some("LA"));
        assert_eq!(calls[0].2.as_deref(), Some("test-key"));
    }

    #[tokio::test]
    async fn test_flight_search_query_string() {
        let recorded = Recorded::default();
        let body = json!({
            "status": true,
            "data": { "flightsSessionId": "abc", "itineraries": [{ "id": "1" }] }
        });
        let base = spawn_provider(fake_provider(recorded.clone(), body)).await;

        let criteria = SearchCriteria {
            origin: Some(AirportCandidate::new("JFK", "95565058", "New York", "United States")),
            destination: Some(AirportCandidate::new(
                "LAX",
                "95673368",
                "Los Angeles",
                "United States",
            )),
            date: "2024-06-01".to_string(),
            cabin_class: CabinClass::PremiumEconomy,
            sort_by: SortBy::OutboundTakeOffTime,
            children: 2,
            ..Default::default()
        };
        let params = FlightSearchParams::from_criteria(&criteria, &MarketSettings::default(), 100);

        let envelope = client(base).search_flights(&params).await.expect("search");
        assert!(envelope.status);

        let calls = recorded.calls();
        assert_eq!(calls.len(), 1);
        let q = &calls[0].1;
        assert_eq!(q["originSkyId"], "JFK");
        assert_eq!(q["destinationEntityId"], "95673368");
        assert_eq!(q["date"], "2024-06-01");
        assert_eq!(q["cabinClass"], "premium_economy");
        assert_eq!(q["sortBy"], "outbound_take_off_time");
        assert_eq!(q["adults"], "1");
        assert_eq!(q["childrens"], "2");
        assert_eq!(q["infants"], "0");
        assert_eq!(q["limit"], "100");
        assert_eq!(q["currency"], "USD");
        assert_eq!(q["market"], "en-US");
        assert_eq!(q["countryCode"], "US");
        assert!(!q.contains_key("returnDate"));
    }

    #[tokio::test]
    async fn test_http_error_is_transport_error() {
        let recorded = Recorded::default();
        let base = spawn_provider(fake_provider(recorded.clone(), json!({}))).await;

        let request = DetailFetchRequest::new("it-1", vec![], "sess-1");
        let query = DetailQuery::new(&request, &MarketSettings::default()).unwrap();
        let err = client(base).get_flight_details(&query).await.unwrap_err();

        assert_eq!(
            err,
            FlightError::Transport("Request failed with status code 429".to_string())
        );
        let calls = recorded.calls();
        assert_eq!(calls[0].1["itineraryId"], "it-1");
        assert_eq!(calls[0].1["legs"], "[]");
        assert_eq!(calls[0].1["sessionId"], "sess-1");
    }

    #[tokio::test]
    async fn test_malformed_body_is_provider_error() {
        let recorded = Recorded::default();
        let base = spawn_provider(fake_provider(recorded, json!("not an envelope"))).await;

        let params = FlightSearchParams::from_criteria(
            &SearchCriteria::default(),
            &MarketSettings::default(),
            1,
        );
        let err = client(base).search_flights(&params).await.unwrap_err();
        assert!(matches!(err, FlightError::Provider(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        // bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{}/", addr)).unwrap();
        let err = client(base).search_airports("LA").await.unwrap_err();
        assert!(matches!(err, FlightError::Transport(_)));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let c = SkyScrapperClient::with_client(
            Client::new(),
            Url::parse("http://localhost:9000/proxy").unwrap(),
        );
        assert_eq!(
            c.base_url().join(FLIGHT_SEARCH_PATH).unwrap().as_str(),
            "http://localhost:9000/proxy/api/v2/flights/searchFlights"
        );
    }
}

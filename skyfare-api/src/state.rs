use skyfare_core::FlightProvider;
use skyfare_provider::SearchDefaults;
use skyfare_search::{AirportLookup, FlightDetailFetcher, FlightSearchClient};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use skyfare_core::MarketSettings;

/// Idle fetchers are pruned once the registry grows past this.
const MAX_IDLE_CONSUMERS: usize = 256;

#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<AirportLookup>,
    pub search: Arc<FlightSearchClient>,
    pub details: Arc<DetailFetchers>,
}

impl AppState {
    pub fn new(provider: Arc<dyn FlightProvider>, defaults: &SearchDefaults) -> Self {
        let market = defaults.market();
        Self {
            lookup: Arc::new(AirportLookup::new(provider.clone())),
            search: Arc::new(
                FlightSearchClient::new(provider.clone(), market.clone())
                    .with_limit(defaults.limit),
            ),
            details: Arc::new(DetailFetchers::new(provider, market)),
        }
    }
}

/// One detail fetcher per consumer (browser tab), so a newer detail request
/// aborts only that consumer's older one.
pub struct DetailFetchers {
    provider: Arc<dyn FlightProvider>,
    market: MarketSettings,
    fetchers: Mutex<HashMap<String, Arc<FlightDetailFetcher>>>,
}

impl DetailFetchers {
    pub fn new(provider: Arc<dyn FlightProvider>, market: MarketSettings) -> Self {
        Self {
            provider,
            market,
            fetchers: Mutex::new(HashMap::new()),
        }
    }

    fn fetchers(&self) -> MutexGuard<'_, HashMap<String, Arc<FlightDetailFetcher>>> {
        self.fetchers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn for_consumer(&self, consumer: &str) -> Arc<FlightDetailFetcher> {
        let mut fetchers = self.fetchers();
        if let Some(fetcher) = fetchers.get(consumer) {
            return fetcher.clone();
        }

        if fetchers.len() >= MAX_IDLE_CONSUMERS {
            fetchers.retain(|_, f| f.is_busy() || Arc::strong_count(f) > 1);
        }

        let fetcher = Arc::new(FlightDetailFetcher::new(
            self.provider.clone(),
            self.market.clone(),
        ));
        fetchers.insert(consumer.to_string(), fetcher.clone());
        fetcher
    }

    /// Abort the consumer's live fetch. Returns whether one was running.
    pub fn cancel(&self, consumer: &str) -> bool {
        let fetcher = self.fetchers().remove(consumer);
        fetcher.is_some_and(|f| f.cancel())
    }

    pub fn len(&self) -> usize {
        self.fetchers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

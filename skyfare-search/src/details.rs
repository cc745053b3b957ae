use skyfare_core::detail::DETAIL_UNAVAILABLE_MESSAGE;
use skyfare_core::{
    DetailFetchRequest, DetailQuery, DetailView, FlightError, FlightProvider, FlightResult,
    MarketSettings,
};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

#[derive(Default)]
struct FetchSlot {
    generation: u64,
    live: Option<AbortHandle>,
}

/// Aborts the provider task if the awaiting `fetch` future is dropped first.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Fetches itinerary detail with at most one live provider request.
///
/// Each provider call runs in its own task. Starting a new fetch aborts the
/// previous task, which drops its HTTP future and closes the connection; the
/// superseded `fetch` then resolves to `FlightError::Cancelled`.
pub struct FlightDetailFetcher {
    provider: Arc<dyn FlightProvider>,
    market: MarketSettings,
    slot: Mutex<FetchSlot>,
}

impl FlightDetailFetcher {
    pub fn new(provider: Arc<dyn FlightProvider>, market: MarketSettings) -> Self {
        Self {
            provider,
            market,
            slot: Mutex::new(FetchSlot::default()),
        }
    }

    fn slot(&self) -> MutexGuard<'_, FetchSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn fetch(&self, request: &DetailFetchRequest) -> FlightResult<DetailView> {
        request.validate()?;
        let query = DetailQuery::new(request, &self.market)?;

        let provider = Arc::clone(&self.provider);

        // spawn, bump and register under one lock so neither a racing fetch nor
        // `cancel()` can observe the task before it is abortable
        let (task, generation) = {
            let mut slot = self.slot();
            let task = tokio::spawn(async move { provider.get_flight_details(&query).await });
            slot.generation += 1;
            if let Some(previous) = slot.live.replace(task.abort_handle()) {
                debug!("Aborting superseded detail fetch");
                previous.abort();
            }
            (task, slot.generation)
        };
        let _guard = AbortOnDrop(task.abort_handle());
        debug!(
            "Fetching details for itinerary {} (generation {})",
            request.itinerary_id, generation
        );

        let joined = task.await;

        let current = {
            let mut slot = self.slot();
            let current = slot.generation == generation;
            if current {
                slot.live = None;
            }
            current
        };

        let envelope = match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => return Err(FlightError::Cancelled),
            Err(e) => {
                warn!("Detail fetch task failed: {}", e);
                return Err(FlightError::Transport(e.to_string()));
            }
        };

        if !current {
            debug!("Discarding detail for superseded itinerary {}", request.itinerary_id);
            return Err(FlightError::Cancelled);
        }

        let view = DetailView::from_envelope(envelope?)?;
        info!(
            "Itinerary {} detail: {} legs, {} pricing options",
            request.itinerary_id,
            view.legs.len(),
            view.pricing_options.len()
        );
        Ok(view)
    }

    /// Abort the live request, if any. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        let mut slot = self.slot();
        slot.generation += 1;
        match slot.live.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.slot().live.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for FlightDetailFetcher {
    fn drop(&mut self) {
        if let Some(handle) = self.slot().live.take() {
            handle.abort();
        }
    }
}

/// What the detail view shows for the selected itinerary.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailPanel {
    #[default]
    Closed,
    Loading,
    Ready(DetailView),
    Failed(String),
}

impl DetailPanel {
    pub fn open(&mut self) {
        *self = DetailPanel::Loading;
    }

    pub fn close(&mut self) {
        *self = DetailPanel::Closed;
    }

    /// Apply a fetch outcome. Superseded fetches leave the panel untouched;
    /// returns whether the panel changed.
    pub fn apply(&mut self, outcome: FlightResult<DetailView>) -> bool {
        match outcome {
            Ok(view) => *self = DetailPanel::Ready(view),
            Err(FlightError::Cancelled) => return false,
            Err(FlightError::Validation(msg)) => *self = DetailPanel::Failed(msg),
            Err(_) => *self = DetailPanel::Failed(DETAIL_UNAVAILABLE_MESSAGE.to_string()),
        }
        true
    }

    pub fn view(&self) -> Option<&DetailView> {
        match self {
            DetailPanel::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DetailPanel::Loading)
    }
}

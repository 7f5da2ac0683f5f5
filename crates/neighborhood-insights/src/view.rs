//! Orchestration between the address field, the property provider and the
//! transformer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::insights::{transform, NeighborhoodInsights};
use crate::providers::{PropertyDataProvider, ProviderError, ProviderKind};

pub const GENERIC_FETCH_ERROR: &str = ProviderKind::Property.fetch_failure_message();

/// What the presentational widgets render.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsState {
    pub insights: Option<NeighborhoodInsights>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fetches and transforms in one step.
pub async fn fetch_insights(
    provider: &dyn PropertyDataProvider,
    address: &str,
) -> Result<NeighborhoodInsights, ProviderError> {
    let raw = provider.fetch_property_insights(address).await?;
    Ok(transform(&raw, address))
}

/// Text for the inline error area. Configuration problems are not the
/// user's to fix, so they get the generic message.
pub fn user_message(error: &ProviderError) -> String {
    match error {
        ProviderError::ConfigMissing { provider } => provider.fetch_failure_message().to_string(),
        other => other.to_string(),
    }
}

#[derive(Clone)]
pub struct InsightsView {
    shared: Arc<ViewShared>,
}

struct ViewShared {
    provider: Arc<dyn PropertyDataProvider>,
    inner: Mutex<ViewInner>,
    states: watch::Sender<InsightsState>,
}

#[derive(Default)]
struct ViewInner {
    draft: String,
    queried: String,
    generation: u64,
    state: InsightsState,
}

impl InsightsView {
    pub fn new(provider: Arc<dyn PropertyDataProvider>) -> Self {
        let (states, _) = watch::channel(InsightsState::default());
        Self {
            shared: Arc::new(ViewShared {
                provider,
                inner: Mutex::new(ViewInner::default()),
                states,
            }),
        }
    }

    pub fn set_draft(&self, value: impl Into<String>) {
        self.shared.lock().draft = value.into();
    }

    pub fn draft(&self) -> String {
        self.shared.lock().draft.clone()
    }

    pub fn queried_address(&self) -> String {
        self.shared.lock().queried.clone()
    }

    pub fn state(&self) -> InsightsState {
        self.shared.lock().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<InsightsState> {
        self.shared.states.subscribe()
    }

    /// Promotes the trimmed draft to the queried address and starts a fetch.
    /// Returns `false`, changing nothing, when the draft is blank or already
    /// the queried address.
    pub fn submit(&self) -> bool {
        let mut inner = self.shared.lock();
        let address = inner.draft.trim().to_string();
        if address.is_empty() || address == inner.queried {
            return false;
        }

        inner.queried = address.clone();
        inner.generation += 1;
        let generation = inner.generation;
        inner.state = InsightsState {
            insights: None,
            is_loading: true,
            error: None,
            updated_at: inner.state.updated_at,
        };
        self.shared.publish(&inner);
        drop(inner);

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let result = fetch_insights(shared.provider.as_ref(), &address).await;
            shared.complete(generation, &address, result);
        });
        true
    }

    pub fn submit_address(&self, address: impl Into<String>) -> bool {
        self.set_draft(address);
        self.submit()
    }

    /// Waits until no fetch is outstanding and returns that state.
    pub async fn settled(&self) -> InsightsState {
        let mut states = self.subscribe();
        let settled = match states.wait_for(|state| !state.is_loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }

    /// Submits every address that arrives on `finalized`, typically the
    /// address input controller's selection channel.
    pub fn follow(&self, mut finalized: mpsc::UnboundedReceiver<String>) -> JoinHandle<()> {
        let view = self.clone();
        tokio::spawn(async move {
            while let Some(address) = finalized.recv().await {
                view.submit_address(address);
            }
        })
    }
}

impl ViewShared {
    fn lock(&self) -> MutexGuard<'_, ViewInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &ViewInner) {
        self.states.send_replace(inner.state.clone());
    }

    fn complete(
        &self,
        generation: u64,
        address: &str,
        result: Result<NeighborhoodInsights, ProviderError>,
    ) {
        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(%address, "discarding insights for superseded address");
            return;
        }

        inner.state = match result {
            Ok(insights) => {
                info!(
                    %address,
                    homes = insights.comparable_homes.len(),
                    schools = insights.schools.len(),
                    "neighborhood insights loaded"
                );
                InsightsState {
                    insights: Some(insights),
                    is_loading: false,
                    error: None,
                    updated_at: Some(Utc::now()),
                }
            }
            Err(error) => InsightsState {
                insights: None,
                is_loading: false,
                error: Some(user_message(&error)),
                updated_at: inner.state.updated_at,
            },
        };
        self.publish(&inner);
    }
}

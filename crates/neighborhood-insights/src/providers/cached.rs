use std::time::Duration;

use async_trait::async_trait;

use super::{AddressSuggestion, PropertyDataProvider, ProviderError, SuggestionProvider};
use crate::cache::{QueryCache, QueryKey};
use crate::config::QueryConfig;
use crate::insights::RawPropertyPayload;

pub const SUGGESTIONS_ENDPOINT: &str = "suggestions";
pub const PROPERTY_INSIGHTS_ENDPOINT: &str = "property-insights";

/// Serves repeated autocomplete inputs from the request cache.
#[derive(Debug)]
pub struct CachedSuggestionProvider<P> {
    inner: P,
    cache: QueryCache<Vec<AddressSuggestion>>,
}

impl<P: SuggestionProvider> CachedSuggestionProvider<P> {
    pub fn new(inner: P, stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            inner,
            cache: QueryCache::new(stale_time, gc_time),
        }
    }

    pub fn from_config(inner: P, config: &QueryConfig) -> Self {
        Self::new(inner, config.suggestion_stale_time, config.cache_gc_time)
    }

    pub fn cache(&self) -> &QueryCache<Vec<AddressSuggestion>> {
        &self.cache
    }
}

#[async_trait]
impl<P: SuggestionProvider> SuggestionProvider for CachedSuggestionProvider<P> {
    async fn fetch_suggestions(
        &self,
        partial_input: &str,
    ) -> Result<Vec<AddressSuggestion>, ProviderError> {
        let key = QueryKey::new(SUGGESTIONS_ENDPOINT, partial_input);
        self.cache
            .query(key, || self.inner.fetch_suggestions(partial_input))
            .await
    }
}

/// Serves repeated property lookups from the request cache.
#[derive(Debug)]
pub struct CachedPropertyProvider<P> {
    inner: P,
    cache: QueryCache<RawPropertyPayload>,
}

impl<P: PropertyDataProvider> CachedPropertyProvider<P> {
    pub fn new(inner: P, stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            inner,
            cache: QueryCache::new(stale_time, gc_time),
        }
    }

    pub fn from_config(inner: P, config: &QueryConfig) -> Self {
        Self::new(inner, config.insights_stale_time, config.cache_gc_time)
    }

    pub fn cache(&self) -> &QueryCache<RawPropertyPayload> {
        &self.cache
    }
}

#[async_trait]
impl<P: PropertyDataProvider> PropertyDataProvider for CachedPropertyProvider<P> {
    async fn fetch_property_insights(
        &self,
        full_address: &str,
    ) -> Result<RawPropertyPayload, ProviderError> {
        let key = QueryKey::new(PROPERTY_INSIGHTS_ENDPOINT, full_address);
        self.cache
            .query(key, || self.inner.fetch_property_insights(full_address))
            .await
    }
}

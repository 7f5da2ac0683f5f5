//! Remote data providers: places autocomplete and property lookup.
//!
//! Each provider is a trait so the controller, the view and the router can be
//! driven by scripted fakes; the HTTP implementations live in [`places`] and
//! [`property`], and [`cached`] layers the request cache on top of either.

pub mod cached;
pub mod places;
pub mod property;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::insights::RawPropertyPayload;

pub use cached::{CachedPropertyProvider, CachedSuggestionProvider};
pub use places::GooglePlacesClient;
pub use property::RapidApiPropertyClient;

/// One ranked autocomplete candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    pub description: String,
    pub id: String,
}

impl AddressSuggestion {
    pub fn new(description: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Places,
    Property,
}

impl ProviderKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Places => "places provider",
            Self::Property => "property data provider",
        }
    }

    /// User-facing text when the failure is not the user's to fix.
    pub const fn fetch_failure_message(self) -> &'static str {
        match self {
            Self::Places => "Failed to fetch autocomplete suggestions",
            Self::Property => "Failed to fetch neighborhood data",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider} is not configured")]
    ConfigMissing { provider: ProviderKind },
    #[error("{provider} error: {status_code}")]
    RemoteFailure {
        provider: ProviderKind,
        status_code: u16,
    },
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: ProviderKind,
        message: String,
    },
}

impl ProviderError {
    pub fn provider(&self) -> ProviderKind {
        match self {
            Self::ConfigMissing { provider }
            | Self::RemoteFailure { provider, .. }
            | Self::Transport { provider, .. } => *provider,
        }
    }

    /// Upstream status, present only for [`ProviderError::RemoteFailure`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RemoteFailure { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    pub(crate) fn transport(provider: ProviderKind, err: impl fmt::Display) -> Self {
        Self::Transport {
            provider,
            message: err.to_string(),
        }
    }
}

#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Issues exactly one upstream request. Minimum-length filtering is the
    /// caller's job.
    async fn fetch_suggestions(
        &self,
        partial_input: &str,
    ) -> Result<Vec<AddressSuggestion>, ProviderError>;
}

#[async_trait]
pub trait PropertyDataProvider: Send + Sync {
    /// `full_address` must be non-empty after trimming.
    async fn fetch_property_insights(
        &self,
        full_address: &str,
    ) -> Result<RawPropertyPayload, ProviderError>;
}

#[async_trait]
impl<T> SuggestionProvider for Arc<T>
where
    T: SuggestionProvider + ?Sized,
{
    async fn fetch_suggestions(
        &self,
        partial_input: &str,
    ) -> Result<Vec<AddressSuggestion>, ProviderError> {
        (**self).fetch_suggestions(partial_input).await
    }
}

#[async_trait]
impl<T> PropertyDataProvider for Arc<T>
where
    T: PropertyDataProvider + ?Sized,
{
    async fn fetch_property_insights(
        &self,
        full_address: &str,
    ) -> Result<RawPropertyPayload, ProviderError> {
        (**self).fetch_property_insights(full_address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_provider() {
        let missing = ProviderError::ConfigMissing {
            provider: ProviderKind::Places,
        };
        assert_eq!(missing.to_string(), "places provider is not configured");

        let remote = ProviderError::RemoteFailure {
            provider: ProviderKind::Property,
            status_code: 429,
        };
        assert_eq!(remote.to_string(), "property data provider error: 429");
        assert_eq!(remote.status_code(), Some(429));
        assert_eq!(remote.provider(), ProviderKind::Property);
        assert_eq!(missing.status_code(), None);
    }

    #[test]
    fn fetch_failure_message_names_what_failed() {
        assert_eq!(
            ProviderKind::Places.fetch_failure_message(),
            "Failed to fetch autocomplete suggestions"
        );
        assert_eq!(
            ProviderKind::Property.fetch_failure_message(),
            "Failed to fetch neighborhood data"
        );
    }
}

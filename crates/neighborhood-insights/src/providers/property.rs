use async_trait::async_trait;
use tracing::warn;

use super::{PropertyDataProvider, ProviderError, ProviderKind};
use crate::config::ProviderConfig;
use crate::insights::RawPropertyPayload;

const API_KEY_HEADER: &str = "x-rapidapi-key";

/// Property lookup over HTTP. Base URL and key are both required per call.
#[derive(Debug, Clone)]
pub struct RapidApiPropertyClient {
    http: reqwest::Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl RapidApiPropertyClient {
    pub fn new(http: reqwest::Client, base_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ProviderError::transport(ProviderKind::Property, err))?;
        Ok(Self::new(
            http,
            config.property_base_url.clone(),
            config.property_api_key.clone(),
        ))
    }

    fn credentials(&self) -> Result<(String, &str), ProviderError> {
        match (self.base_url.as_deref(), self.api_key.as_deref()) {
            (Some(base), Some(key)) => Ok((property_url(base), key)),
            _ => Err(ProviderError::ConfigMissing {
                provider: ProviderKind::Property,
            }),
        }
    }
}

fn property_url(base: &str) -> String {
    format!("{}/property", base.trim_end_matches('/'))
}

#[async_trait]
impl PropertyDataProvider for RapidApiPropertyClient {
    async fn fetch_property_insights(
        &self,
        full_address: &str,
    ) -> Result<RawPropertyPayload, ProviderError> {
        let (url, api_key) = self.credentials()?;

        let response = self
            .http
            .get(url)
            .query(&[("address", full_address)])
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|err| ProviderError::transport(ProviderKind::Property, err))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "property lookup request failed");
            return Err(ProviderError::RemoteFailure {
                provider: ProviderKind::Property,
                status_code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| ProviderError::transport(ProviderKind::Property, err))?;

        match RawPropertyPayload::from_slice(&body) {
            Ok(payload) => Ok(payload),
            Err(err) => {
                warn!(error = %err, "property lookup body was not valid JSON; treating every field as absent");
                Ok(RawPropertyPayload::default())
            }
        }
    }
}

use crate::config::ConfigError;
use crate::providers::ProviderError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Validation(String),
    Provider(ProviderError),
    /// A lookup that failed after the provider error was already rendered
    /// for the user.
    Lookup(String),
    Export(csv::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Provider(ProviderError::RemoteFailure { status_code, .. }) => {
                StatusCode::from_u16(*status_code).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Provider(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Lookup(_)
            | AppError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Validation(message) => message.clone(),
            AppError::Provider(
                err @ (ProviderError::ConfigMissing { .. } | ProviderError::Transport { .. }),
            ) => err.provider().fetch_failure_message().to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Validation(message) => write!(f, "{}", message),
            AppError::Provider(err) => write!(f, "{}", err),
            AppError::Lookup(message) => write!(f, "lookup failed: {}", message),
            AppError::Export(err) => write!(f, "export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Validation(_) | AppError::Lookup(_) => None,
            AppError::Provider(err) => Some(err),
            AppError::Export(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ProviderError> for AppError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Export(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderKind;

    #[test]
    fn provider_errors_map_to_http_statuses() {
        let validation = AppError::Validation("Input parameter is required".to_string());
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let missing = AppError::from(ProviderError::ConfigMissing {
            provider: ProviderKind::Places,
        });
        assert_eq!(missing.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            missing.public_message(),
            "Failed to fetch autocomplete suggestions"
        );

        let upstream = AppError::from(ProviderError::RemoteFailure {
            provider: ProviderKind::Property,
            status_code: 404,
        });
        assert_eq!(upstream.status(), StatusCode::NOT_FOUND);

        let transport = AppError::from(ProviderError::Transport {
            provider: ProviderKind::Property,
            message: "connection refused".to_string(),
        });
        assert_eq!(transport.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            transport.public_message(),
            "Failed to fetch neighborhood data"
        );
    }
}

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Crates whose chatter is capped at `warn` unless `RUST_LOG` says otherwise.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "reqwest", "rustls"];

#[derive(Debug)]
pub enum TelemetryError {
    EnvFilter { value: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::EnvFilter { value, .. } => {
                write!(
                    f,
                    "invalid log level/filter '{}': unable to build EnvFilter",
                    value
                )
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::EnvFilter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Builds the filter directive used when `RUST_LOG` is absent.
pub fn fallback_directive(log_level: &str) -> String {
    let mut directive = log_level.trim().to_string();
    if directive.is_empty() {
        directive.push_str("info");
    }
    for dependency in QUIET_DEPENDENCIES {
        if !directive.contains(dependency) {
            directive.push_str(&format!(",{dependency}=warn"));
        }
    }
    directive
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = fallback_directive(&config.log_level);
            EnvFilter::try_new(&directive).map_err(|source| TelemetryError::EnvFilter {
                value: config.log_level.clone(),
                source,
            })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_directive_quiets_http_stack() {
        assert_eq!(
            fallback_directive("debug"),
            "debug,hyper=warn,reqwest=warn,rustls=warn"
        );
    }

    #[test]
    fn fallback_directive_respects_explicit_dependency_levels() {
        let directive = fallback_directive("info,reqwest=trace");
        assert!(directive.contains("reqwest=trace"));
        assert!(!directive.contains("reqwest=warn"));
        assert!(fallback_directive("  ").starts_with("info,"));
    }

    #[test]
    fn fallback_directive_parses_as_env_filter() {
        let directive = fallback_directive("neighborhood_insights=debug");
        assert!(EnvFilter::try_new(directive).is_ok());
    }
}

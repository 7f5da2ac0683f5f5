pub mod api;
pub mod autocomplete;
pub mod cache;
pub mod config;
pub mod error;
pub mod insights;
pub mod providers;
pub mod telemetry;
pub mod view;

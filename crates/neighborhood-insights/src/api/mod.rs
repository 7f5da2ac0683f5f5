//! HTTP surface over the two providers.

mod router;

pub use router::{
    insights_router, InsightsServices, SuggestionsResponse, INPUT_REQUIRED, STATUS_OK,
    STATUS_ZERO_RESULTS,
};

//! Address input: debounced suggestion fetching with last-writer-wins results.

mod controller;
pub mod machine;

pub use controller::AddressInputController;
pub use machine::{
    FetchRequest, Key, KeyOutcome, SuggestionMachine, SuggestionPhase, SuggestionSnapshot, Ticket,
};

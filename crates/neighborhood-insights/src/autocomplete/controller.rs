use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use super::machine::{Key, KeyOutcome, SuggestionMachine, SuggestionSnapshot, Ticket};
use crate::config::QueryConfig;
use crate::providers::{AddressSuggestion, SuggestionProvider};

/// Drives a [`SuggestionMachine`] on the tokio runtime: owns the single
/// debounce timer, spawns suggestion fetches and publishes snapshots.
///
/// Dropping the controller tears it down; no timer callback or late fetch
/// result is applied afterwards.
pub struct AddressInputController {
    shared: Arc<Shared>,
}

struct Shared {
    provider: Arc<dyn SuggestionProvider>,
    debounce: Duration,
    state: Mutex<ControllerState>,
    snapshots: watch::Sender<SuggestionSnapshot>,
    finalize: Option<mpsc::UnboundedSender<String>>,
}

struct ControllerState {
    machine: SuggestionMachine,
    timer: Option<JoinHandle<()>>,
}

impl AddressInputController {
    pub fn new(
        provider: Arc<dyn SuggestionProvider>,
        debounce: Duration,
        min_chars: usize,
    ) -> Self {
        Self::build(provider, debounce, min_chars, None)
    }

    pub fn from_config(provider: Arc<dyn SuggestionProvider>, config: &QueryConfig) -> Self {
        Self::new(provider, config.debounce, config.min_suggestion_chars)
    }

    /// Like [`AddressInputController::new`], additionally sending every
    /// selected address on `finalize`.
    pub fn with_finalize(
        provider: Arc<dyn SuggestionProvider>,
        debounce: Duration,
        min_chars: usize,
        finalize: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self::build(provider, debounce, min_chars, Some(finalize))
    }

    fn build(
        provider: Arc<dyn SuggestionProvider>,
        debounce: Duration,
        min_chars: usize,
        finalize: Option<mpsc::UnboundedSender<String>>,
    ) -> Self {
        let machine = SuggestionMachine::new(min_chars);
        let (snapshots, _) = watch::channel(machine.snapshot());
        Self {
            shared: Arc::new(Shared {
                provider,
                debounce,
                state: Mutex::new(ControllerState {
                    machine,
                    timer: None,
                }),
                snapshots,
                finalize,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionSnapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> SuggestionSnapshot {
        self.shared.lock().machine.snapshot()
    }

    /// Number of armed debounce timers; never more than one.
    pub fn pending_timers(&self) -> usize {
        let state = self.shared.lock();
        usize::from(
            state
                .timer
                .as_ref()
                .is_some_and(|handle| !handle.is_finished()),
        )
    }

    /// Records a keystroke and re-arms the debounce timer.
    pub fn input_changed(&self, value: impl Into<String>) {
        let mut state = self.shared.lock();
        cancel_timer(&mut state);
        if let Some(ticket) = state.machine.keystroke(value) {
            let shared = Arc::clone(&self.shared);
            state.timer = Some(tokio::spawn(async move {
                tokio::time::sleep(shared.debounce).await;
                Shared::debounce_elapsed(&shared, ticket);
            }));
        }
        self.shared.publish(&state);
    }

    /// Commits `suggestion` and notifies the finalize channel, if any.
    pub fn select_suggestion(&self, suggestion: &AddressSuggestion) -> Option<String> {
        let mut state = self.shared.lock();
        cancel_timer(&mut state);
        let selected = state.machine.select(suggestion);
        self.shared.publish(&state);
        drop(state);

        if let Some(value) = &selected {
            self.shared.notify_finalized(value);
        }
        selected
    }

    pub fn dismiss(&self) {
        let mut state = self.shared.lock();
        cancel_timer(&mut state);
        state.machine.dismiss();
        self.shared.publish(&state);
    }

    pub fn focus(&self) {
        let mut state = self.shared.lock();
        if state.machine.focus() {
            self.shared.publish(&state);
        }
    }

    pub fn handle_key(&self, key: Key) -> KeyOutcome {
        let mut state = self.shared.lock();
        let outcome = state.machine.key(key);
        if matches!(outcome, KeyOutcome::Selected(_) | KeyOutcome::Dismissed) {
            cancel_timer(&mut state);
        }
        self.shared.publish(&state);
        drop(state);

        if let KeyOutcome::Selected(value) = &outcome {
            self.shared.notify_finalized(value);
        }
        outcome
    }

    /// Cancels the armed timer and invalidates in-flight fetches.
    pub fn teardown(&self) {
        let mut state = self.shared.lock();
        cancel_timer(&mut state);
        state.machine.teardown();
        self.shared.publish(&state);
    }
}

impl Drop for AddressInputController {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ControllerState) {
        self.snapshots.send_replace(state.machine.snapshot());
    }

    fn notify_finalized(&self, value: &str) {
        if let Some(finalize) = &self.finalize {
            if finalize.send(value.to_string()).is_err() {
                debug!("finalize receiver dropped; address selection not forwarded");
            }
        }
    }

    fn debounce_elapsed(shared: &Arc<Self>, ticket: Ticket) {
        let mut state = shared.lock();
        if !state.machine.is_current(ticket) {
            return;
        }
        state.timer = None;

        let request = state.machine.debounce_elapsed(ticket);
        shared.publish(&state);
        drop(state);

        if let Some(request) = request {
            let shared = Arc::clone(shared);
            tokio::spawn(async move {
                let result = shared.provider.fetch_suggestions(&request.input).await;
                let mut state = shared.lock();
                if state.machine.resolve(request.ticket, result) {
                    shared.publish(&state);
                } else {
                    debug!(input = %request.input, "discarding suggestions for superseded input");
                }
            });
        }
    }
}

fn cancel_timer(state: &mut ControllerState) {
    if let Some(handle) = state.timer.take() {
        handle.abort();
    }
}


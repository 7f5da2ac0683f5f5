use serde::Serialize;

use crate::providers::{AddressSuggestion, ProviderError};

/// Observable state of the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPhase {
    /// Nothing shown.
    Idle,
    /// Debounce armed or a request in flight.
    Pending,
    /// Suggestions visible.
    Open,
}

/// Identifies the input a debounce timer or fetch was started for. Only the
/// ticket matching the current generation may change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub input: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    FocusedFirst,
    Selected(String),
    Dismissed,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionSnapshot {
    pub phase: SuggestionPhase,
    pub input: String,
    pub suggestions: Vec<AddressSuggestion>,
    pub focused: Option<usize>,
}

impl SuggestionSnapshot {
    /// Suggestions a widget should render right now.
    pub fn visible(&self) -> &[AddressSuggestion] {
        match self.phase {
            SuggestionPhase::Open => &self.suggestions,
            _ => &[],
        }
    }
}

/// Synchronous core of the address input: every event moves the machine and
/// reports what the driver has to do next. Timers and I/O live outside.
#[derive(Debug, Clone)]
pub struct SuggestionMachine {
    min_chars: usize,
    generation: u64,
    phase: SuggestionPhase,
    input: String,
    suggestions: Vec<AddressSuggestion>,
    focused: Option<usize>,
    torn_down: bool,
}

impl SuggestionMachine {
    pub fn new(min_chars: usize) -> Self {
        Self {
            min_chars,
            generation: 0,
            phase: SuggestionPhase::Idle,
            input: String::new(),
            suggestions: Vec::new(),
            focused: None,
            torn_down: false,
        }
    }

    pub fn phase(&self) -> SuggestionPhase {
        self.phase
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        !self.torn_down && ticket.0 == self.generation
    }

    pub fn snapshot(&self) -> SuggestionSnapshot {
        SuggestionSnapshot {
            phase: self.phase,
            input: self.input.clone(),
            suggestions: self.suggestions.clone(),
            focused: self.focused,
        }
    }

    /// Records a new input value and returns the ticket for the debounce
    /// timer that replaces any previously armed one.
    pub fn keystroke(&mut self, value: impl Into<String>) -> Option<Ticket> {
        if self.torn_down {
            return None;
        }
        self.input = value.into();
        self.phase = SuggestionPhase::Pending;
        self.suggestions.clear();
        self.focused = None;
        Some(self.advance())
    }

    /// The quiet period for `ticket` has passed. Returns the request to issue,
    /// or `None` when the ticket is stale or the input is too short.
    pub fn debounce_elapsed(&mut self, ticket: Ticket) -> Option<FetchRequest> {
        if !self.is_current(ticket) {
            return None;
        }
        if self.input.trim().chars().count() < self.min_chars {
            self.clear();
            return None;
        }
        Some(FetchRequest {
            ticket,
            input: self.input.clone(),
        })
    }

    /// Applies a provider result. Returns `false` when the result belongs to
    /// a superseded input and was discarded.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<AddressSuggestion>, ProviderError>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        match result {
            Ok(suggestions) if !suggestions.is_empty() => {
                self.suggestions = suggestions;
                self.focused = None;
                self.phase = SuggestionPhase::Open;
            }
            _ => self.clear(),
        }
        true
    }

    /// Commits `suggestion` as the input value and closes the list.
    pub fn select(&mut self, suggestion: &AddressSuggestion) -> Option<String> {
        if self.torn_down {
            return None;
        }
        self.input = suggestion.description.clone();
        self.clear();
        self.advance();
        Some(self.input.clone())
    }

    /// Hides the list without touching the input. Pending work is abandoned.
    pub fn dismiss(&mut self) {
        if self.torn_down {
            return;
        }
        self.phase = SuggestionPhase::Idle;
        self.focused = None;
        self.advance();
    }

    /// Re-opens a retained list when the field regains focus.
    pub fn focus(&mut self) -> bool {
        if self.torn_down || self.phase != SuggestionPhase::Idle || self.suggestions.is_empty() {
            return false;
        }
        self.phase = SuggestionPhase::Open;
        true
    }

    pub fn key(&mut self, key: Key) -> KeyOutcome {
        if self.torn_down {
            return KeyOutcome::Ignored;
        }
        let open = self.phase == SuggestionPhase::Open && !self.suggestions.is_empty();
        match key {
            Key::ArrowDown if open => {
                self.focused = Some(0);
                KeyOutcome::FocusedFirst
            }
            Key::Enter if open => {
                let first = self.suggestions[0].clone();
                match self.select(&first) {
                    Some(value) => KeyOutcome::Selected(value),
                    None => KeyOutcome::Ignored,
                }
            }
            Key::Escape => {
                self.dismiss();
                KeyOutcome::Dismissed
            }
            _ => KeyOutcome::Ignored,
        }
    }

    /// After teardown every ticket is stale and every event is ignored.
    pub fn teardown(&mut self) {
        self.advance();
        self.torn_down = true;
        self.phase = SuggestionPhase::Idle;
        self.focused = None;
    }

    fn clear(&mut self) {
        self.suggestions.clear();
        self.focused = None;
        self.phase = SuggestionPhase::Idle;
    }

    fn advance(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderKind;

    fn suggestions() -> Vec<AddressSuggestion> {
        vec![
            AddressSuggestion::new("16105 SE 113th Pl, Renton, WA, USA", "a"),
            AddressSuggestion::new("16105 SE 113th St, Renton, WA, USA", "b"),
        ]
    }

    fn open_machine() -> SuggestionMachine {
        let mut machine = SuggestionMachine::new(3);
        let ticket = machine.keystroke("16105").expect("ticket");
        let request = machine.debounce_elapsed(ticket).expect("request");
        assert!(machine.resolve(request.ticket, Ok(suggestions())));
        machine
    }

    #[test]
    fn keystroke_moves_to_pending() {
        let mut machine = SuggestionMachine::new(3);
        machine.keystroke("1");
        assert_eq!(machine.phase(), SuggestionPhase::Pending);
        assert_eq!(machine.input(), "1");
    }

    #[test]
    fn short_input_returns_to_idle_without_request() {
        let mut machine = SuggestionMachine::new(3);
        let ticket = machine.keystroke("  ab  ").expect("ticket");
        assert_eq!(machine.debounce_elapsed(ticket), None);
        assert_eq!(machine.phase(), SuggestionPhase::Idle);
    }

    #[test]
    fn superseded_timer_ticket_issues_nothing() {
        let mut machine = SuggestionMachine::new(3);
        let first = machine.keystroke("161").expect("ticket");
        let second = machine.keystroke("1610").expect("ticket");
        assert_eq!(machine.debounce_elapsed(first), None);
        assert_eq!(
            machine.debounce_elapsed(second),
            Some(FetchRequest {
                ticket: second,
                input: "1610".to_string()
            })
        );
    }

    #[test]
    fn results_open_or_close_the_list() {
        let machine = open_machine();
        assert_eq!(machine.phase(), SuggestionPhase::Open);
        assert_eq!(machine.snapshot().visible().len(), 2);

        let mut machine = SuggestionMachine::new(3);
        let ticket = machine.keystroke("zzzz").expect("ticket");
        machine.debounce_elapsed(ticket).expect("request");
        assert!(machine.resolve(ticket, Ok(Vec::new())));
        assert_eq!(machine.phase(), SuggestionPhase::Idle);

        let ticket = machine.keystroke("zzzzz").expect("ticket");
        machine.debounce_elapsed(ticket).expect("request");
        let failure = Err(ProviderError::RemoteFailure {
            provider: ProviderKind::Places,
            status_code: 500,
        });
        assert!(machine.resolve(ticket, failure));
        assert_eq!(machine.phase(), SuggestionPhase::Idle);
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut machine = SuggestionMachine::new(3);
        let a = machine.keystroke("161").expect("ticket");
        machine.debounce_elapsed(a).expect("request a");
        let b = machine.keystroke("1610").expect("ticket");
        machine.debounce_elapsed(b).expect("request b");

        assert!(machine.resolve(b, Ok(suggestions()[..1].to_vec())));
        assert!(!machine.resolve(a, Ok(suggestions())));
        assert_eq!(machine.snapshot().suggestions.len(), 1);
    }

    #[test]
    fn select_commits_description_and_invalidates_pending_work() {
        let mut machine = open_machine();
        let stale = machine.keystroke("16105 SE").expect("ticket");
        let choice = suggestions()[1].clone();
        assert_eq!(machine.select(&choice), Some(choice.description.clone()));
        assert_eq!(machine.input(), choice.description);
        assert_eq!(machine.phase(), SuggestionPhase::Idle);
        assert!(!machine.resolve(stale, Ok(suggestions())));
        assert!(machine.snapshot().suggestions.is_empty());
    }

    #[test]
    fn dismiss_keeps_input_and_focus_reopens() {
        let mut machine = open_machine();
        machine.dismiss();
        assert_eq!(machine.phase(), SuggestionPhase::Idle);
        assert_eq!(machine.input(), "16105");
        assert!(machine.snapshot().visible().is_empty());
        assert!(machine.focus());
        assert_eq!(machine.phase(), SuggestionPhase::Open);
    }

    #[test]
    fn focus_does_not_reopen_suggestions_for_older_input() {
        let mut machine = open_machine();
        machine.keystroke("16105 X").expect("ticket");
        machine.dismiss();
        assert!(!machine.focus());
        assert_eq!(machine.phase(), SuggestionPhase::Idle);
        assert_eq!(machine.input(), "16105 X");
        assert!(machine.snapshot().suggestions.is_empty());
    }

    #[test]
    fn keys_follow_the_open_list() {
        let mut machine = open_machine();
        assert_eq!(machine.key(Key::ArrowDown), KeyOutcome::FocusedFirst);
        assert_eq!(machine.snapshot().focused, Some(0));
        assert_eq!(
            machine.key(Key::Enter),
            KeyOutcome::Selected("16105 SE 113th Pl, Renton, WA, USA".to_string())
        );
        assert_eq!(machine.key(Key::Enter), KeyOutcome::Ignored);
        assert_eq!(machine.key(Key::ArrowDown), KeyOutcome::Ignored);

        let mut machine = open_machine();
        assert_eq!(machine.key(Key::Escape), KeyOutcome::Dismissed);
        assert_eq!(machine.input(), "16105");
    }

    #[test]
    fn teardown_ignores_everything_afterwards() {
        let mut machine = SuggestionMachine::new(3);
        let ticket = machine.keystroke("16105").expect("ticket");
        machine.teardown();
        assert_eq!(machine.debounce_elapsed(ticket), None);
        assert!(!machine.resolve(ticket, Ok(suggestions())));
        assert_eq!(machine.keystroke("more"), None);
        assert_eq!(machine.phase(), SuggestionPhase::Idle);
    }
}

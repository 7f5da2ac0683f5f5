use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use neighborhood_insights::autocomplete::{AddressInputController, Key, KeyOutcome, SuggestionPhase};
use neighborhood_insights::config::QueryConfig;
use neighborhood_insights::insights::RawPropertyPayload;
use neighborhood_insights::providers::{
    AddressSuggestion, PropertyDataProvider, ProviderError, SuggestionProvider,
};
use neighborhood_insights::view::InsightsView;
use tokio::sync::mpsc;
use tokio::time::sleep;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Records every request and answers with two suggestions derived from the
/// input. Inputs listed in `slow` take half a second to answer.
#[derive(Default)]
struct RecordingPlaces {
    calls: Mutex<Vec<String>>,
    slow: Vec<&'static str>,
}

impl RecordingPlaces {
    fn with_slow(slow: Vec<&'static str>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            slow,
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SuggestionProvider for RecordingPlaces {
    async fn fetch_suggestions(
        &self,
        partial_input: &str,
    ) -> Result<Vec<AddressSuggestion>, ProviderError> {
        self.calls.lock().unwrap().push(partial_input.to_string());
        if self.slow.contains(&partial_input) {
            sleep(Duration::from_millis(500)).await;
        } else {
            sleep(Duration::from_millis(10)).await;
        }
        Ok(vec![
            AddressSuggestion::new(format!("{partial_input} SE 113th Pl, Renton, WA"), "first"),
            AddressSuggestion::new(format!("{partial_input} SE 113th St, Renton, WA"), "second"),
        ])
    }
}

struct EchoProperty;

#[async_trait]
impl PropertyDataProvider for EchoProperty {
    async fn fetch_property_insights(
        &self,
        _full_address: &str,
    ) -> Result<RawPropertyPayload, ProviderError> {
        Ok(RawPropertyPayload {
            latitude: Some(47.48),
            longitude: Some(-122.12),
            ..RawPropertyPayload::default()
        })
    }
}

fn controller(places: &Arc<RecordingPlaces>) -> AddressInputController {
    AddressInputController::new(places.clone(), DEBOUNCE, 3)
}

#[tokio::test(start_paused = true)]
async fn short_input_never_reaches_the_provider() {
    let places = Arc::new(RecordingPlaces::default());
    let input = controller(&places);

    input.input_changed("16");
    assert_eq!(input.snapshot().phase, SuggestionPhase::Pending);
    sleep(Duration::from_secs(1)).await;

    assert!(places.calls().is_empty());
    assert_eq!(input.snapshot().phase, SuggestionPhase::Idle);
    assert!(input.snapshot().visible().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_issues_one_request_for_the_final_value() {
    let places = Arc::new(RecordingPlaces::default());
    let input = controller(&places);

    for value in ["161", "1610", "16105"] {
        input.input_changed(value);
        assert_eq!(input.pending_timers(), 1);
        sleep(Duration::from_millis(100)).await;
    }
    sleep(Duration::from_secs(1)).await;

    assert_eq!(places.calls(), vec!["16105".to_string()]);
    let snapshot = input.snapshot();
    assert_eq!(snapshot.phase, SuggestionPhase::Open);
    assert_eq!(snapshot.visible().len(), 2);
    assert_eq!(input.pending_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn late_result_for_older_input_is_discarded() {
    let places = Arc::new(RecordingPlaces::with_slow(vec!["161"]));
    let input = controller(&places);

    input.input_changed("161");
    sleep(Duration::from_millis(350)).await;
    input.input_changed("16105");
    sleep(Duration::from_secs(2)).await;

    assert_eq!(places.calls(), vec!["161".to_string(), "16105".to_string()]);
    let snapshot = input.snapshot();
    assert_eq!(snapshot.input, "16105");
    assert_eq!(snapshot.phase, SuggestionPhase::Open);
    assert!(snapshot
        .visible()
        .iter()
        .all(|suggestion| suggestion.description.starts_with("16105 ")));
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_timer_and_ignores_in_flight_results() {
    let places = Arc::new(RecordingPlaces::default());
    let input = controller(&places);
    input.input_changed("16105");
    sleep(Duration::from_millis(100)).await;
    input.teardown();
    sleep(Duration::from_secs(1)).await;
    assert!(places.calls().is_empty());
    assert_eq!(input.pending_timers(), 0);

    let places = Arc::new(RecordingPlaces::with_slow(vec!["16105"]));
    let input = controller(&places);
    let mut snapshots = input.subscribe();
    input.input_changed("16105");
    sleep(Duration::from_millis(350)).await;
    assert_eq!(places.calls().len(), 1);
    drop(input);
    snapshots.borrow_and_update();

    sleep(Duration::from_secs(1)).await;
    assert!(!snapshots.has_changed().unwrap_or(false));
    assert_eq!(snapshots.borrow().phase, SuggestionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn keyboard_and_focus_follow_the_open_list() {
    let places = Arc::new(RecordingPlaces::default());
    let input = controller(&places);
    let mut snapshots = input.subscribe();

    input.input_changed("16105");
    snapshots
        .wait_for(|snapshot| snapshot.phase == SuggestionPhase::Open)
        .await
        .expect("list opens");

    assert_eq!(input.handle_key(Key::ArrowDown), KeyOutcome::FocusedFirst);
    assert_eq!(input.snapshot().focused, Some(0));

    assert_eq!(input.handle_key(Key::Escape), KeyOutcome::Dismissed);
    assert_eq!(input.snapshot().input, "16105");
    assert!(input.snapshot().visible().is_empty());

    input.focus();
    assert_eq!(input.snapshot().visible().len(), 2);

    let choice = input.snapshot().suggestions[1].clone();
    assert_eq!(
        input.select_suggestion(&choice),
        Some(choice.description.clone())
    );
    let snapshot = input.snapshot();
    assert_eq!(snapshot.input, choice.description);
    assert_eq!(snapshot.phase, SuggestionPhase::Idle);
    assert!(snapshot.suggestions.is_empty());
}

#[tokio::test(start_paused = true)]
async fn selection_drives_the_insights_view() {
    let places = Arc::new(RecordingPlaces::default());
    let (finalize, finalized) = mpsc::unbounded_channel();
    let config = QueryConfig::default();
    let input = AddressInputController::with_finalize(
        places.clone(),
        config.debounce,
        config.min_suggestion_chars,
        finalize,
    );
    let view = InsightsView::new(Arc::new(EchoProperty));
    let follower = view.follow(finalized);

    input.input_changed("16105");
    sleep(Duration::from_secs(1)).await;

    let outcome = input.handle_key(Key::Enter);
    assert_eq!(
        outcome,
        KeyOutcome::Selected("16105 SE 113th Pl, Renton, WA".to_string())
    );
    sleep(Duration::from_millis(10)).await;

    let state = view.settled().await;
    assert_eq!(view.queried_address(), "16105 SE 113th Pl, Renton, WA");
    let insights = state.insights.expect("insights loaded");
    assert_eq!(insights.coordinates.lat, 47.48);
    assert_eq!(places.calls().len(), 1);

    drop(input);
    follower.await.expect("follower exits once the controller is gone");
}

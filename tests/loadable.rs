use std::sync::{Arc, Mutex};

use reducer_kit::{
    loadable_state, observable,
    observation::ObservationEvent,
    state::{AlertButton, AlertState, LoadingState, PresentationState},
};

#[derive(Clone, Debug, PartialEq)]
pub enum AlertAction {
    Retry,
}

#[loadable_state(alert = AlertAction)]
#[observable]
#[derive(Debug)]
pub struct FeedState {
    pub items: Vec<String>,
}

#[loadable_state]
#[observable]
struct DetailState {
    id: u64,
}

fn failed_alert() -> AlertState<AlertAction> {
    AlertState::new("Loading failed")
        .with_message("Check your connection")
        .with_button(AlertButton::new("Retry", Some(AlertAction::Retry)))
        .with_button(AlertButton::cancel("Cancel"))
}

#[test]
fn starts_idle() {
    let feed = FeedState::new(Vec::new());

    assert_eq!(*feed.loading_state(), LoadingState::None);
    assert!(feed.error_alert().is_none());
    assert!(!feed.error_alert_presentation().is_presented());
    assert!(feed.items().is_empty());
}

#[test]
fn loading_state_is_tracked() {
    let mut feed = FeedState::new(Vec::new());
    let events = Arc::new(Mutex::new(Vec::new()));
    feed.observation_registrar().observe({
        let events = Arc::clone(&events);
        move |event| events.lock().unwrap().push(event)
    });

    feed.set_loading_state(LoadingState::Loading);
    feed.set_loading_state(LoadingState::Failed("offline".to_string()));

    assert_eq!(
        events.lock().unwrap().first(),
        Some(&ObservationEvent::WillSet("loading_state"))
    );
    assert_eq!(events.lock().unwrap().len(), 4);

    assert_eq!(feed.loading_state().error(), Some("offline"));
    assert_eq!(
        events.lock().unwrap().last(),
        Some(&ObservationEvent::Access("loading_state"))
    );
}

#[test]
fn error_alert_wrapped_and_projected() {
    let mut feed = FeedState::new(vec!["a".to_string()]);

    feed.set_error_alert(Some(failed_alert()));
    assert_eq!(feed.error_alert().unwrap().title, "Loading failed");
    assert!(feed.error_alert_presentation().is_presented());

    feed.modify_error_alert(|alert| *alert = None);
    assert!(feed.error_alert().is_none());

    feed.set_error_alert_presentation(PresentationState::new(Some(failed_alert())));
    assert_eq!(
        feed.error_alert().unwrap().buttons[0].action,
        Some(AlertAction::Retry)
    );
}

#[test]
fn init_accessors() {
    let feed = FeedState::new(Vec::new())
        .with_loading_state(LoadingState::Loaded)
        .with_error_alert(Some(failed_alert()));

    assert_eq!(*feed.loading_state(), LoadingState::Loaded);
    assert!(feed.error_alert().is_some());
}

#[test]
fn without_alert() {
    let mut detail = DetailState::new(7);

    detail.modify_loading_state(|state| *state = LoadingState::Loaded);

    assert_eq!(*detail.loading_state(), LoadingState::Loaded);
    assert_eq!(*detail.id(), 7);
}

//! Integration tests for stale-response handling in the panel.

use sortify_classification_contract::{Annotations, Category};
use sortify_core::RequestSequencer;
use sortify_gauge::compute_visual_state;
use sortify_ui::{PanelState, PanelStatus, RecordingSink};

#[test]
fn older_response_cannot_overwrite_newer_request() {
    let sequencer = RequestSequencer::new();
    let mut panel = PanelState::new("v0.1.0");

    let first = sequencer.next_token();
    assert!(panel.begin(first, PanelStatus::Classifying));
    let second = sequencer.next_token();
    assert!(panel.begin(second, PanelStatus::Classifying));

    let phishing = compute_visual_state(Category::Phishing, 0.9, None);
    assert!(!panel.accept(first, phishing, Annotations::placeholder()));
    assert!(panel.visual().is_none());
    assert_eq!(panel.status(), PanelStatus::Classifying);

    let ham = compute_visual_state(Category::Ham, 0.1, None);
    assert!(panel.accept(second, ham.clone(), Annotations::placeholder()));
    assert_eq!(panel.visual(), Some(&ham));
}

#[test]
fn stale_failure_is_ignored_and_failure_keeps_prior_state() {
    let sequencer = RequestSequencer::new();
    let mut panel = PanelState::new("v0.1.0");

    let first = sequencer.next_token();
    panel.begin(first, PanelStatus::Classifying);
    let spam = compute_visual_state(Category::Spam, 0.7, None);
    assert!(panel.accept(first, spam.clone(), Annotations::placeholder()));

    let second = sequencer.next_token();
    panel.begin(second, PanelStatus::Classifying);
    assert!(!panel.fail(first, PanelStatus::ContactError));
    assert!(panel.fail(second, PanelStatus::TimedOut));

    assert_eq!(panel.status(), PanelStatus::TimedOut);
    assert_eq!(panel.visual(), Some(&spam));
}

#[test]
fn begin_rejects_older_token() {
    let sequencer = RequestSequencer::new();
    let mut panel = PanelState::new("v0.1.0");
    let first = sequencer.next_token();
    let second = sequencer.next_token();

    assert!(panel.begin(second, PanelStatus::Classifying));
    assert!(!panel.begin(first, PanelStatus::Classifying));
    assert_eq!(panel.latest_token(), Some(second));
}

#[test]
fn present_pushes_render_then_status() {
    let mut panel = PanelState::new("v0.1.0");
    let mut sink = RecordingSink::default();

    panel.present(&mut sink);
    assert!(sink.renders.is_empty());
    assert_eq!(sink.last_status(), Some(PanelStatus::Idle));

    let token = RequestSequencer::new().next_token();
    assert!(panel.begin(token, PanelStatus::ReadingMail));
    let state = compute_visual_state(Category::Support, 0.4, Some("Ticket"));
    assert!(panel.show(token, state.clone(), Annotations::placeholder(), PanelStatus::EmptyBody));
    panel.present(&mut sink);

    assert_eq!(sink.last_render(), Some(&state));
    assert_eq!(sink.last_status(), Some(PanelStatus::EmptyBody));
}

#[test]
fn newer_request_without_backend_call_blocks_older_result() {
    let sequencer = RequestSequencer::new();
    let mut panel = PanelState::new("v0.1.0");

    let first = sequencer.next_token();
    assert!(panel.begin(first, PanelStatus::Classifying));
    let second = sequencer.next_token();
    assert!(panel.begin(second, PanelStatus::ReadingMail));

    let neutral = compute_visual_state(Category::Unknown, 0.5, None);
    assert!(panel.show(
        second,
        neutral.clone(),
        Annotations::placeholder(),
        PanelStatus::EmptyBody
    ));
    assert!(!panel.progress(first, PanelStatus::Classifying));

    let phishing = compute_visual_state(Category::Phishing, 0.9, None);
    assert!(!panel.accept(first, phishing, Annotations::placeholder()));
    assert!(!panel.show(
        first,
        neutral.clone(),
        Annotations::placeholder(),
        PanelStatus::Complete
    ));

    assert_eq!(panel.visual(), Some(&neutral));
    assert_eq!(panel.status(), PanelStatus::EmptyBody);
}

//! Integration tests for the read -> classify -> render flow.

mod common;

use std::time::Duration;

use serde_json::json;
use sortify_app::{ClassifyOutcome, EMPTY_CONTENT_ANNOTATION};
use sortify_classification_contract::Category;
use sortify_gauge::{ColorToken, GaugePolicy};
use sortify_host::{Attachment, MailItem, StaticMailHost};
use sortify_ui::{PanelStatus, RecordingSink};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{Reply, ScriptedTransport, http_session, scripted_session};

fn item_with_attachment(body: &str) -> MailItem {
    let mut item = MailItem::text(Some("Invoice overdue"), body);
    item.attachments.push(Attachment::named("invoice.pdf"));
    item
}

#[tokio::test]
async fn spam_result_renders_elevated_gauge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/classify"))
        .and(body_json(json!({
            "text": "Pay the attached invoice today",
            "attachment": "Yes"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "label": "spam",
            "score": 82,
            "links": ["bit.ly", "pay-now.example"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = http_session(&server.uri());
    let host = StaticMailHost::with_item(item_with_attachment("Pay the attached invoice today"));
    let mut sink = RecordingSink::default();

    let outcome = session.classify_active_item(&host, &mut sink).await;

    let ClassifyOutcome::Rendered(state) = outcome else {
        panic!("expected a rendered state, got {outcome:?}");
    };
    assert_eq!(state.category, Category::Spam);
    assert_eq!(state.angle_degrees, 45.0);
    assert_eq!(state.color, ColorToken::Elevated);
    assert_eq!(state.percent_text(), "82%");
    assert_eq!(state.display_text, "Spam");

    let (_, annotations) = &sink.renders[0];
    assert_eq!(annotations.links, "bit.ly, pay-now.example");
    assert_eq!(annotations.sender, "--");
    assert_eq!(annotations.attachment, "Yes");
    assert_eq!(
        sink.statuses,
        vec![
            PanelStatus::ReadingMail,
            PanelStatus::Classifying,
            PanelStatus::Complete
        ]
    );
    assert_eq!(session.panel().status(), PanelStatus::Complete);
}

#[tokio::test]
async fn empty_body_skips_backend_and_shows_neutral_gauge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let session = http_session(&server.uri());
    let host = StaticMailHost::with_item(MailItem::text(Some("blank"), "  \n\t "));
    let mut sink = RecordingSink::default();

    let outcome = session.classify_active_item(&host, &mut sink).await;

    assert_eq!(outcome, ClassifyOutcome::EmptyBody);
    let state = sink.last_render().expect("neutral gauge should render");
    assert_eq!(state.category, Category::Unknown);
    assert_eq!(state.normalized_score, 0.5);
    assert_eq!(state.angle_degrees, 0.0);
    assert_eq!(sink.renders[0].1.content, EMPTY_CONTENT_ANNOTATION);
    assert_eq!(sink.last_status(), Some(PanelStatus::EmptyBody));
}

#[tokio::test]
async fn host_failures_map_to_statuses() {
    let transport = ScriptedTransport::new([]);
    let session = scripted_session(
        transport.clone(),
        Duration::from_secs(10),
        GaugePolicy::Categorical,
    );

    let mut sink = RecordingSink::default();
    let outcome = session
        .classify_active_item(&StaticMailHost::failing("body unavailable"), &mut sink)
        .await;
    assert_eq!(outcome, ClassifyOutcome::Unavailable);
    assert_eq!(sink.last_status(), Some(PanelStatus::Unavailable));

    let mut sink = RecordingSink::default();
    let outcome = session
        .classify_active_item(&StaticMailHost::empty(), &mut sink)
        .await;
    assert_eq!(outcome, ClassifyOutcome::NoItem);
    assert_eq!(sink.last_status(), Some(PanelStatus::NoItem));

    assert!(transport.seen().is_empty());
    assert!(sink.renders.is_empty());
}

#[tokio::test]
async fn backend_error_keeps_previous_gauge() {
    let transport = ScriptedTransport::new([
        Reply::Now(200, r#"{"label":"ham","score":0.12}"#),
        Reply::Now(500, "model offline"),
    ]);
    let session = scripted_session(transport, Duration::from_secs(10), GaugePolicy::Categorical);
    let host = StaticMailHost::with_item(MailItem::text(None, "Lunch at noon?"));

    let mut sink = RecordingSink::default();
    let first = session.classify_active_item(&host, &mut sink).await;
    assert!(matches!(first, ClassifyOutcome::Rendered(_)));

    let mut sink = RecordingSink::default();
    let second = session.classify_active_item(&host, &mut sink).await;
    assert_eq!(second, ClassifyOutcome::ContactError);
    assert!(sink.renders.is_empty());
    assert_eq!(sink.last_status(), Some(PanelStatus::ContactError));

    let panel = session.panel();
    assert_eq!(panel.status(), PanelStatus::ContactError);
    assert_eq!(
        panel.visual().map(|state| state.category),
        Some(Category::Ham)
    );
}

#[tokio::test]
async fn non_json_success_body_is_a_contact_error() {
    let transport = ScriptedTransport::new([Reply::Now(200, "<html>gateway</html>")]);
    let session = scripted_session(transport, Duration::from_secs(10), GaugePolicy::Categorical);
    let host = StaticMailHost::with_item(MailItem::text(None, "hello"));

    let mut sink = RecordingSink::default();
    let outcome = session.classify_active_item(&host, &mut sink).await;

    assert_eq!(outcome, ClassifyOutcome::ContactError);
    assert!(session.panel().visual().is_none());
}

#[tokio::test(start_paused = true)]
async fn silent_backend_times_out() {
    let transport = ScriptedTransport::new([Reply::Hang]);
    let session = scripted_session(transport, Duration::from_secs(10), GaugePolicy::Categorical);
    let host = StaticMailHost::with_item(MailItem::text(None, "are you there"));

    let mut sink = RecordingSink::default();
    let outcome = session.classify_active_item(&host, &mut sink).await;

    assert_eq!(outcome, ClassifyOutcome::TimedOut);
    assert_eq!(sink.last_status(), Some(PanelStatus::TimedOut));
    assert_eq!(session.panel().status(), PanelStatus::TimedOut);
}

#[tokio::test]
async fn banded_policy_moves_needle_within_band() {
    let transport = ScriptedTransport::new([Reply::Now(
        200,
        r#"{"label":"phishing","score":0.25,"display":"Likely phishing"}"#,
    )]);
    let session = scripted_session(transport, Duration::from_secs(10), GaugePolicy::Banded);
    let host = StaticMailHost::with_item(MailItem::text(None, "verify your password"));

    let mut sink = RecordingSink::default();
    let ClassifyOutcome::Rendered(state) = session.classify_active_item(&host, &mut sink).await
    else {
        panic!("expected a rendered state");
    };

    assert_eq!(state.color, ColorToken::Critical);
    assert_eq!(state.display_text, "Likely phishing");
    assert!(state.angle_degrees < 90.0);
    assert!(state.angle_degrees >= 67.5);
}

#![warn(missing_docs)]
//! # sortify-ui
//!
//! ## Purpose
//! Defines the UI-facing panel model and the presentation sink contract for
//! `sortify`.
//!
//! ## Responsibilities
//! - Represent the user-visible panel status ([`PanelStatus`]).
//! - Hold the single rendered [`VisualState`] with last-write-wins semantics:
//!   results for superseded request tokens are dropped.
//! - Define [`PresentationSink`], the interface a gauge/badge renderer
//!   implements.
//!
//! ## Data flow
//! Orchestration events mutate [`PanelState`]; accepted changes are pushed to
//! a [`PresentationSink`] which paints them.
//!
//! ## Ownership and lifetimes
//! `PanelState` owns its visual state and annotations so sinks can be
//! refreshed at any time without holding borrowed response data.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors. Stale updates are
//! reported by a `false` return value, not an error.
//!
//! ## Security and privacy notes
//! Panel state never holds mail body text, only derived display values.

use std::fmt;

use serde::{Deserialize, Serialize};
use sortify_classification_contract::Annotations;
use sortify_core::RequestToken;
use sortify_gauge::VisualState;
use tracing::debug;

/// User-visible panel status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanelStatus {
    /// Nothing has happened yet.
    Idle,
    /// Mail body is being read from the host.
    ReadingMail,
    /// Classification request is in flight.
    Classifying,
    /// Latest classification was rendered.
    Complete,
    /// Host has no active mail item.
    NoItem,
    /// Mail body has no readable text.
    EmptyBody,
    /// Host failed to supply the mail body.
    Unavailable,
    /// Backend rejected the request or could not be reached.
    ContactError,
    /// Backend did not answer within the configured timeout.
    TimedOut,
}

impl PanelStatus {
    /// Status line text.
    pub fn message(self) -> &'static str {
        match self {
            Self::Idle => "No classification yet",
            Self::ReadingMail => "Reading email...",
            Self::Classifying => "Classifying email...",
            Self::Complete => "Classification complete.",
            Self::NoItem => "No email item available.",
            Self::EmptyBody => "Email has no readable body text.",
            Self::Unavailable => "Failed to read email body.",
            Self::ContactError => "Error contacting backend",
            Self::TimedOut => "Classification timed out",
        }
    }

    /// Returns `true` while work is in progress.
    pub fn is_busy(self) -> bool {
        matches!(self, Self::ReadingMail | Self::Classifying)
    }

    /// Returns `true` for failure statuses.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Self::NoItem | Self::Unavailable | Self::ContactError | Self::TimedOut
        )
    }
}

impl fmt::Display for PanelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Rendering layer fed by the panel.
pub trait PresentationSink {
    /// Paints a new gauge state and its annotations.
    fn render(&mut self, state: &VisualState, annotations: &Annotations);

    /// Updates the status line.
    fn status(&mut self, status: PanelStatus);
}

/// Aggregate panel state.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    /// App version string sourced from root `VERSION`.
    pub version: String,
    status: PanelStatus,
    visual: Option<VisualState>,
    annotations: Annotations,
    latest: Option<RequestToken>,
}

impl PanelState {
    /// Creates an idle panel with nothing rendered.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            status: PanelStatus::Idle,
            visual: None,
            annotations: Annotations::placeholder(),
            latest: None,
        }
    }

    /// Current status.
    pub fn status(&self) -> PanelStatus {
        self.status
    }

    /// Last rendered visual state, if any.
    pub fn visual(&self) -> Option<&VisualState> {
        self.visual.as_ref()
    }

    /// Annotations rendered alongside the visual state.
    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Most recent request token seen by the panel.
    pub fn latest_token(&self) -> Option<RequestToken> {
        self.latest
    }

    /// Registers a new in-flight request that starts in `status`.
    ///
    /// Returns `false` when `token` is older than one already registered.
    /// Every later update for an older token is dropped once this succeeds.
    pub fn begin(&mut self, token: RequestToken, status: PanelStatus) -> bool {
        if self.latest.is_some_and(|latest| token < latest) {
            debug!(stage = "panel", action = "begin_stale", token = %token);
            return false;
        }

        self.latest = Some(token);
        self.status = status;
        true
    }

    /// Moves `token`'s request to another in-progress status.
    ///
    /// Returns `false` when `token` has been superseded.
    pub fn progress(&mut self, token: RequestToken, status: PanelStatus) -> bool {
        if !self.is_current(token) {
            debug!(stage = "panel", action = "drop_stale_progress", token = %token);
            return false;
        }

        self.status = status;
        true
    }

    /// Replaces the rendered state for `token` without a backend result, for
    /// example the neutral gauge shown for empty mail.
    ///
    /// Returns `false` and leaves the panel untouched when `token` has been
    /// superseded.
    pub fn show(
        &mut self,
        token: RequestToken,
        state: VisualState,
        annotations: Annotations,
        status: PanelStatus,
    ) -> bool {
        if !self.is_current(token) {
            debug!(stage = "panel", action = "drop_stale_show", token = %token);
            return false;
        }

        self.visual = Some(state);
        self.annotations = annotations;
        self.status = status;
        true
    }

    /// Applies a classification result for `token`.
    ///
    /// Returns `false` and leaves the panel untouched when `token` has been
    /// superseded.
    pub fn accept(
        &mut self,
        token: RequestToken,
        state: VisualState,
        annotations: Annotations,
    ) -> bool {
        if !self.is_current(token) {
            debug!(stage = "panel", action = "drop_stale_result", token = %token);
            return false;
        }

        self.visual = Some(state);
        self.annotations = annotations;
        self.status = PanelStatus::Complete;
        true
    }

    /// Records a failure for `token`, keeping the prior visual state.
    ///
    /// Returns `false` when `token` has been superseded.
    pub fn fail(&mut self, token: RequestToken, status: PanelStatus) -> bool {
        if !self.is_current(token) {
            debug!(stage = "panel", action = "drop_stale_failure", token = %token);
            return false;
        }

        self.status = status;
        true
    }

    /// Pushes the full panel contents to `sink`.
    pub fn present(&self, sink: &mut dyn PresentationSink) {
        if let Some(visual) = &self.visual {
            sink.render(visual, &self.annotations);
        }
        sink.status(self.status);
    }

    fn is_current(&self, token: RequestToken) -> bool {
        self.latest == Some(token)
    }
}

/// In-memory sink that records every update, for headless hosts and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordingSink {
    /// Rendered states, oldest first.
    pub renders: Vec<(VisualState, Annotations)>,
    /// Status updates, oldest first.
    pub statuses: Vec<PanelStatus>,
}

impl RecordingSink {
    /// Most recent rendered state.
    pub fn last_render(&self) -> Option<&VisualState> {
        self.renders.last().map(|(state, _)| state)
    }

    /// Most recent status.
    pub fn last_status(&self) -> Option<PanelStatus> {
        self.statuses.last().copied()
    }
}

impl PresentationSink for RecordingSink {
    fn render(&mut self, state: &VisualState, annotations: &Annotations) {
        self.renders.push((state.clone(), annotations.clone()));
    }

    fn status(&mut self, status: PanelStatus) {
        self.statuses.push(status);
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for panel state gates.

    use sortify_classification_contract::Category;
    use sortify_core::RequestSequencer;
    use sortify_gauge::compute_visual_state;

    use super::*;

    #[test]
    fn accept_requires_registered_token() {
        let sequencer = RequestSequencer::new();
        let mut panel = PanelState::new("v0.1.0");
        let token = sequencer.next_token();

        let state = compute_visual_state(Category::Ham, 0.1, None);
        assert!(!panel.accept(token, state.clone(), Annotations::placeholder()));
        assert!(panel.visual().is_none());

        assert!(panel.begin(token, PanelStatus::Classifying));
        assert_eq!(panel.status(), PanelStatus::Classifying);
        assert!(panel.accept(token, state, Annotations::placeholder()));
        assert_eq!(panel.status(), PanelStatus::Complete);
    }

    #[test]
    fn failure_statuses_are_flagged() {
        assert!(PanelStatus::TimedOut.is_failure());
        assert!(PanelStatus::Classifying.is_busy());
        assert!(!PanelStatus::Complete.is_failure());
        assert_eq!(PanelStatus::ContactError.to_string(), "Error contacting backend");
    }
}

#![warn(missing_docs)]
//! # sortify-app
//!
//! ## Purpose
//! Orchestrates the mail host, classification client, gauge mapper, and
//! panel state for `sortify`.
//!
//! ## Responsibilities
//! - Read the active mail item and refuse to classify unreadable or empty
//!   bodies.
//! - Issue request tokens so only the newest classification is rendered.
//! - Map backend results to visual states and push them to a sink.
//! - Translate host/backend failures into user-visible panel statuses.
//! - Compose support referral drafts.
//!
//! ## Data flow
//! [`MailHost`] -> [`MailContext`] -> [`ClassifierClient`] -> resolved
//! classification -> [`GaugeMapper`] -> [`PanelState`] ->
//! [`PresentationSink`].
//!
//! ## Ownership and lifetimes
//! [`ClassificationSession`] is `Send + Sync` and may be shared behind `Arc`;
//! the panel lock is never held across an await point.
//!
//! ## Error model
//! Classification never returns an error: every failure becomes a
//! [`ClassifyOutcome`] and a panel status. Setup and referral failures are
//! wrapped in [`AppError`].
//!
//! ## Security and privacy notes
//! Mail bodies are never logged; events carry only lengths and outcomes.

pub mod config;
pub mod referral;
pub mod render;
pub mod telemetry;

use std::sync::{Mutex, MutexGuard, PoisonError};

use sortify_classification_contract::Annotations;
use sortify_client::{ClassifierClient, ClientError};
use sortify_core::{ClassifyRequest, MailContext, RequestSequencer, RequestToken};
use sortify_gauge::{GaugeError, GaugeMapper, VisualState};
use sortify_host::{HostError, MailHost, MailItem};
use sortify_ui::{PanelState, PanelStatus, PresentationSink};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use config::{AppConfig, ConfigError};
pub use referral::{SupportReferral, compose_support_referral};

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("SORTIFY_VERSION");

/// Content annotation shown for items without readable text.
pub const EMPTY_CONTENT_ANNOTATION: &str = "No content";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Result of one classification attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifyOutcome {
    /// A new visual state was rendered.
    Rendered(VisualState),
    /// The host had no active item.
    NoItem,
    /// The host failed to supply the body.
    Unavailable,
    /// The body had no readable text; the neutral gauge was rendered.
    EmptyBody,
    /// The backend failed or could not be reached.
    ContactError,
    /// The backend did not answer in time.
    TimedOut,
    /// A newer request started before this one finished; nothing rendered.
    Superseded,
}

impl ClassifyOutcome {
    /// Returns `true` for outcomes the user should treat as failures.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::NoItem | Self::Unavailable | Self::ContactError | Self::TimedOut
        )
    }
}

/// One panel's classification pipeline.
pub struct ClassificationSession {
    client: ClassifierClient,
    mapper: GaugeMapper,
    sequencer: RequestSequencer,
    panel: Mutex<PanelState>,
}

impl ClassificationSession {
    /// Creates a session with an idle panel.
    pub fn new(client: ClassifierClient, mapper: GaugeMapper) -> Self {
        Self {
            client,
            mapper,
            sequencer: RequestSequencer::new(),
            panel: Mutex::new(PanelState::new(APP_VERSION)),
        }
    }

    /// Builds a session from configuration, using the HTTP transport.
    ///
    /// # Errors
    /// Returns [`AppError::Client`] when the endpoint or HTTP client is
    /// invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let client = ClassifierClient::http(&config.endpoint, config.client_config())?;
        Ok(Self::new(client, GaugeMapper::new(config.policy)))
    }

    /// Snapshot of the panel.
    pub fn panel(&self) -> PanelState {
        self.lock_panel().clone()
    }

    /// Reads the host's active item and classifies it.
    ///
    /// The request token is taken before the host read, so this call
    /// supersedes any older in-flight request even when it never reaches the
    /// backend.
    pub async fn classify_active_item(
        &self,
        host: &dyn MailHost,
        sink: &mut dyn PresentationSink,
    ) -> ClassifyOutcome {
        let token = self.sequencer.next_token();
        if !self.lock_panel().begin(token, PanelStatus::ReadingMail) {
            return ClassifyOutcome::Superseded;
        }
        sink.status(PanelStatus::ReadingMail);

        let item = match host.active_item().await {
            Ok(Some(item)) => item,
            Ok(None) => {
                warn!(stage = "host", action = "no_item", token = %token);
                return self.finish_failure(
                    token,
                    PanelStatus::NoItem,
                    ClassifyOutcome::NoItem,
                    sink,
                );
            }
            Err(error) => {
                warn!(stage = "host", action = "read_failed", token = %token, error = %error);
                return self.finish_failure(
                    token,
                    PanelStatus::Unavailable,
                    ClassifyOutcome::Unavailable,
                    sink,
                );
            }
        };

        self.classify_for(token, &item.context(), sink).await
    }

    /// Classifies an already-read mail context.
    pub async fn classify_context(
        &self,
        context: &MailContext,
        sink: &mut dyn PresentationSink,
    ) -> ClassifyOutcome {
        let token = self.sequencer.next_token();
        if !self.lock_panel().begin(token, PanelStatus::Classifying) {
            return ClassifyOutcome::Superseded;
        }
        self.classify_for(token, context, sink).await
    }

    async fn classify_for(
        &self,
        token: RequestToken,
        context: &MailContext,
        sink: &mut dyn PresentationSink,
    ) -> ClassifyOutcome {
        let Ok(request) = ClassifyRequest::from_context(context) else {
            return self.show_empty_body(token, context, sink);
        };

        if !self.lock_panel().progress(token, PanelStatus::Classifying) {
            return ClassifyOutcome::Superseded;
        }
        sink.status(PanelStatus::Classifying);
        info!(
            stage = "classify",
            action = "start",
            token = %token,
            text_len = request.text.len(),
            attachment = %request.attachment
        );

        match self.client.classify(&request).await {
            Ok(result) => {
                let resolved = result.resolve(context.attachment());
                let state = self.mapper.map(&resolved);
                let accepted = self.lock_panel().accept(
                    token,
                    state.clone(),
                    resolved.annotations.clone(),
                );
                if !accepted {
                    debug!(stage = "classify", action = "superseded", token = %token);
                    return ClassifyOutcome::Superseded;
                }

                info!(
                    stage = "classify",
                    action = "complete",
                    token = %token,
                    category = %state.category,
                    score = state.normalized_score
                );
                sink.render(&state, &resolved.annotations);
                sink.status(PanelStatus::Complete);
                ClassifyOutcome::Rendered(state)
            }
            Err(error) => {
                let (status, outcome) = failure_status(&error);
                warn!(stage = "classify", action = "failed", token = %token, error = %error);
                self.finish_failure(token, status, outcome, sink)
            }
        }
    }

    fn show_empty_body(
        &self,
        token: RequestToken,
        context: &MailContext,
        sink: &mut dyn PresentationSink,
    ) -> ClassifyOutcome {
        info!(stage = "classify", action = "skip_empty_body", token = %token);
        let state = VisualState::neutral();
        let annotations = Annotations {
            content: EMPTY_CONTENT_ANNOTATION.to_string(),
            attachment: context.attachment().to_string(),
            ..Annotations::placeholder()
        };

        let shown = self.lock_panel().show(
            token,
            state.clone(),
            annotations.clone(),
            PanelStatus::EmptyBody,
        );
        if !shown {
            return ClassifyOutcome::Superseded;
        }
        sink.render(&state, &annotations);
        sink.status(PanelStatus::EmptyBody);
        ClassifyOutcome::EmptyBody
    }

    fn finish_failure(
        &self,
        token: RequestToken,
        status: PanelStatus,
        outcome: ClassifyOutcome,
        sink: &mut dyn PresentationSink,
    ) -> ClassifyOutcome {
        if !self.lock_panel().fail(token, status) {
            return ClassifyOutcome::Superseded;
        }
        sink.status(status);
        outcome
    }

    fn lock_panel(&self) -> MutexGuard<'_, PanelState> {
        self.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn failure_status(error: &ClientError) -> (PanelStatus, ClassifyOutcome) {
    if error.is_timeout() {
        (PanelStatus::TimedOut, ClassifyOutcome::TimedOut)
    } else {
        (PanelStatus::ContactError, ClassifyOutcome::ContactError)
    }
}

/// Reads the host's active item and composes a support referral for it.
///
/// Returns `Ok(None)` when the host has no active item.
///
/// # Errors
/// Returns [`AppError::Host`] when the item cannot be read and
/// [`AppError::InvalidSupportAddress`] for an unusable recipient.
pub async fn prepare_support_referral(
    host: &dyn MailHost,
    support_address: &str,
) -> Result<Option<SupportReferral>, AppError> {
    let Some(item): Option<MailItem> = host.active_item().await? else {
        return Ok(None);
    };

    let referral = compose_support_referral(&item, support_address)?;
    info!(
        stage = "referral",
        action = "composed",
        attachments = referral.attachments.len()
    );
    Ok(Some(referral))
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// Mail host error.
    #[error("host error: {0}")]
    Host(#[from] HostError),
    /// Classifier client error.
    #[error("client error: {0}")]
    Client(#[from] ClientError),
    /// Gauge configuration error.
    #[error("gauge error: {0}")]
    Gauge(#[from] GaugeError),
    /// Support recipient is unusable.
    #[error("invalid support address: {0:?}")]
    InvalidSupportAddress(String),
}

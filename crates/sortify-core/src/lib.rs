#![warn(missing_docs)]
//! # sortify-core
//!
//! ## Purpose
//! Defines the pure data model shared across the `sortify` workspace.
//!
//! ## Responsibilities
//! - Represent the read-only mail context supplied by the host.
//! - Build the outbound classification request body.
//! - Issue monotonically increasing request tokens for last-write-wins
//!   rendering.
//!
//! ## Data flow
//! Host reads a mail item -> [`MailContext`] -> [`ClassifyRequest`] sent to the
//! classification backend. Every attempt is tagged with a [`RequestToken`]
//! from a [`RequestSequencer`].
//!
//! ## Ownership and lifetimes
//! Mail text and request bodies are owned (`String`) so they can cross async
//! task boundaries without borrowing from host buffers.
//!
//! ## Error model
//! Request construction from an empty body returns [`CoreError`]. Every other
//! operation is total.
//!
//! ## Security and privacy notes
//! Mail bodies are user content. This crate never logs them and its `Debug`
//! output for [`MailContext`] reports only the body length.
//!
//! ## Example
//! ```rust
//! use sortify_core::{AttachmentFlag, MailContext, RequestSequencer};
//!
//! let context = MailContext::new("Your invoice is attached", true);
//! assert_eq!(context.attachment(), AttachmentFlag::Yes);
//!
//! let sequencer = RequestSequencer::new();
//! let first = sequencer.next_token();
//! let second = sequencer.next_token();
//! assert!(second > first);
//! assert!(sequencer.is_latest(second));
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attachment presence as carried on the classification wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentFlag {
    /// The mail item has at least one attachment.
    Yes,
    /// The mail item has no attachments.
    No,
}

impl AttachmentFlag {
    /// Converts a presence boolean into the wire flag.
    pub fn from_presence(present: bool) -> Self {
        if present { Self::Yes } else { Self::No }
    }

    /// Returns the wire/display spelling (`"Yes"` or `"No"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

impl fmt::Display for AttachmentFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only value object describing the active mail item.
#[derive(Clone, PartialEq, Eq)]
pub struct MailContext {
    body: String,
    has_attachment: bool,
}

impl MailContext {
    /// Creates a mail context from plain-text body and attachment presence.
    pub fn new(body: impl Into<String>, has_attachment: bool) -> Self {
        Self {
            body: body.into(),
            has_attachment,
        }
    }

    /// Plain-text body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns `true` when the item carries at least one attachment.
    pub fn has_attachment(&self) -> bool {
        self.has_attachment
    }

    /// Attachment presence as a wire flag.
    pub fn attachment(&self) -> AttachmentFlag {
        AttachmentFlag::from_presence(self.has_attachment)
    }

    /// Returns `true` when the body has no readable (non-whitespace) text.
    pub fn is_blank(&self) -> bool {
        self.body.trim().is_empty()
    }
}

impl fmt::Debug for MailContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailContext")
            .field("body_len", &self.body.len())
            .field("has_attachment", &self.has_attachment)
            .finish()
    }
}

/// Outbound body for the classification endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyRequest {
    /// Mail text to classify.
    pub text: String,
    /// Attachment presence flag.
    pub attachment: AttachmentFlag,
}

impl ClassifyRequest {
    /// Builds a request from a mail context.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyBody`] when the body has no readable text;
    /// such items are never sent to the backend.
    pub fn from_context(context: &MailContext) -> Result<Self, CoreError> {
        if context.is_blank() {
            return Err(CoreError::EmptyBody);
        }

        Ok(Self {
            text: context.body().to_string(),
            attachment: context.attachment(),
        })
    }

    /// Serializes the request to compact JSON bytes.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serde_json::to_vec(self).map_err(CoreError::Codec)
    }
}

/// Identity of one classification attempt.
///
/// Tokens compare by issue order: a greater token was issued later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Raw sequence number.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Issues strictly increasing [`RequestToken`] values.
///
/// The counter is atomic, so one sequencer can be shared between tasks.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    /// Creates a sequencer that has issued no tokens yet.
    pub fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issues the next token. The first token issued has value `1`.
    pub fn next_token(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns the most recently issued token, if any.
    pub fn latest(&self) -> Option<RequestToken> {
        match self.latest.load(Ordering::SeqCst) {
            0 => None,
            value => Some(RequestToken(value)),
        }
    }

    /// Returns `true` when `token` is the most recently issued one.
    pub fn is_latest(&self, token: RequestToken) -> bool {
        self.latest() == Some(token)
    }
}

/// Error type for core model validation and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Mail body has no readable text.
    #[error("mail body has no readable text")]
    EmptyBody,
    /// JSON encoding failure.
    #[error("request codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

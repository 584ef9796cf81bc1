#![warn(missing_docs)]
//! # sortify-host
//!
//! ## Purpose
//! Models the mail host collaborator: the component that owns the currently
//! open mail item and hands its body to `sortify`.
//!
//! ## Responsibilities
//! - Define the injectable async [`MailHost`] abstraction.
//! - Represent host mail items ([`MailItem`]) and coerce HTML bodies to text.
//! - Provide file, stdin, and in-memory host implementations.
//!
//! ## Data flow
//! [`MailHost::active_item`] -> [`MailItem`] -> [`MailItem::context`] ->
//! [`MailContext`] consumed by classification orchestration.
//!
//! ## Ownership and lifetimes
//! Items are returned owned so the host may discard its buffers immediately.
//!
//! ## Error model
//! `Ok(None)` means the host has no active item. Read failures return
//! [`HostError`]; callers treat them as "no input available" and never call
//! the classifier.
//!
//! ## Security and privacy notes
//! Body text is never logged; only byte counts are.

mod file;
mod html;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sortify_core::MailContext;
use thiserror::Error;

pub use file::{FileMailHost, StdinMailHost, parse_mail_document};
pub use html::html_to_text;

/// Encoding of a mail body as supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyFormat {
    /// Plain text.
    #[default]
    Text,
    /// HTML markup.
    Html,
}

/// Attachment reference exposed by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name shown to the user.
    pub name: String,
    /// Location the host can fetch the attachment from, if known.
    pub url: Option<String>,
}

impl Attachment {
    /// Attachment known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }
}

/// The active mail item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MailItem {
    /// Subject line, if the item has one.
    pub subject: Option<String>,
    /// Raw body in `body_format`.
    pub body: String,
    /// Body encoding.
    pub body_format: BodyFormat,
    /// Attachments, in host order.
    pub attachments: Vec<Attachment>,
}

impl MailItem {
    /// Plain-text item without attachments.
    pub fn text(subject: Option<&str>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.map(str::to_string),
            body: body.into(),
            body_format: BodyFormat::Text,
            attachments: Vec::new(),
        }
    }

    /// Body coerced to plain text.
    pub fn plain_text(&self) -> String {
        match self.body_format {
            BodyFormat::Text => self.body.clone(),
            BodyFormat::Html => html_to_text(&self.body),
        }
    }

    /// Returns `true` when the item has at least one attachment.
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Read-only classification context for this item.
    pub fn context(&self) -> MailContext {
        MailContext::new(self.plain_text(), self.has_attachments())
    }
}

/// Host that owns the currently open mail item.
#[async_trait]
pub trait MailHost: Send + Sync {
    /// Reads the active item.
    ///
    /// Returns `Ok(None)` when no item is open.
    async fn active_item(&self) -> Result<Option<MailItem>, HostError>;
}

/// Host backed by a fixed in-memory outcome.
#[derive(Debug, Clone)]
pub struct StaticMailHost {
    outcome: Result<Option<MailItem>, String>,
}

impl StaticMailHost {
    /// Host whose active item is `item`.
    pub fn with_item(item: MailItem) -> Self {
        Self {
            outcome: Ok(Some(item)),
        }
    }

    /// Host with no open item.
    pub fn empty() -> Self {
        Self { outcome: Ok(None) }
    }

    /// Host whose body read always fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            outcome: Err(reason.into()),
        }
    }
}

#[async_trait]
impl MailHost for StaticMailHost {
    async fn active_item(&self) -> Result<Option<MailItem>, HostError> {
        self.outcome.clone().map_err(HostError::ReadFailed)
    }
}

/// Errors produced by mail hosts.
#[derive(Debug, Error)]
pub enum HostError {
    /// Body could not be read.
    #[error("failed to read mail body: {0}")]
    ReadFailed(String),
    /// Underlying I/O failure.
    #[error("mail source i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    //! Unit tests for item projection.

    use sortify_core::AttachmentFlag;

    use super::*;

    #[test]
    fn html_items_are_coerced_to_text() {
        let item = MailItem {
            subject: Some("Invoice".to_string()),
            body: "<p>Pay <b>now</b></p>".to_string(),
            body_format: BodyFormat::Html,
            attachments: vec![Attachment::named("invoice.pdf")],
        };

        let context = item.context();
        assert_eq!(context.body().trim(), "Pay now");
        assert_eq!(context.attachment(), AttachmentFlag::Yes);
    }

    #[tokio::test]
    async fn static_host_reports_failure() {
        let host = StaticMailHost::failing("mailbox locked");
        let error = host
            .active_item()
            .await
            .expect_err("failing host should error");
        assert!(error.to_string().contains("mailbox locked"));
    }
}

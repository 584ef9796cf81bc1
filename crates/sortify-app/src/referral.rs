//! Support referral drafts.
//!
//! A referral forwards the active item to a support mailbox for manual
//! verification. The host opens the draft in its compose form after the user
//! confirms.

use serde::Serialize;
use sortify_host::{Attachment, MailItem};

use crate::AppError;

/// Subject prefix of every referral.
pub const REFERRAL_SUBJECT_PREFIX: &str = "Sortify Verification Request: ";

/// Subject used when the original item has none.
pub const FALLBACK_SUBJECT: &str = "Email for Support Review";

/// Draft message asking support to verify an item by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportReferral {
    /// Recipients.
    pub to: Vec<String>,
    /// Draft subject.
    pub subject: String,
    /// HTML body quoting the original item.
    pub html_body: String,
    /// Original attachments, forwarded by reference.
    pub attachments: Vec<Attachment>,
}

/// Composes a referral for `item` addressed to `support_address`.
///
/// # Errors
/// Returns [`AppError::InvalidSupportAddress`] when the address is blank or
/// has no `@`.
pub fn compose_support_referral(
    item: &MailItem,
    support_address: &str,
) -> Result<SupportReferral, AppError> {
    let address = support_address.trim();
    if address.is_empty() || !address.contains('@') {
        return Err(AppError::InvalidSupportAddress(support_address.to_string()));
    }

    let original_subject = item
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|subject| !subject.is_empty())
        .unwrap_or(FALLBACK_SUBJECT);

    let html_body = format!(
        "<p>Hi Sortify Support,</p>\n\
         <p>Please verify this email manually:</p>\n\
         <hr>\n\
         <p><strong>Original Subject:</strong> {subject}</p>\n\
         <p><strong>Original Body:</strong></p>\n\
         <pre>{body}</pre>\n\
         <hr>\n\
         <p>Thanks,<br/>Sortify User</p>",
        subject = escape_html(original_subject),
        body = escape_html(&item.plain_text()),
    );

    Ok(SupportReferral {
        to: vec![address.to_string()],
        subject: format!("{REFERRAL_SUBJECT_PREFIX}{original_subject}"),
        html_body,
        attachments: item.attachments.clone(),
    })
}

/// Escapes text for inclusion in HTML element content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#![warn(missing_docs)]
//! # sortify-classification-contract
//!
//! ## Purpose
//! Defines the classification backend response schema and the client-side
//! normalization helpers applied to it.
//!
//! ## Responsibilities
//! - Parse untrusted classification payloads without failing on garbled
//!   fields.
//! - Normalize raw confidence values into `[0, 1]` ([`normalize_score`]).
//! - Resolve label strings into the closed [`Category`] enumeration
//!   ([`resolve_category`]).
//! - Project optional annotation fields into display-ready strings.
//!
//! ## Data flow
//! Raw response body -> [`parse_classification_response`] ->
//! [`ClassificationResult::resolve`] -> [`ResolvedClassification`] consumed by
//! the gauge mapper.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned so they outlive the transient network buffer.
//!
//! ## Error model
//! Only a body that is not JSON at all returns
//! [`ClassificationContractError`]. Wrong-typed or missing fields degrade to
//! the `unknown` category and a neutral `0.5` score.
//!
//! ## Security and privacy notes
//! Annotation strings come from the backend and are passed through verbatim;
//! renderers must treat them as untrusted text.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sortify_core::AttachmentFlag;
use thiserror::Error;

/// Score used whenever the raw confidence cannot be interpreted.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Placeholder shown for annotation fields the backend did not provide.
pub const ANNOTATION_PLACEHOLDER: &str = "--";

/// Closed set of classification outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Legitimate mail.
    Ham,
    /// Customer support request.
    Support,
    /// Unsolicited bulk mail.
    Spam,
    /// Credential or payment fraud attempt.
    Phishing,
    /// Label missing or not recognized.
    Unknown,
}

impl Category {
    /// Every category, safest first.
    pub const ALL: [Category; 5] = [
        Category::Ham,
        Category::Support,
        Category::Unknown,
        Category::Spam,
        Category::Phishing,
    ];

    /// Canonical lower-case label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ham => "ham",
            Self::Support => "support",
            Self::Spam => "spam",
            Self::Phishing => "phishing",
            Self::Unknown => "unknown",
        }
    }

    /// Human-readable phrase shown when the backend sends no `display`.
    pub fn canonical_display(self) -> &'static str {
        match self {
            Self::Ham => "Safe",
            Self::Support => "Support Ticket",
            Self::Spam => "Spam",
            Self::Phishing => "Phishing",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves a raw label into a [`Category`].
///
/// Matching is case-insensitive and ignores surrounding whitespace. Missing,
/// empty, or unrecognized labels resolve to [`Category::Unknown`].
pub fn resolve_category(raw: Option<&str>) -> Category {
    let Some(raw) = raw else {
        return Category::Unknown;
    };

    match raw.trim().to_lowercase().as_str() {
        "ham" => Category::Ham,
        "support" => Category::Support,
        "spam" => Category::Spam,
        "phishing" => Category::Phishing,
        _ => Category::Unknown,
    }
}

/// Normalizes a raw JSON confidence value into `[0, 1]`.
///
/// # Semantics
/// - Numbers and numeric strings (optionally suffixed with `%`) are accepted.
/// - Values in `(1, 100]` are read as percentages and divided by 100.
/// - The result is clamped to `[0, 1]`.
/// - Anything else, including non-finite numbers, yields [`NEUTRAL_SCORE`].
pub fn normalize_score(raw: Option<&Value>) -> f64 {
    match raw.and_then(parse_raw_score) {
        Some(value) => normalize_value(value),
        None => NEUTRAL_SCORE,
    }
}

/// Normalizes an already-numeric confidence value into `[0, 1]`.
pub fn normalize_value(value: f64) -> f64 {
    if !value.is_finite() {
        return NEUTRAL_SCORE;
    }

    let scaled = if value > 1.0 && value <= 100.0 {
        value / 100.0
    } else {
        value
    };
    scaled.clamp(0.0, 1.0)
}

fn parse_raw_score(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => {
            let trimmed = text.trim();
            let numeric = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
            numeric.parse::<f64>().ok()
        }
        _ => None,
    }
}

/// Classification payload as received from the backend.
///
/// Every field is kept as raw JSON so that wrong-typed values never abort
/// parsing; interpretation happens in [`ClassificationResult::resolve`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Label string, expected to be one of the [`Category`] names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
    /// Confidence in `[0, 1]` or `[0, 100]`, as number or string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Value>,
    /// Optional display override for the badge text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Value>,
    /// Sender assessment annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Value>,
    /// Link assessment annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    /// Content/keyword assessment annotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    /// Attachment annotation, string or boolean.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Value>,
}

/// Display-ready annotation strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    /// Sender assessment.
    pub sender: String,
    /// Link assessment.
    pub links: String,
    /// Content/keyword assessment.
    pub content: String,
    /// Attachment assessment.
    pub attachment: String,
}

impl Annotations {
    /// Annotations with every field set to the placeholder.
    pub fn placeholder() -> Self {
        Self {
            sender: ANNOTATION_PLACEHOLDER.to_string(),
            links: ANNOTATION_PLACEHOLDER.to_string(),
            content: ANNOTATION_PLACEHOLDER.to_string(),
            attachment: ANNOTATION_PLACEHOLDER.to_string(),
        }
    }
}

impl Default for Annotations {
    fn default() -> Self {
        Self::placeholder()
    }
}

/// Fully interpreted classification, ready for visual mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedClassification {
    /// Resolved category.
    pub category: Category,
    /// Score normalized into `[0, 1]`.
    pub score: f64,
    /// Non-blank display override, if the backend sent one.
    pub display_override: Option<String>,
    /// Display-ready annotations.
    pub annotations: Annotations,
}

impl ClassificationResult {
    /// Resolved category of this payload.
    pub fn category(&self) -> Category {
        resolve_category(self.label.as_ref().and_then(Value::as_str))
    }

    /// Normalized score of this payload.
    pub fn normalized_score(&self) -> f64 {
        normalize_score(self.score.as_ref())
    }

    /// Non-blank `display` string, if any.
    pub fn display_override(&self) -> Option<String> {
        self.display
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }

    /// Interprets every field.
    ///
    /// `local_attachment` is the host's own attachment flag; it fills the
    /// attachment annotation when the backend omits one.
    pub fn resolve(&self, local_attachment: AttachmentFlag) -> ResolvedClassification {
        let attachment = match self.attachment.as_ref() {
            Some(Value::Bool(present)) => AttachmentFlag::from_presence(*present).to_string(),
            Some(Value::Null) | None => local_attachment.to_string(),
            Some(other) => annotation_text(Some(other)),
        };

        ResolvedClassification {
            category: self.category(),
            score: self.normalized_score(),
            display_override: self.display_override(),
            annotations: Annotations {
                sender: annotation_text(self.sender.as_ref()),
                links: annotation_text(self.links.as_ref()),
                content: annotation_text(self.content.as_ref()),
                attachment,
            },
        }
    }
}

fn annotation_text(raw: Option<&Value>) -> String {
    let text = match raw {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    };

    if text.trim().is_empty() {
        ANNOTATION_PLACEHOLDER.to_string()
    } else {
        text
    }
}

/// Parses a raw response body.
///
/// A JSON document that is not an object yields an empty result, which
/// resolves to `unknown` with a neutral score.
///
/// # Errors
/// Returns [`ClassificationContractError::Decode`] when the body is not JSON.
pub fn parse_classification_response(
    raw: &str,
) -> Result<ClassificationResult, ClassificationContractError> {
    let value: Value = serde_json::from_str(raw).map_err(ClassificationContractError::Decode)?;
    Ok(classification_from_value(value))
}

/// Interprets an already-decoded JSON value as a classification payload.
pub fn classification_from_value(value: Value) -> ClassificationResult {
    match value {
        // All fields are optional raw values, so an object always decodes.
        Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => ClassificationResult::default(),
    }
}

/// Classification contract errors.
#[derive(Debug, Error)]
pub enum ClassificationContractError {
    /// Body is not valid JSON.
    #[error("classification decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}

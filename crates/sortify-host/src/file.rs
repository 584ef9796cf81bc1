//! File and stdin mail hosts.
//!
//! Mail documents are a small header block followed by a blank line and the
//! body:
//!
//! ```text
//! Subject: Your account is locked
//! Attachment: statement.pdf
//! Content-Type: text/html
//!
//! <p>Verify your account today.</p>
//! ```
//!
//! Documents whose first line is not a recognized header are read as a bare
//! body.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::{Attachment, BodyFormat, HostError, MailHost, MailItem};

const KNOWN_HEADERS: [&str; 6] = ["subject", "attachment", "content-type", "from", "to", "date"];

/// Parses a mail document.
///
/// `default_format` applies when no `Content-Type` header is present.
pub fn parse_mail_document(raw: &str, default_format: BodyFormat) -> MailItem {
    let mut item = MailItem {
        body_format: default_format,
        ..MailItem::default()
    };

    let first = raw.lines().next().unwrap_or_default();
    if header_name(first).is_none() {
        item.body = raw.to_string();
        return item;
    }

    let mut consumed = 0usize;
    for line in raw.lines() {
        consumed += 1;
        if line.trim().is_empty() {
            break;
        }

        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match name.trim().to_ascii_lowercase().as_str() {
            "subject" if !value.is_empty() => item.subject = Some(value.to_string()),
            "attachment" if !value.is_empty() => item.attachments.push(Attachment::named(value)),
            "content-type" => {
                item.body_format = if value.to_ascii_lowercase().contains("html") {
                    BodyFormat::Html
                } else {
                    BodyFormat::Text
                };
            }
            other => debug!(stage = "host", action = "skip_header", header = other),
        }
    }

    item.body = raw
        .lines()
        .skip(consumed)
        .collect::<Vec<_>>()
        .join("\n");
    item
}

fn header_name(line: &str) -> Option<&str> {
    let (name, _) = line.split_once(':')?;
    let name = name.trim();
    KNOWN_HEADERS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(name))
        .then_some(name)
}

fn format_for_path(path: &Path) -> BodyFormat {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("html" | "htm") => BodyFormat::Html,
        _ => BodyFormat::Text,
    }
}

/// Host that serves one mail document from disk.
#[derive(Debug, Clone)]
pub struct FileMailHost {
    path: PathBuf,
}

impl FileMailHost {
    /// Creates a host for the document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Document path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MailHost for FileMailHost {
    async fn active_item(&self) -> Result<Option<MailItem>, HostError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(stage = "host", action = "missing_item", path = %self.path.display());
                return Ok(None);
            }
            Err(error) => return Err(HostError::Io(error)),
        };

        debug!(stage = "host", action = "read_file", bytes = raw.len());
        Ok(Some(parse_mail_document(&raw, format_for_path(&self.path))))
    }
}

/// Host that reads one mail document from standard input.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinMailHost;

#[async_trait]
impl MailHost for StdinMailHost {
    async fn active_item(&self) -> Result<Option<MailItem>, HostError> {
        let mut raw = String::new();
        tokio::io::stdin().read_to_string(&mut raw).await?;
        debug!(stage = "host", action = "read_stdin", bytes = raw.len());

        if raw.is_empty() {
            return Ok(None);
        }
        Ok(Some(parse_mail_document(&raw, BodyFormat::Text)))
    }
}

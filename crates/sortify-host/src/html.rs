//! HTML body coercion.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static HIDDEN_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|head)\b[^>]*>.*?</(script|style|head)\s*>")
        .expect("hidden block pattern is valid")
});

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|tr|li|h[1-6]|blockquote)\s*>")
        .expect("line break pattern is valid")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid")
});

static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#(\d+)|#[xX]([0-9A-Fa-f]+)|([a-zA-Z]+));")
        .expect("entity pattern is valid")
});

static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n[ \t]*(\n[ \t]*)+").expect("blank run pattern is valid")
});

/// Converts an HTML body into readable plain text.
///
/// Script, style, and head blocks are dropped, block-level closers become
/// line breaks, remaining tags are removed, and common entities are decoded.
/// Unknown named entities are left as written.
pub fn html_to_text(html: &str) -> String {
    let visible = HIDDEN_BLOCK.replace_all(html, "");
    let broken = LINE_BREAK.replace_all(&visible, "\n");
    let stripped = TAG.replace_all(&broken, "");
    let decoded = ENTITY.replace_all(&stripped, |caps: &Captures| decode_entity(caps));

    let lines: Vec<&str> = decoded.lines().map(str::trim_end).collect();
    let joined = lines.join("\n");
    BLANK_RUN.replace_all(&joined, "\n\n").trim().to_string()
}

fn decode_entity(caps: &Captures) -> String {
    let original = caps.get(0).map_or("", |m| m.as_str()).to_string();

    if let Some(decimal) = caps.get(1) {
        return decimal
            .as_str()
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map_or(original, String::from);
    }

    if let Some(hex) = caps.get(2) {
        return u32::from_str_radix(hex.as_str(), 16)
            .ok()
            .and_then(char::from_u32)
            .map_or(original, String::from);
    }

    let named = match caps.get(3).map(|m| m.as_str()) {
        Some("amp") => "&",
        Some("lt") => "<",
        Some("gt") => ">",
        Some("quot") => "\"",
        Some("apos") => "'",
        Some("nbsp") => " ",
        _ => return original,
    };
    named.to_string()
}

//! Cleanup of generated advice text into a single line with inline links.

use regex::Regex;
use std::sync::LazyLock;

static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\*").unwrap());
static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*+").unwrap());
// Labels and URLs exclude angle brackets and quotes so already-emitted anchors never match again.
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[([^\]<>]+)\]\((https?://[^\s)"<>]+)\)"#).unwrap());
static BRACKET_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[(https?://[^\s\]"<>]+)\]"#).unwrap());
static NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());
static EMITTED_ANCHOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<a href="([^"]*)"[^>]*>([^<]*)</a>"#).unwrap());

const ANCHOR: &str = r#"<a href="$url" target="_blank" class="text-blue-600 underline">$label</a>"#;

/// Normalize raw generated text.
///
/// Steps run in a fixed order: bullets, emphasis, Markdown links, bracketed
/// URLs, newlines, whitespace runs. Link conversion has to see the original
/// line structure, and marker stripping has to happen before links are
/// emitted. The result is trimmed; `normalize("")` is `""`.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let text = BULLET.replace_all(raw, " •");
    let text = EMPHASIS.replace_all(&text, "");
    let text = MARKDOWN_LINK.replace_all(&text, ANCHOR.replace("$url", "$2").replace("$label", "$1"));
    let text = BRACKET_URL.replace_all(&text, ANCHOR.replace("$url", "$1").replace("$label", "$1"));
    let text = NEWLINES.replace_all(&text, " ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");

    text.trim().to_string()
}

/// Render emitted anchors as `label (url)` for plain-text output.
pub fn anchors_to_plain(text: &str) -> String {
    EMITTED_ANCHOR
        .replace_all(text, |c: &regex::Captures| {
            if c[1] == c[2] { c[1].to_string() } else { format!("{} ({})", &c[2], &c[1]) }
        })
        .into_owned()
}

/// First link suggested in raw text, as `(label, url)`.
pub fn first_link(raw: &str) -> Option<(String, String)> {
    let markdown = MARKDOWN_LINK
        .captures(raw)
        .map(|c| (c.get(0).map_or(0, |m| m.start()), c[1].trim().to_string(), c[2].to_string()));
    let bracket = BRACKET_URL
        .captures(raw)
        .map(|c| (c.get(0).map_or(0, |m| m.start()), c[1].to_string(), c[1].to_string()));

    match (markdown, bracket) {
        (Some(m), Some(b)) => Some(if m.0 <= b.0 { (m.1, m.2) } else { (b.1, b.2) }),
        (Some(m), None) => Some((m.1, m.2)),
        (None, Some(b)) => Some((b.1, b.2)),
        (None, None) => None,
    }
}

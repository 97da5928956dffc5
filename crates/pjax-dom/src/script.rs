//! Inline script policy

use regex::Regex;
use std::sync::LazyLock;

/// `document.write(` / `document.open(`, whitespace tolerant.
static DESTRUCTIVE_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"document\s*\.\s*(?:write|open)\s*\(").expect("destructive call pattern is valid")
});

/// An inline script that was inserted into the live document after a swap
/// and is due to run once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineScript {
    /// The `type` attribute, if the original script carried one
    pub script_type: Option<String>,
    pub text: String,
}

/// Very primitive check whether a script may erase the current document
/// when run after load (typically injected by development middleware).
pub fn destroys_document(source: &str) -> bool {
    DESTRUCTIVE_CALL.is_match(source)
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

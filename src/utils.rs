//! Text helpers: filenames, uptime labels, template substitution.
//!
//! Regexes use the `lazy-regex` crate for compile-time validation and
//! lazy initialization.

use lazy_regex::lazy_regex;
use std::time::Duration;

/// Match anything that is neither a word character nor whitespace
static RE_NON_WORD: lazy_regex::Lazy<regex::Regex> = lazy_regex!(r"[^\w\s]");

/// Derives a human-readable filename from a media title: non-word
/// characters stripped, the given extension appended.
#[must_use]
pub fn media_file_name(title: &str, extension: &str) -> String {
    let stripped = RE_NON_WORD.replace_all(title, "");
    let base = stripped.trim();
    if base.is_empty() {
        format!("download.{extension}")
    } else {
        format!("{base}.{extension}")
    }
}

/// Formats an uptime duration as `"{h}h {m}m"`.
#[must_use]
pub fn format_uptime(elapsed: Duration) -> String {
    let total_minutes = elapsed.as_secs() / 60;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// Substitutes `{placeholder}` markers in a message template.
#[must_use]
pub fn fill(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut output = template.to_owned();
    for (placeholder, value) in substitutions {
        output = output.replace(placeholder, value);
    }
    output
}

/// Escapes user-controlled text for interpolation into HTML replies.
#[must_use]
pub fn escape(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

//! Heading extraction and table-of-contents generation
//!
//! Headings are found line by line in the raw markdown text, so the result
//! reflects what the author typed rather than what a renderer would produce.
//! Anchors use the same GitHub-style slugs that the renderer assigns as
//! heading IDs, which keeps generated ToC links pointing at real targets.

use itertools::Itertools;

/// Default maximum heading depth included in a table of contents
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// A heading discovered in a markdown document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Number of leading `#` characters (1 = h1)
    pub level: usize,

    /// Heading text, trimmed, never empty
    pub text: String,

    /// Slug used as the in-page fragment target
    pub anchor: String,
}

/// Generate a GitHub-style anchor from heading text.
///
/// Lowercases the text, turns each run of whitespace into a single hyphen and
/// then drops everything outside `[a-z0-9-]`. Punctuation next to a space can
/// leave doubled or trailing hyphens; those are kept as-is.
///
/// Anchors are not de-duplicated: two headings with the same text share a slug.
///
/// # Examples
///
/// ```
/// use marknote::toc::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("What's new?"), "whats-new");
/// assert_eq!(slugify("A & B"), "a--b");
/// ```
pub fn slugify(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .split_whitespace()
        .join("-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Extract headings from markdown text up to `max_depth`.
///
/// Lines with more leading `#` characters than `max_depth` are skipped
/// entirely rather than clamped, as are headings whose text is empty after
/// trimming. Levels are reported as written; no hierarchy is enforced.
///
/// The heading text is kept as typed, including an optional closing run of
/// `#` (`## Usage ##`). The anchor is computed without that run, because the
/// renderer never sees it as part of the heading.
pub fn extract_headings(text: &str, max_depth: usize) -> Vec<Heading> {
    text.split(['\n', '\r'])
        .filter_map(|line| parse_heading_line(line, max_depth))
        .collect()
}

/// Parse a single line as an ATX heading
fn parse_heading_line(line: &str, max_depth: usize) -> Option<Heading> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > max_depth {
        return None;
    }

    // `#` is one byte, so `level` is also the byte offset of the remainder
    let rest = &line[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let text = rest.trim();
    if text.is_empty() {
        return None;
    }

    Some(Heading {
        level,
        text: text.to_string(),
        anchor: slugify(without_closing_sequence(text)),
    })
}

/// Heading text without an ATX closing sequence.
///
/// The closing `#` run only counts when it is preceded by whitespace, so
/// `C#` keeps its hash.
fn without_closing_sequence(text: &str) -> &str {
    let stripped = text.trim_end_matches('#');
    if stripped.len() == text.len() {
        return text;
    }
    if stripped.is_empty() || stripped.ends_with(char::is_whitespace) {
        stripped.trim_end()
    } else {
        text
    }
}

/// Format headings as a bulleted markdown table of contents.
///
/// Each heading becomes `- [text](#anchor)` indented by two spaces per level
/// below 1. Returns an empty string for an empty slice; callers should treat
/// that as "nothing to insert".
pub fn format_toc(headings: &[Heading]) -> String {
    headings
        .iter()
        .map(|h| {
            format!(
                "{}- [{}](#{})",
                "  ".repeat(h.level.saturating_sub(1)),
                h.text,
                h.anchor
            )
        })
        .join("\n")
}

/// Build a table of contents and splice it in front of the document.
///
/// # Returns
/// * `Some(String)` - The ToC, a blank line, then the original text
/// * `None` - The document has no headings within `max_depth`
pub fn insert_toc(text: &str, max_depth: usize) -> Option<String> {
    let headings = extract_headings(text, max_depth);
    if headings.is_empty() {
        return None;
    }

    log::debug!("Generated table of contents with {} entries", headings.len());
    Some(format!("{}\n\n{}", format_toc(&headings), text))
}

//! Wiki-link rewriting
//!
//! `[[Title]]` spans are turned into anchors pointing at the `wikilink://`
//! scheme before the markdown parser runs. The rewrite is purely syntactic;
//! whether a note called `Title` exists is only checked when the link is
//! followed (see [`crate::navigation`]).
//!
//! Spans inside fenced code blocks and inline code are left alone so that
//! documentation about the syntax renders literally.

use crate::fence::fenced_blocks;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

/// URI scheme carried by rewritten wiki-link anchors
pub const WIKILINK_SCHEME: &str = "wikilink://";

/// CSS class the link bridge script attaches click handlers to
pub const WIKILINK_CLASS: &str = "wikilink";

/// Characters escaped in the title part of a `wikilink://` URI
const TITLE_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn wikilink_regex() -> &'static Regex {
    static RE_WIKILINK: OnceLock<Regex> = OnceLock::new();
    RE_WIKILINK.get_or_init(|| Regex::new(r"\[\[([^\]\n]+)\]\]").unwrap())
}

/// Build the navigation URI for a page title
///
/// # Examples
///
/// ```
/// use marknote::wikilink::link_url;
///
/// assert_eq!(link_url("Project Plan"), "wikilink://Project%20Plan");
/// ```
pub fn link_url(title: &str) -> String {
    format!(
        "{}{}",
        WIKILINK_SCHEME,
        utf8_percent_encode(title, TITLE_ENCODE_SET)
    )
}

/// Recover the page title from a `wikilink://` URI.
///
/// Returns `None` for other schemes, for titles that are not valid UTF-8
/// once decoded, and for empty titles. A trailing slash added by some web
/// views is ignored.
pub fn title_from_url(url: &str) -> Option<String> {
    let encoded = url.strip_prefix(WIKILINK_SCHEME)?;
    let encoded = encoded.strip_suffix('/').unwrap_or(encoded);
    let title = percent_decode_str(encoded).decode_utf8().ok()?;
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Rewrite every `[[Title]]` span outside code into an inline anchor.
///
/// The interior is trimmed to form the title; the visible text keeps the
/// original bracketed form. Spans with a blank interior, unbalanced brackets
/// or a line break inside are not links and pass through unchanged.
pub fn rewrite_wikilinks(text: &str) -> String {
    let protected = code_regions(text);
    let mut output = String::with_capacity(text.len());
    let mut last = 0;
    let mut rewritten = 0usize;

    for caps in wikilink_regex().captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let span = whole.range();
        if protected.iter().any(|r| overlaps(r, &span)) {
            continue;
        }

        let title = inner.as_str().trim();
        if title.is_empty() {
            continue;
        }

        output.push_str(&text[last..span.start]);
        output.push_str(&anchor_markup(inner.as_str(), title));
        last = span.end;
        rewritten += 1;
    }
    output.push_str(&text[last..]);

    if rewritten > 0 {
        log::debug!("Rewrote {} wiki-link(s)", rewritten);
    }

    output
}

/// Inline anchor for a wiki-link.
///
/// ASCII punctuation in the visible text is written as numeric character
/// references so the markdown parser treats it as plain text.
fn anchor_markup(inner: &str, title: &str) -> String {
    let visible: String = format!("[[{}]]", inner)
        .chars()
        .map(|c| {
            if c.is_ascii_punctuation() {
                format!("&#{};", c as u32)
            } else {
                c.to_string()
            }
        })
        .collect();

    format!(
        "<a class=\"{}\" href=\"{}\">{}</a>",
        WIKILINK_CLASS,
        link_url(title),
        visible
    )
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Byte ranges covered by fenced code blocks and inline code spans.
///
/// Fences are found with [`fenced_blocks`]; an unclosed fence runs to the end
/// of the text. Between fences, a backtick run pairs with the next run of
/// exactly the same length in the same paragraph, since code spans never
/// cross a blank line.
///
/// This runs on the text after diagram extraction. Indented code blocks and
/// fences inside block quotes are not protected.
fn code_regions(text: &str) -> Vec<Range<usize>> {
    let mut regions = Vec::new();
    let mut prose_start = 0;

    for block in fenced_blocks(text) {
        inline_code_regions(text, prose_start..block.range.start, &mut regions);
        regions.push(block.range.clone());
        prose_start = block.range.end;
    }
    inline_code_regions(text, prose_start..text.len(), &mut regions);

    regions
}

/// Split prose at blank lines and collect the code spans of each paragraph
fn inline_code_regions(text: &str, range: Range<usize>, regions: &mut Vec<Range<usize>>) {
    let mut paragraph_start = range.start;
    let mut offset = range.start;

    for line in text[range.clone()].split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if line.trim().is_empty() {
            code_spans(text, paragraph_start..line_start, regions);
            paragraph_start = offset;
        }
    }
    code_spans(text, paragraph_start..range.end, regions);
}

fn code_spans(text: &str, range: Range<usize>, regions: &mut Vec<Range<usize>>) {
    let bytes = text.as_bytes();
    let mut i = range.start;

    while i < range.end {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let open_start = i;
        while i < range.end && bytes[i] == b'`' {
            i += 1;
        }
        let run = i - open_start;

        let mut j = i;
        let mut close_end = None;
        while j < range.end {
            if bytes[j] != b'`' {
                j += 1;
                continue;
            }
            let close_start = j;
            while j < range.end && bytes[j] == b'`' {
                j += 1;
            }
            if j - close_start == run {
                close_end = Some(j);
                break;
            }
        }

        if let Some(end) = close_end {
            regions.push(open_start..end);
            i = end;
        }
    }
}

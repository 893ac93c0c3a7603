//! Fenced code block scanning
//!
//! A line-oriented scanner for top-level fenced code blocks, shared by
//! diagram extraction and wiki-link protection. A fence opens with three or
//! more backticks or tildes indented by at most three spaces and closes on a
//! line of the same character at least as long. Everything between is
//! content, including lines that look like fences of another kind, so a
//! block nested inside a longer outer fence is never reported on its own.
//!
//! Fences inside block quotes, or indented four spaces or more (deep list
//! items), are not recognised.

use std::ops::Range;

/// A fenced code block located in markdown text
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FencedBlock<'a> {
    /// Start of the opening fence line to the end of the closing fence line,
    /// line break excluded. Runs to the end of the text when never closed.
    pub range: Range<usize>,

    /// Spaces in front of the opening fence
    pub indent: usize,

    /// Fence character, '`' or '~'
    pub marker: char,

    /// Info string after the opening fence, trimmed
    pub info: &'a str,

    /// The lines between the fences, line breaks included
    pub content: Range<usize>,

    pub closed: bool,
}

impl FencedBlock<'_> {
    /// Language named by the first word of the info string
    pub fn language(&self) -> Option<&str> {
        self.info.split_whitespace().next()
    }
}

struct FenceRun<'a> {
    indent: usize,
    marker: char,
    len: usize,
    rest: &'a str,
}

fn fence_run(line: &str) -> Option<FenceRun<'_>> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let body = &line[indent..];
    let marker = body.chars().next().filter(|c| *c == '`' || *c == '~')?;
    // both fence characters are one byte
    let len = body.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    Some(FenceRun {
        indent,
        marker,
        len,
        rest: &body[len..],
    })
}

fn opening_fence(line: &str) -> Option<FenceRun<'_>> {
    let run = fence_run(line)?;
    if run.marker == '`' && run.rest.contains('`') {
        return None;
    }
    Some(run)
}

fn closes_fence(line: &str, marker: char, len: usize) -> bool {
    matches!(
        fence_run(line),
        Some(run) if run.marker == marker && run.len >= len && run.rest.trim().is_empty()
    )
}

/// Find every top-level fenced code block in `text`, in document order
pub(crate) fn fenced_blocks(text: &str) -> Vec<FencedBlock<'_>> {
    let mut blocks = Vec::new();
    let mut open: Option<(FencedBlock<'_>, usize)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();

        match open.take() {
            Some((mut block, len)) => {
                if closes_fence(line, block.marker, len) {
                    block.content.end = line_start;
                    block.range.end = line_start + line.trim_end_matches(['\n', '\r']).len();
                    block.closed = true;
                    blocks.push(block);
                } else {
                    open = Some((block, len));
                }
            }
            None => {
                if let Some(run) = opening_fence(line) {
                    let block = FencedBlock {
                        range: line_start..text.len(),
                        indent: run.indent,
                        marker: run.marker,
                        info: run.rest.trim(),
                        content: offset..text.len(),
                        closed: false,
                    };
                    open = Some((block, run.len));
                }
            }
        }
    }

    if let Some((block, _)) = open {
        blocks.push(block);
    }

    blocks
}

//! Mermaid diagram block extraction
//!
//! Fenced blocks tagged `mermaid` are lifted out of the markdown before it is
//! parsed and replaced by an HTML comment placeholder. After conversion the
//! placeholders are swapped for `<div class="mermaid">` containers holding the
//! diagram source verbatim, where the client-side library picks them up.
//!
//! Only top-level backtick fences count (see [`crate::fence`]). A diagram
//! fence shown inside a longer outer fence stays part of that code block. A
//! fence that is opened but never closed is not a diagram either; it falls
//! through to the markdown parser and renders as an ordinary code block.

use crate::fence::{fenced_blocks, FencedBlock};

/// Info string that marks a fenced block as a diagram
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// CSS class the diagram library scans for
pub const DIAGRAM_CLASS: &str = "mermaid";

/// Markdown text with its diagram blocks lifted out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDiagrams {
    /// The input text with each diagram block replaced by a placeholder
    pub text: String,

    /// Raw diagram sources, indexed by placeholder number
    pub sources: Vec<String>,
}

impl ExtractedDiagrams {
    /// Whether any diagram block was found
    pub fn has_diagrams(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Replace every placeholder in converted HTML with its diagram container.
    ///
    /// Returns the HTML and the number of diagrams actually put back. A
    /// placeholder the markdown parser escaped as text is not restored.
    pub fn restore(&self, html: &str) -> (String, usize) {
        let mut output = html.to_string();
        let mut restored = 0;
        for (index, source) in self.sources.iter().enumerate() {
            let marker = placeholder(index);
            if output.contains(&marker) {
                output = output.replace(&marker, &container(source));
                restored += 1;
            } else {
                log::warn!("Diagram {} was not restored", index);
            }
        }
        (output, restored)
    }
}

fn is_diagram(block: &FencedBlock<'_>) -> bool {
    block.closed && block.marker == '`' && block.language() == Some(DIAGRAM_LANGUAGE)
}

/// Lift every closed ```` ```mermaid ```` block out of `text`.
///
/// The captured source excludes the opening and closing fence lines and the
/// line break in front of the closing fence. The fence's own indentation is
/// removed from each source line, as for any fenced code block, and kept in
/// front of the placeholder so a diagram inside a list item stays there.
/// Everything else is kept byte for byte.
pub fn extract_diagrams(text: &str) -> ExtractedDiagrams {
    let mut sources = Vec::new();
    let mut output = String::with_capacity(text.len());
    let mut last = 0;

    for block in fenced_blocks(text).iter().filter(|b| is_diagram(b)) {
        let start = block.range.start;
        output.push_str(&text[last..start + block.indent]);
        output.push_str(&placeholder(sources.len()));
        last = block.range.end;

        sources.push(dedent(&text[block.content.clone()], block.indent));
    }
    output.push_str(&text[last..]);

    if !sources.is_empty() {
        log::debug!("Extracted {} diagram block(s)", sources.len());
    }

    ExtractedDiagrams {
        text: output,
        sources,
    }
}

/// Drop up to `indent` leading spaces from each line and the final line break
fn dedent(content: &str, indent: usize) -> String {
    let mut source: String = content
        .split_inclusive('\n')
        .map(|line| {
            let spaces = line.len() - line.trim_start_matches(' ').len();
            &line[spaces.min(indent)..]
        })
        .collect();

    if source.ends_with('\n') {
        source.pop();
    }
    if source.ends_with('\r') {
        source.pop();
    }
    source
}

/// Placeholder comment standing in for diagram `index` during conversion
fn placeholder(index: usize) -> String {
    format!("<!--marknote-diagram-{}-->", index)
}

/// Container element for a diagram; the source is left unescaped
fn container(source: &str) -> String {
    format!("<div class=\"{}\">{}</div>", DIAGRAM_CLASS, source)
}

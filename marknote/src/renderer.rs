//! Markdown to HTML rendering for the preview pane
//!
//! Rendering runs in four stages:
//! 1. Mermaid blocks are lifted out of the text ([`crate::diagram`])
//! 2. `[[Title]]` spans become `wikilink://` anchors ([`crate::wikilink`])
//! 3. pulldown-cmark converts the rest, assigning slug IDs to headings
//! 4. The fragment is wrapped in a standalone document with the stylesheet,
//!    the diagram library (only when diagrams are present) and the link bridge
//!
//! Relative images and links are resolved by the web view through a `<base>`
//! element; URLs in the document are never rewritten.

use crate::diagram::extract_diagrams;
use crate::toc::slugify;
use crate::wikilink::rewrite_wikilinks;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// ES module build of the diagram library loaded when a document has diagrams
pub const DEFAULT_MERMAID_URL: &str =
    "https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.esm.min.mjs";

/// Characters escaped when turning a directory into a `file://` URL
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Errors that can occur when exporting a rendered document
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error writing {path}: {source}", path = .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("There is no content to export")]
    EmptyDocument,
}

/// Colour scheme of the rendered document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark text on a white page
    #[default]
    Light,
    /// Light text on the editor's dark background
    Dark,
}

impl Theme {
    fn stylesheet(self) -> &'static str {
        match self {
            Theme::Light => LIGHT_CSS,
            Theme::Dark => DARK_CSS,
        }
    }

    fn mermaid_theme(self) -> &'static str {
        match self {
            Theme::Light => "default",
            Theme::Dark => "dark",
        }
    }
}

/// Options controlling document assembly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Stylesheet to embed
    pub theme: Theme,

    /// Where the diagram library is imported from
    pub mermaid_url: String,

    /// Give every heading an `id` derived with [`slugify`]
    pub heading_ids: bool,

    /// Optional `<title>` for the document
    pub title: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            mermaid_url: DEFAULT_MERMAID_URL.to_string(),
            heading_ids: true,
            title: None,
        }
    }
}

/// A standalone HTML document ready for a web view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// Complete HTML document
    pub html: String,

    /// `file://` URL relative resources resolve against (empty if none)
    pub base_url: String,
}

/// Render markdown with the default options.
///
/// `base_path` is the directory relative image and link references resolve
/// against, normally the folder holding the note. It should be absolute.
pub fn render_to_html(text: &str, base_path: &Path) -> RenderedDocument {
    render_with_options(text, base_path, &RenderOptions::default())
}

/// Render markdown into a standalone HTML document.
///
/// Never fails: syntax that does not match passes through to the markdown
/// parser as literal text. Identical inputs produce byte-identical output.
pub fn render_with_options(
    text: &str,
    base_path: &Path,
    options: &RenderOptions,
) -> RenderedDocument {
    let diagrams = extract_diagrams(text);
    let linked = rewrite_wikilinks(&diagrams.text);
    let (fragment, diagram_count) =
        diagrams.restore(&markdown_to_html(&linked, options.heading_ids));

    let base_url = base_url_for(base_path);

    let mut output = String::with_capacity(fragment.len() + LIGHT_CSS.len() + 2048);
    write_html_header(&mut output, &base_url, options, diagram_count > 0);
    output.push_str("<body>\n");
    output.push_str(&fragment);
    output.push_str("</body>\n");
    output.push_str("</html>\n");

    log::debug!(
        "Rendered {} bytes of markdown into {} bytes of HTML ({} diagram(s))",
        text.len(),
        output.len(),
        diagram_count
    );

    RenderedDocument {
        html: output,
        base_url,
    }
}

/// Convert markdown to an HTML fragment.
///
/// Tables, footnotes, strikethrough, task lists, definition lists and
/// heading attributes are enabled. Raw HTML passes through untouched.
pub fn markdown_to_html(text: &str, heading_ids: bool) -> String {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_DEFINITION_LIST
        | Options::ENABLE_HEADING_ATTRIBUTES;

    let mut events: Vec<Event<'_>> = Parser::new_ext(text, options).collect();
    if heading_ids {
        assign_heading_ids(&mut events);
    }

    let mut output = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut output, events.into_iter());
    output
}

/// Set `id` on headings that do not carry an explicit one.
///
/// The slug is computed from the heading's text content, so it matches the
/// anchors produced by [`crate::toc::extract_headings`]. Duplicate headings
/// receive duplicate IDs.
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut i = 0;
    while i < events.len() {
        if !matches!(events[i], Event::Start(Tag::Heading { id: None, .. })) {
            i += 1;
            continue;
        }

        let mut text = String::new();
        let mut end = i + 1;
        while end < events.len() {
            match &events[end] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
            end += 1;
        }

        let slug = slugify(&text);
        if !slug.is_empty() {
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
                *id = Some(CowStr::from(slug));
            }
        }

        i = end + 1;
    }
}

/// Turn a directory into the `file://` URL used as the document base.
///
/// The result always ends in `/` so relative references land inside the
/// directory. An empty path yields an empty string.
pub fn base_url_for(dir: &Path) -> String {
    let mut path = dir.to_string_lossy().replace('\\', "/");
    if path.is_empty() {
        return String::new();
    }
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if !path.ends_with('/') {
        path.push('/');
    }
    format!("file://{}", utf8_percent_encode(&path, PATH_ENCODE_SET))
}

/// Write the `<head>` section with styles and scripts
fn write_html_header(
    output: &mut String,
    base_url: &str,
    options: &RenderOptions,
    has_diagrams: bool,
) {
    output.push_str("<!DOCTYPE html>\n");
    output.push_str("<html lang=\"en\">\n");
    output.push_str("<head>\n");
    output.push_str("<meta charset=\"UTF-8\">\n");
    if !base_url.is_empty() {
        output.push_str(&format!("<base href=\"{}\">\n", escape_html(base_url)));
    }
    if let Some(ref title) = options.title {
        output.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    }
    output.push_str("<style>\n");
    output.push_str(options.theme.stylesheet());
    output.push_str("</style>\n");

    if has_diagrams {
        output.push_str("<script type=\"module\">\n");
        output.push_str(&format!(
            "import mermaid from '{}';\n",
            escape_js_string(&options.mermaid_url)
        ));
        output.push_str(&format!(
            "mermaid.initialize({{ startOnLoad: false, theme: '{}' }});\n",
            options.theme.mermaid_theme()
        ));
        output.push_str(
            "window.addEventListener('load', () => mermaid.run({ querySelector: '.mermaid' }));\n",
        );
        output.push_str("</script>\n");
    }

    output.push_str("<script>\n");
    output.push_str(BRIDGE_SCRIPT);
    output.push_str("</script>\n");
    output.push_str("</head>\n");
}

/// Render and write a standalone HTML file
///
/// # Parameters
/// * `text` - Markdown source
/// * `base_path` - Directory relative resources resolve against
/// * `output_path` - Destination file; parent directories are created
/// * `options` - Render options
///
/// # Returns
/// * `Ok(())` - Successfully exported
/// * `Err(RenderError)` - Empty document or write failure
pub fn export_html(
    text: &str,
    base_path: &Path,
    output_path: &Path,
    options: &RenderOptions,
) -> Result<(), RenderError> {
    if text.trim().is_empty() {
        return Err(RenderError::EmptyDocument);
    }
    let rendered = render_with_options(text, base_path, options);
    write_output(output_path, &rendered.html)
}

/// Write the raw markdown as plain text
pub fn export_text(text: &str, output_path: &Path) -> Result<(), RenderError> {
    if text.trim().is_empty() {
        return Err(RenderError::EmptyDocument);
    }
    write_output(output_path, text)
}

fn write_output(output_path: &Path, content: &str) -> Result<(), RenderError> {
    let io_err = |source| RenderError::IoError {
        path: output_path.to_path_buf(),
        source,
    };

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(output_path, content).map_err(io_err)?;

    log::info!("Wrote {}", output_path.display());
    Ok(())
}

/// Escape HTML special characters
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn escape_js_string(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('<', "\\x3c")
}

/// Forwards wiki-link clicks to the host.
///
/// The host exposes an object with `openWikiLink(title)` either as
/// `window.marknoteHost` before load or by calling `window.marknoteConnect`
/// once its channel is up. The raw `href` attribute is read because web
/// views may normalise the host part of a parsed URL.
const BRIDGE_SCRIPT: &str = r#"(function () {
  var SCHEME = "wikilink://";
  var attached = false;
  function attach(host) {
    if (attached) { return; }
    attached = true;
    document.querySelectorAll("a.wikilink").forEach(function (link) {
      link.addEventListener("click", function (event) {
        event.preventDefault();
        var href = link.getAttribute("href") || "";
        host.openWikiLink(decodeURIComponent(href.slice(SCHEME.length)));
      });
    });
  }
  window.marknoteConnect = function (host) {
    window.marknoteHost = host;
    if (document.readyState !== "loading") { attach(host); }
  };
  document.addEventListener("DOMContentLoaded", function () {
    if (window.marknoteHost && typeof window.marknoteHost.openWikiLink === "function") {
      attach(window.marknoteHost);
    }
  });
})();
"#;

const LIGHT_CSS: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', sans-serif;
    line-height: 1.6;
    color: #111;
    background: #fff;
    margin: 0 auto;
    max-width: 900px;
    padding: 20px;
}

pre {
    background-color: #f0f0f0;
    padding: 10px;
    border-radius: 5px;
    overflow-x: auto;
}

code {
    font-family: "Fira Mono", 'Consolas', monospace;
}

blockquote {
    border-left: 4px solid #ddd;
    padding-left: 16px;
    color: #666;
}

table {
    border-collapse: collapse;
    margin-bottom: 20px;
}

th, td {
    padding: 6px 12px;
    border: 1px solid #d0d7de;
}

img {
    max-width: 100%;
}

a {
    color: #0366d6;
}

a.wikilink {
    color: #6f42c1;
    text-decoration: none;
    border-bottom: 1px dashed #6f42c1;
}

.mermaid {
    text-align: center;
    margin: 16px 0;
}
"#;

const DARK_CSS: &str = r#"
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', sans-serif;
    line-height: 1.6;
    color: #d7dae0;
    background: #21252b;
    margin: 0 auto;
    max-width: 900px;
    padding: 20px;
}

pre {
    background-color: #2c313a;
    padding: 10px;
    border-radius: 5px;
    overflow-x: auto;
}

code {
    font-family: "Fira Mono", 'Consolas', monospace;
}

blockquote {
    border-left: 4px solid #3e4451;
    padding-left: 16px;
    color: #9da5b4;
}

table {
    border-collapse: collapse;
    margin-bottom: 20px;
}

th, td {
    padding: 6px 12px;
    border: 1px solid #3e4451;
}

img {
    max-width: 100%;
}

a {
    color: #61afef;
}

a.wikilink {
    color: #c678dd;
    text-decoration: none;
    border-bottom: 1px dashed #c678dd;
}

.mermaid {
    text-align: center;
    margin: 16px 0;
    background: #fff;
    border-radius: 5px;
}
"#;

//! marknote - Markdown notes with live preview
//!
//! The rendering core is pure and synchronous: [`toc`] extracts headings and
//! formats tables of contents, [`renderer`] turns a note into a standalone
//! HTML document with Mermaid diagrams ([`diagram`]) and `[[Title]]`
//! cross-references ([`wikilink`]). The remaining modules are the file-system
//! side of a note library: resolving and creating notes ([`library`],
//! [`navigation`]), the recent-files list ([`recent`]) and settings
//! ([`config`]).

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod diagram;
mod fence;
pub mod library;
pub mod navigation;
pub mod recent;
pub mod renderer;
pub mod toc;
pub mod wikilink;

pub use renderer::{render_to_html, RenderOptions, RenderedDocument};
pub use toc::{extract_headings, format_toc, slugify, Heading};

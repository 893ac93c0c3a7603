//! Following wiki-links
//!
//! The rendered preview only reports the clicked page title. Resolving that
//! title to a note, and offering to create a missing one, happens here.

use crate::library::{self, LibraryError};
use crate::wikilink::title_from_url;
use std::path::{Path, PathBuf};

/// Asks the user whether a missing note should be created
pub trait CreatePrompt {
    /// Return `true` to create a note called `title`
    fn confirm_create(&self, title: &str) -> bool;
}

impl<F> CreatePrompt for F
where
    F: Fn(&str) -> bool,
{
    fn confirm_create(&self, title: &str) -> bool {
        self(title)
    }
}

/// Result of following a single wiki-link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// An existing note matched the title
    Open(PathBuf),
    /// No note matched; the user agreed and a new one was created
    Created(PathBuf),
    /// No note matched and the user declined; nothing changed
    Declined,
}

impl LinkOutcome {
    /// The note to make active, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            LinkOutcome::Open(path) | LinkOutcome::Created(path) => Some(path),
            LinkOutcome::Declined => None,
        }
    }
}

/// Resolve a clicked wiki-link title under `root`.
///
/// A missing note is only created after `prompt` confirms. New notes are
/// placed directly in `root` and start with `# {title}`.
pub fn follow_link(
    root: &Path,
    title: &str,
    prompt: &impl CreatePrompt,
) -> Result<LinkOutcome, LibraryError> {
    if let Some(path) = library::find_note(root, title)? {
        return Ok(LinkOutcome::Open(path));
    }

    if !prompt.confirm_create(title) {
        log::info!("Declined to create note '{}'", title);
        return Ok(LinkOutcome::Declined);
    }

    library::create_note(root, title).map(LinkOutcome::Created)
}

/// Follow a `wikilink://` URL.
///
/// Returns `Ok(None)` when the URL uses another scheme, so the host can
/// handle it as an ordinary link.
pub fn follow_url(
    root: &Path,
    url: &str,
    prompt: &impl CreatePrompt,
) -> Result<Option<LinkOutcome>, LibraryError> {
    match title_from_url(url) {
        Some(title) => follow_link(root, &title, prompt).map(Some),
        None => Ok(None),
    }
}

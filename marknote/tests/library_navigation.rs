use marknote::library::{self, EntryKind, LibraryEntry};
use marknote::navigation::{follow_link, follow_url, LinkOutcome};
use marknote::wikilink::link_url;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn names(entry: &LibraryEntry) -> Vec<&str> {
    entry.children.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn test_find_note_is_exact_and_case_sensitive() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    write(&temp.path().join("work/Project Plan.md"), "# Project Plan\n");
    write(&temp.path().join("Project Plan.txt"), "not a note");
    write(&temp.path().join("Project Plan Draft.md"), "# Draft\n");

    assert_eq!(
        library::find_note(temp.path(), "Project Plan")?,
        Some(temp.path().join("work/Project Plan.md"))
    );
    assert_eq!(library::find_note(temp.path(), "project plan")?, None);
    assert_eq!(library::find_note(temp.path(), "Project")?, None);
    Ok(())
}

#[test]
fn test_follow_url_opens_existing_note() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    write(&temp.path().join("Café Notes.md"), "# Café Notes\n");

    let outcome = follow_url(temp.path(), &link_url("Café Notes"), &|_: &str| false)?;
    assert_eq!(
        outcome,
        Some(LinkOutcome::Open(temp.path().join("Café Notes.md")))
    );
    Ok(())
}

#[test]
fn test_missing_note_created_once() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    let first = follow_link(temp.path(), "Ideas", &|_: &str| true)?;
    assert_eq!(first, LinkOutcome::Created(temp.path().join("Ideas.md")));
    assert_eq!(fs::read_to_string(temp.path().join("Ideas.md"))?, "# Ideas\n");

    // The second click finds the note that was just created
    let never_asked = |_: &str| -> bool { panic!("should not prompt") };
    let second = follow_link(temp.path(), "Ideas", &never_asked)?;
    assert_eq!(second, LinkOutcome::Open(temp.path().join("Ideas.md")));
    Ok(())
}

#[test]
fn test_create_note_never_overwrites() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    write(&temp.path().join("Journal.md"), "existing");

    let path = library::create_note(temp.path(), "Journal")?;
    assert_eq!(path, temp.path().join("Journal_1.md"));
    assert_eq!(fs::read_to_string(temp.path().join("Journal.md"))?, "existing");
    Ok(())
}

#[test]
fn test_create_note_rejects_bad_titles() {
    let temp = TempDir::new().unwrap();
    assert!(library::create_note(temp.path(), "  ").is_err());
    assert!(library::create_note(temp.path(), "../escape").is_err());
}

#[test]
fn test_library_tree_order_and_filter() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    write(&temp.path().join("zeta.md"), "");
    write(&temp.path().join("Alpha.md"), "");
    write(&temp.path().join("notes.txt"), "");
    write(&temp.path().join("b_dir/beta.md"), "");
    write(&temp.path().join("A_dir/alpine.md"), "");
    write(&temp.path().join("A_dir/other.md"), "");

    let tree = library::library_tree(temp.path(), "")?;
    assert_eq!(tree.kind, EntryKind::Folder);
    assert_eq!(
        names(&tree),
        vec!["A_dir", "b_dir", "Alpha.md", "notes.txt", "zeta.md"]
    );
    assert_eq!(names(&tree.children[0]), vec!["alpine.md", "other.md"]);
    assert_eq!(tree.file_count(), 6);

    let filtered = library::library_tree(temp.path(), "ALP")?;
    assert_eq!(names(&filtered), vec!["A_dir", "b_dir", "Alpha.md"]);
    assert_eq!(names(&filtered.children[0]), vec!["alpine.md"]);
    assert!(filtered.children[1].children.is_empty());
    Ok(())
}

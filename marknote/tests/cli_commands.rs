use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

#[test]
fn toc_prints_nested_list() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let note = temp.path().join("note.md");
    fs::write(&note, "# A\n## B\n#### Too deep\n")?;

    cli(&temp)
        .args(["toc", note.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("- [A](#a)\n  - [B](#b)\n"));
    Ok(())
}

#[test]
fn toc_insert_without_headings_leaves_note_alone() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let note = temp.path().join("plain.md");
    fs::write(&note, "just text\n")?;

    cli(&temp)
        .args(["toc", "--insert", note.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("nothing to insert"));

    assert_eq!(fs::read_to_string(&note)?, "just text\n");
    Ok(())
}

#[test]
fn toc_insert_splices_at_top() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let note = temp.path().join("doc.md");
    fs::write(&note, "# Doc\n\nbody\n")?;

    cli(&temp)
        .args(["toc", "--insert", note.to_str().unwrap()])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(&note)?,
        "- [Doc](#doc)\n\n# Doc\n\nbody\n"
    );
    Ok(())
}

#[test]
fn render_writes_html_and_records_recent() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let note = temp.path().join("index.md");
    let out = temp.path().join("out/index.html");
    fs::create_dir_all(temp.path().join("out"))?;
    fs::write(&note, "# Home\n\nSee [[Project Plan]].\n")?;

    cli(&temp)
        .args([
            "render",
            note.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--theme",
            "dark",
        ])
        .assert()
        .success()
        .stdout(contains("Successfully wrote"));

    let html = fs::read_to_string(&out)?;
    assert!(html.contains("href=\"wikilink://Project%20Plan\""));
    assert!(html.contains("<h1 id=\"home\">"));
    assert!(html.contains("<title>index</title>"));

    let config = fs::read_to_string(temp.path().join("marknote.toml"))?;
    assert!(config.contains("index.md"));
    Ok(())
}

#[test]
fn link_with_yes_creates_missing_note() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let root = temp.path().join("notes");
    fs::create_dir_all(&root)?;

    cli(&temp)
        .args(["link", "Weekly Review", "--yes", "--root", root.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Created"));

    assert_eq!(
        fs::read_to_string(root.join("Weekly Review.md"))?,
        "# Weekly Review\n"
    );
    Ok(())
}

#[test]
fn link_declined_on_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let root = temp.path().join("notes");
    fs::create_dir_all(&root)?;

    cli(&temp)
        .args(["link", "Someday", "--root", root.to_str().unwrap()])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("No note created"));

    assert!(!root.join("Someday.md").exists());
    Ok(())
}

#[test]
fn export_rejects_unknown_extension() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let note = temp.path().join("note.md");
    fs::write(&note, "# Note\n")?;

    cli(&temp)
        .args([
            "export",
            note.to_str().unwrap(),
            "--output",
            temp.path().join("note.pdf").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("Unknown export format"));
    Ok(())
}

#[test]
fn export_refuses_empty_note() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let note = temp.path().join("empty.md");
    fs::write(&note, "  \n")?;

    cli(&temp)
        .args([
            "export",
            note.to_str().unwrap(),
            "--output",
            temp.path().join("empty.html").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(contains("no content to export"));
    Ok(())
}

#[test]
fn new_folder_creates_starter_note() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let root = temp.path().join("notes");

    cli(&temp)
        .args(["new", "Projects", "--folder", "--dir", root.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Created folder"));

    assert_eq!(
        fs::read_to_string(root.join("Projects/untitled.md"))?,
        "# Projects\n"
    );
    Ok(())
}

#[test]
fn rename_keeps_extension_and_recent_list() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let note = temp.path().join("Draft.md");
    fs::write(&note, "# Draft\n")?;

    cli(&temp).args(["toc", note.to_str().unwrap()]).assert().success();

    cli(&temp)
        .args(["rename", note.to_str().unwrap(), "Final"])
        .assert()
        .success()
        .stdout(contains("Renamed"));

    assert!(!note.exists());
    assert!(temp.path().join("Final.md").exists());

    let config = fs::read_to_string(temp.path().join("marknote.toml"))?;
    assert!(config.contains("Final.md"));
    assert!(!config.contains("Draft.md"));
    Ok(())
}

#[test]
fn delete_asks_first() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let note = temp.path().join("old.md");
    fs::write(&note, "")?;

    cli(&temp)
        .args(["delete", note.to_str().unwrap()])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Nothing deleted"));
    assert!(note.exists());

    cli(&temp)
        .args(["delete", note.to_str().unwrap(), "--yes"])
        .assert()
        .success()
        .stdout(contains("Deleted"));
    assert!(!note.exists());
    Ok(())
}

#[test]
fn delete_refuses_non_empty_folder() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let folder = temp.path().join("full");
    fs::create_dir_all(&folder)?;
    fs::write(folder.join("keep.md"), "")?;

    cli(&temp)
        .args(["delete", folder.to_str().unwrap(), "--yes"])
        .assert()
        .failure()
        .stderr(contains("not empty"));
    assert!(folder.join("keep.md").exists());
    Ok(())
}

fn cli(temp: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_marknote"));
    cmd.arg("--config")
        .arg(temp.path().join("marknote.toml"))
        .env_remove("RUST_LOG");
    cmd
}

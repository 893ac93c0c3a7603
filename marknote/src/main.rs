//! marknote - Markdown note tool
//!
//! Command-line host for the marknote library: renders previews, maintains
//! tables of contents and follows wiki-links between notes.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use marknote::config::AppConfig;
use marknote::library::{self, EntryKind, LibraryEntry};
use marknote::navigation::{self, CreatePrompt, LinkOutcome};
use marknote::renderer::{self, Theme};
use marknote::toc;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Main entry point for the marknote CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Info);
    }
    logger.init();

    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);
    let mut config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let opened = match cli.command {
        Commands::Render {
            file,
            output,
            theme,
            no_heading_ids,
        } => handle_render_command(&config, &file, output, theme, no_heading_ids)?,

        Commands::Toc {
            file,
            depth,
            insert,
        } => handle_toc_command(&config, &file, depth, insert)?,

        Commands::Link { title, root, yes } => {
            let root = root.unwrap_or_else(|| config.library_root());
            handle_link_command(&root, &title, yes)?
        }

        Commands::New { title, dir, folder } => {
            let dir = dir.unwrap_or_else(|| config.library_root());
            handle_new_command(&dir, &title, folder)?
        }

        Commands::Rename { path, new_name } => {
            handle_rename_command(&mut config, &config_path, &path, &new_name)?;
            None
        }

        Commands::Delete { path, yes } => {
            handle_delete_command(&path, yes)?;
            None
        }

        Commands::Library { root, filter } => {
            let root = root.unwrap_or_else(|| config.library_root());
            let tree = library::library_tree(&root, &filter)
                .with_context(|| format!("Failed to read library at {}", root.display()))?;
            print_library_entry(&tree, 0);
            println!("\n{} note(s)", tree.file_count());
            None
        }

        Commands::Recent => {
            handle_recent_command(&mut config, &config_path)?;
            None
        }

        Commands::Export { file, output } => {
            handle_export_command(&config, &file, &output)?;
            None
        }
    };

    if let Some(path) = opened {
        config.record_opened(&path);
        config
            .save(&config_path)
            .with_context(|| format!("Failed to save config to {}", config_path.display()))?;
    }

    Ok(())
}

/// Read a note and work out the directory its relative links resolve against
fn read_note(file: &Path) -> Result<(String, PathBuf)> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let absolute = file
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", file.display()))?;
    let base = absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok((text, base))
}

/// Handle the render command
fn handle_render_command(
    config: &AppConfig,
    file: &Path,
    output: Option<PathBuf>,
    theme: Option<Theme>,
    no_heading_ids: bool,
) -> Result<Option<PathBuf>> {
    let (text, base) = read_note(file)?;

    let mut options = config.render_options();
    if let Some(theme) = theme {
        options.theme = theme;
    }
    if no_heading_ids {
        options.heading_ids = false;
    }
    options.title = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned());

    let rendered = renderer::render_with_options(&text, &base, &options);
    log::info!("Base URL: {}", rendered.base_url);

    match output {
        Some(path) => {
            std::fs::write(&path, &rendered.html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Successfully wrote: {}", path.display());
        }
        None => print!("{}", rendered.html),
    }

    Ok(Some(file.to_path_buf()))
}

/// Handle the toc command
fn handle_toc_command(
    config: &AppConfig,
    file: &Path,
    depth: Option<usize>,
    insert: bool,
) -> Result<Option<PathBuf>> {
    let (text, _) = read_note(file)?;
    let depth = depth.unwrap_or(config.toc_depth);

    if !insert {
        let toc = toc::format_toc(&toc::extract_headings(&text, depth));
        if toc.is_empty() {
            println!("No headings found (max depth {})", depth);
        } else {
            println!("{}", toc);
        }
        return Ok(Some(file.to_path_buf()));
    }

    match toc::insert_toc(&text, depth) {
        Some(updated) => {
            std::fs::write(file, updated)
                .with_context(|| format!("Failed to write {}", file.display()))?;
            println!("✓ Inserted table of contents into {}", file.display());
        }
        None => println!("No headings found (max depth {}); nothing to insert", depth),
    }

    Ok(Some(file.to_path_buf()))
}

/// Ask a yes/no question on the terminal; anything but y/yes means no
fn confirm(question: &str) -> bool {
    print!("{} [y/N] ", question);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks on the terminal before creating a missing note
struct TerminalPrompt;

impl CreatePrompt for TerminalPrompt {
    fn confirm_create(&self, title: &str) -> bool {
        confirm(&format!("Note '{}' does not exist. Create it?", title))
    }
}

/// Handle the new command
fn handle_new_command(dir: &Path, title: &str, folder: bool) -> Result<Option<PathBuf>> {
    if folder {
        let path = library::create_folder(dir, title)
            .with_context(|| format!("Failed to create folder '{}'", title))?;
        println!("✓ Created folder {}", path.display());
        return Ok(None);
    }

    let path = library::create_note(dir, title)
        .with_context(|| format!("Failed to create note '{}'", title))?;
    println!("✓ Created {}", path.display());
    Ok(Some(path))
}

/// Handle the rename command, keeping the recent-files list pointed at the note
fn handle_rename_command(
    config: &mut AppConfig,
    config_path: &Path,
    path: &Path,
    new_name: &str,
) -> Result<()> {
    let old = path.canonicalize().ok();
    let renamed = library::rename_entry(path, new_name)
        .with_context(|| format!("Failed to rename {}", path.display()))?;
    println!("✓ Renamed {} -> {}", path.display(), renamed.display());

    if let (Some(old), Ok(new)) = (old, renamed.canonicalize()) {
        if config.rename_recent(&old, &new) {
            config
                .save(config_path)
                .with_context(|| format!("Failed to save config to {}", config_path.display()))?;
        }
    }
    Ok(())
}

/// Handle the delete command
fn handle_delete_command(path: &Path, yes: bool) -> Result<()> {
    let question = format!("Permanently delete {}?", path.display());
    if !yes && !confirm(&question) {
        println!("Nothing deleted");
        return Ok(());
    }

    library::delete_entry(path)
        .with_context(|| format!("Failed to delete {}", path.display()))?;
    println!("✓ Deleted {}", path.display());
    Ok(())
}

/// Handle the link command
fn handle_link_command(root: &Path, title: &str, yes: bool) -> Result<Option<PathBuf>> {
    let outcome = if yes {
        navigation::follow_link(root, title, &|_: &str| true)
    } else {
        navigation::follow_link(root, title, &TerminalPrompt)
    }
    .with_context(|| format!("Failed to follow link [[{}]]", title))?;

    match &outcome {
        LinkOutcome::Open(path) => println!("{}", path.display()),
        LinkOutcome::Created(path) => println!("✓ Created {}", path.display()),
        LinkOutcome::Declined => println!("No note created"),
    }

    Ok(outcome.path().map(Path::to_path_buf))
}

/// Handle the recent command
fn handle_recent_command(config: &mut AppConfig, config_path: &Path) -> Result<()> {
    let mut recent = config.recent();
    if recent.prune_missing() > 0 {
        config.recent_files = recent.clone().into_vec();
        config
            .save(config_path)
            .with_context(|| format!("Failed to save config to {}", config_path.display()))?;
    }

    if recent.is_empty() {
        println!("No recent files");
    }
    for (i, path) in recent.files().iter().enumerate() {
        println!("{:>2}. {}", i + 1, path.display());
    }
    Ok(())
}

/// Handle the export command
fn handle_export_command(config: &AppConfig, file: &Path, output: &Path) -> Result<()> {
    let (text, base) = read_note(file)?;

    match output.extension().and_then(|s| s.to_str()) {
        Some("html") | Some("htm") => {
            let mut options = config.render_options();
            options.title = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned());
            renderer::export_html(&text, &base, output, &options)
                .with_context(|| format!("Failed to export HTML to {}", output.display()))?;
        }
        Some("txt") => {
            renderer::export_text(&text, output)
                .with_context(|| format!("Failed to export text to {}", output.display()))?;
        }
        Some(ext) => {
            anyhow::bail!(
                "Unknown export format for extension '.{}'. Supported: .html, .txt",
                ext
            );
        }
        None => anyhow::bail!("Output file needs an extension (.html or .txt)"),
    }

    println!("✓ Successfully wrote: {}", output.display());
    Ok(())
}

/// Print a library entry and its children as an indented tree
fn print_library_entry(entry: &LibraryEntry, depth: usize) {
    let marker = match entry.kind {
        EntryKind::Folder => "/",
        EntryKind::File => "",
    };
    println!("{}{}{}", "  ".repeat(depth), entry.name, marker);
    for child in &entry.children {
        print_library_entry(child, depth + 1);
    }
}

//! Command-line interface definitions for marknote

use clap::{Parser, Subcommand};
use marknote::renderer::Theme;
use std::path::PathBuf;

/// CLI structure for the marknote application
#[derive(Parser)]
#[command(name = "marknote")]
#[command(version)]
#[command(about = "Markdown notes with previews, tables of contents and wiki-links", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $MARKNOTE_CONFIG or ./marknote.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for marknote
#[derive(Subcommand)]
pub enum Commands {
    /// Render a note to a standalone HTML preview
    Render {
        /// Markdown note to render
        file: PathBuf,

        /// Write the HTML here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Colour scheme (overrides the config)
        #[arg(long, value_enum)]
        theme: Option<Theme>,

        /// Do not add slug IDs to headings
        #[arg(long)]
        no_heading_ids: bool,
    },

    /// Print or insert a table of contents
    Toc {
        /// Markdown note to scan
        file: PathBuf,

        /// Deepest heading level to include (overrides the config)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Insert the table of contents at the top of the note
        #[arg(short, long)]
        insert: bool,
    },

    /// Follow a wiki-link by page title
    Link {
        /// Page title as written between [[ and ]]
        title: String,

        /// Library root (defaults to the configured folder)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Create a missing note without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Create a new note, or a folder with --folder
    New {
        /// Note title, also used as the file name
        title: String,

        /// Folder to create the note in (defaults to the configured folder)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Create a folder named TITLE holding an untitled note
        #[arg(long)]
        folder: bool,
    },

    /// Rename a note or folder in place
    Rename {
        /// Note or folder to rename
        path: PathBuf,

        /// New name; notes keep their .md extension
        new_name: String,
    },

    /// Delete a note or an empty folder
    Delete {
        /// Note or folder to delete
        path: PathBuf,

        /// Delete without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the note library as a tree
    Library {
        /// Library root (defaults to the configured folder)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Only list files whose name contains this text
        #[arg(short, long, default_value = "")]
        filter: String,
    },

    /// List recently opened notes
    Recent,

    /// Export a note as HTML or plain text
    Export {
        /// Markdown note to export
        file: PathBuf,

        /// Output file; the format follows the extension (.html or .txt)
        #[arg(short, long)]
        output: PathBuf,
    },
}

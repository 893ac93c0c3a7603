//! Application configuration from marknote.toml

use crate::recent::RecentFiles;
use crate::renderer::{RenderOptions, Theme, DEFAULT_MERMAID_URL};
use crate::toc::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the configuration file
pub const CONFIG_FILE_NAME: &str = "marknote.toml";

/// Environment variable overriding the configuration file location
pub const CONFIG_ENV_VAR: &str = "MARKNOTE_CONFIG";

/// Persistent application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root folder of the note library
    pub default_folder: Option<PathBuf>,

    /// Note that was open when the application last ran
    pub last_note: Option<PathBuf>,

    /// Deepest heading level included in generated tables of contents
    pub toc_depth: usize,

    /// Preview colour scheme
    pub theme: Theme,

    /// Location of the diagram library
    pub mermaid_url: String,

    /// Whether rendered headings get slug IDs
    pub heading_ids: bool,

    /// Recently opened notes, newest first
    pub recent_files: Vec<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_folder: None,
            last_note: None,
            toc_depth: DEFAULT_MAX_DEPTH,
            theme: Theme::default(),
            mermaid_url: DEFAULT_MERMAID_URL.to_string(),
            heading_ids: true,
            recent_files: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Location of the configuration file: `$MARKNOTE_CONFIG`, else `./marknote.toml`
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Load configuration from a TOML file
    ///
    /// # Parameters
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - Loaded configuration, or the defaults if the file does not exist
    /// * `Err(ConfigError)` - Error reading or parsing an existing file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        let io_err = |source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, content).map_err(io_err)?;

        Ok(())
    }

    /// Render options derived from these settings
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            theme: self.theme,
            mermaid_url: self.mermaid_url.clone(),
            heading_ids: self.heading_ids,
            title: None,
        }
    }

    /// Folder the library lives in (`default_folder`, else the current directory)
    pub fn library_root(&self) -> PathBuf {
        self.default_folder
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn recent(&self) -> RecentFiles {
        RecentFiles::new(self.recent_files.clone())
    }

    /// Remember `path` as the last note and move it to the front of the recent list
    pub fn record_opened(&mut self, path: &Path) {
        let mut recent = self.recent();
        recent.add(path);
        self.last_note = recent.files().first().cloned();
        self.recent_files = recent.into_vec();
    }

    /// Point remembered notes at `old`, or below it, to `new` after a rename.
    ///
    /// Returns whether anything changed.
    pub fn rename_recent(&mut self, old: &Path, new: &Path) -> bool {
        let mut changed = false;
        for path in self.recent_files.iter_mut().chain(self.last_note.iter_mut()) {
            if let Ok(rest) = path.strip_prefix(old) {
                *path = if rest.as_os_str().is_empty() {
                    new.to_path_buf()
                } else {
                    new.join(rest)
                };
                changed = true;
            }
        }
        changed
    }
}

/// Errors that can occur when loading or saving the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error for {path}: {source}", path = .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

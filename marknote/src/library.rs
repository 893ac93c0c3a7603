//! Note library on disk
//!
//! Notes are markdown files below a root folder. Wiki-links resolve by exact,
//! case-sensitive file stem; the first match in file-name order wins.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Extension of note files
pub const NOTE_EXTENSION: &str = "md";

/// Stem of the note placed in a newly created folder
pub const FOLDER_NOTE_STEM: &str = "untitled";

/// Files that do not stop a folder from counting as empty
const IGNORED_FILES: &[&str] = &[".DS_Store"];

/// Errors that can occur while reading or changing the note library
#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error for {path}: {source}", path = .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Library root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Invalid name '{0}'")]
    InvalidName(String),

    #[error("A file or folder named {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Folder {} is not empty; delete its contents first", .0.display())]
    FolderNotEmpty(PathBuf),
}

/// Kind of entry in the library tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Folder,
    File,
}

/// A file or folder in the library tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    /// File or folder name
    pub name: String,
    /// Full path
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Children, folders first (empty for files)
    pub children: Vec<LibraryEntry>,
}

impl LibraryEntry {
    fn new(path: &Path, kind: EntryKind) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            path: path.to_path_buf(),
            kind,
            children: Vec::new(),
        }
    }

    /// Number of files anywhere below this entry
    pub fn file_count(&self) -> usize {
        match self.kind {
            EntryKind::File => 1,
            EntryKind::Folder => self.children.iter().map(LibraryEntry::file_count).sum(),
        }
    }
}

fn ensure_dir(root: &Path) -> Result<(), LibraryError> {
    if root.is_dir() {
        Ok(())
    } else {
        Err(LibraryError::NotADirectory(root.to_path_buf()))
    }
}

fn is_note(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|s| s.to_str()) == Some(NOTE_EXTENSION)
}

/// Find the note whose file stem equals `title` exactly.
///
/// # Returns
/// * `Ok(Some(path))` - First matching note in file-name order
/// * `Ok(None)` - No note with that title exists
/// * `Err(LibraryError)` - `root` is not a directory
pub fn find_note(root: &Path, title: &str) -> Result<Option<PathBuf>, LibraryError> {
    ensure_dir(root)?;

    let found = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("Skipping unreadable library entry: {}", err);
                None
            }
        })
        .map(DirEntry::into_path)
        .find(|path| is_note(path) && path.file_stem() == Some(OsStr::new(title)));

    match found {
        Some(ref path) => log::info!("Resolved '{}' to {}", title, path.display()),
        None => log::info!("No note named '{}' under {}", title, root.display()),
    }

    Ok(found)
}

/// Check that a title or folder name can be used as a single path component
fn validate_name(name: &str) -> Result<&str, LibraryError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
    {
        return Err(LibraryError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

/// Create a note titled `title` in `dir`.
///
/// The note holds a single level-1 heading with the title. Existing files
/// are never overwritten; a counter suffix is added instead (see
/// [`unique_path`]).
pub fn create_note(dir: &Path, title: &str) -> Result<PathBuf, LibraryError> {
    let title = validate_name(title)?;

    fs::create_dir_all(dir).map_err(|source| LibraryError::IoError {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = unique_path(dir, &format!("{}.{}", title, NOTE_EXTENSION));
    write_new_file(&path, &format!("# {}\n", title))?;

    log::info!("Created note {}", path.display());
    Ok(path)
}

/// Create folder `name` inside `parent`.
///
/// The folder starts with an `untitled.md` note headed with the folder name,
/// so there is something to open right away. An existing folder is reused
/// and its files are left alone.
pub fn create_folder(parent: &Path, name: &str) -> Result<PathBuf, LibraryError> {
    let name = validate_name(name)?;
    let folder = parent.join(name);

    fs::create_dir_all(&folder).map_err(|source| LibraryError::IoError {
        path: folder.clone(),
        source,
    })?;

    let note = unique_path(&folder, &format!("{}.{}", FOLDER_NOTE_STEM, NOTE_EXTENSION));
    write_new_file(&note, &format!("# {}\n", name))?;

    log::info!("Created folder {}", folder.display());
    Ok(folder)
}

/// Rename a file or folder within its parent folder.
///
/// A note keeps its `.md` extension when `new_name` leaves it out. Renaming
/// onto an existing entry fails with [`LibraryError::AlreadyExists`].
///
/// # Returns
/// * `Ok(PathBuf)` - The new path (unchanged if the name is the same)
/// * `Err(LibraryError)` - Invalid name, name taken or rename failure
pub fn rename_entry(path: &Path, new_name: &str) -> Result<PathBuf, LibraryError> {
    let new_name = validate_name(new_name)?;

    let mut target = path.with_file_name(new_name);
    if is_note(path) && target.extension().and_then(|s| s.to_str()) != Some(NOTE_EXTENSION) {
        target = path.with_file_name(format!("{}.{}", new_name, NOTE_EXTENSION));
    }

    if target == path {
        return Ok(target);
    }
    if target.exists() {
        return Err(LibraryError::AlreadyExists(target));
    }

    fs::rename(path, &target).map_err(|source| LibraryError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Renamed {} to {}", path.display(), target.display());
    Ok(target)
}

/// Delete a file, or a folder holding nothing but `.DS_Store`.
///
/// Folders with other content are refused with
/// [`LibraryError::FolderNotEmpty`]; nothing is removed recursively.
pub fn delete_entry(path: &Path) -> Result<(), LibraryError> {
    let io_err = |source| LibraryError::IoError {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::symlink_metadata(path).map_err(io_err)?;
    if !metadata.is_dir() {
        fs::remove_file(path).map_err(io_err)?;
        log::info!("Deleted file {}", path.display());
        return Ok(());
    }

    let mut ignored = Vec::new();
    for entry in fs::read_dir(path).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name();
        if name.to_str().is_some_and(|n| IGNORED_FILES.contains(&n)) {
            ignored.push(entry.path());
        } else {
            return Err(LibraryError::FolderNotEmpty(path.to_path_buf()));
        }
    }

    for file in ignored {
        fs::remove_file(&file).map_err(|source| LibraryError::IoError {
            path: file.clone(),
            source,
        })?;
    }
    fs::remove_dir(path).map_err(io_err)?;

    log::info!("Deleted folder {}", path.display());
    Ok(())
}

/// Write `content` to a file that must not exist yet
fn write_new_file(path: &Path, content: &str) -> Result<(), LibraryError> {
    let io_err = |source| LibraryError::IoError {
        path: path.to_path_buf(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)
}

/// Return `dir/file_name`, or `dir/name_N.ext` with the smallest free `N`
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let original = Path::new(file_name);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1..)
        .map(|counter| dir.join(format!("{}_{}{}", stem, counter, ext)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Order entries folders first, then case-insensitively by name
fn library_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    let a_dir = a.file_type().is_dir();
    let b_dir = b.file_type().is_dir();
    b_dir.cmp(&a_dir).then_with(|| {
        a.file_name()
            .to_string_lossy()
            .to_lowercase()
            .cmp(&b.file_name().to_string_lossy().to_lowercase())
    })
}

/// Build the library tree below `root`.
///
/// `filter` is a case-insensitive substring matched against file names only;
/// folders are always listed. Unreadable folders are logged and left empty.
pub fn library_tree(root: &Path, filter: &str) -> Result<LibraryEntry, LibraryError> {
    ensure_dir(root)?;
    let filter = filter.to_lowercase();

    // stack[d] is the open folder at depth d
    let mut stack = vec![LibraryEntry::new(root, EntryKind::Folder)];

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by(library_order);

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("Error reading library entry: {}", err);
                continue;
            }
        };

        close_folders(&mut stack, entry.depth());

        if entry.file_type().is_dir() {
            stack.push(LibraryEntry::new(entry.path(), EntryKind::Folder));
        } else if entry
            .file_name()
            .to_string_lossy()
            .to_lowercase()
            .contains(&filter)
        {
            if let Some(parent) = stack.last_mut() {
                parent
                    .children
                    .push(LibraryEntry::new(entry.path(), EntryKind::File));
            }
        }
    }

    close_folders(&mut stack, 1);
    Ok(stack.pop().unwrap_or_else(|| LibraryEntry::new(root, EntryKind::Folder)))
}

/// Pop folders until the stack holds `depth` entries, attaching each to its parent
fn close_folders(stack: &mut Vec<LibraryEntry>, depth: usize) {
    while stack.len() > depth.max(1) {
        if let Some(done) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.children.push(done);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unique_path() {
        let dir = TempDir::new().unwrap();
        assert_eq!(unique_path(dir.path(), "note.md"), dir.path().join("note.md"));

        fs::write(dir.path().join("note.md"), "").unwrap();
        assert_eq!(unique_path(dir.path(), "note.md"), dir.path().join("note_1.md"));

        fs::write(dir.path().join("note_1.md"), "").unwrap();
        assert_eq!(unique_path(dir.path(), "note.md"), dir.path().join("note_2.md"));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Plan ").unwrap(), "Plan");
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("a\\b").is_err());
        assert!(validate_name("..").is_err());
    }

    #[test]
    fn test_create_folder_with_starter_note() {
        let dir = TempDir::new().unwrap();
        let folder = create_folder(dir.path(), " Projects ").unwrap();

        assert_eq!(folder, dir.path().join("Projects"));
        assert_eq!(
            fs::read_to_string(folder.join("untitled.md")).unwrap(),
            "# Projects\n"
        );

        // Existing notes in a reused folder are kept
        fs::write(folder.join("untitled.md"), "mine").unwrap();
        create_folder(dir.path(), "Projects").unwrap();
        assert_eq!(fs::read_to_string(folder.join("untitled.md")).unwrap(), "mine");
        assert!(folder.join("untitled_1.md").exists());

        assert!(matches!(
            create_folder(dir.path(), "../out"),
            Err(LibraryError::InvalidName(_))
        ));
    }

    #[test]
    fn test_rename_note_keeps_extension() {
        let dir = TempDir::new().unwrap();
        let note = dir.path().join("Draft.md");
        fs::write(&note, "# Draft\n").unwrap();

        let renamed = rename_entry(&note, "Final").unwrap();
        assert_eq!(renamed, dir.path().join("Final.md"));
        assert!(!note.exists());
        assert_eq!(fs::read_to_string(&renamed).unwrap(), "# Draft\n");

        assert_eq!(rename_entry(&renamed, "Final.md").unwrap(), renamed);
    }

    #[test]
    fn test_rename_folder_and_refuse_existing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("old")).unwrap();
        fs::write(dir.path().join("taken.md"), "").unwrap();
        fs::write(dir.path().join("other.md"), "").unwrap();

        let renamed = rename_entry(&dir.path().join("old"), "new").unwrap();
        assert_eq!(renamed, dir.path().join("new"));
        assert!(renamed.is_dir());

        assert!(matches!(
            rename_entry(&dir.path().join("other.md"), "taken"),
            Err(LibraryError::AlreadyExists(_))
        ));
        assert!(dir.path().join("other.md").exists());
    }

    #[test]
    fn test_delete_file_and_empty_folder() {
        let dir = TempDir::new().unwrap();
        let note = dir.path().join("gone.md");
        fs::write(&note, "").unwrap();
        delete_entry(&note).unwrap();
        assert!(!note.exists());

        let folder = dir.path().join("empty");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join(".DS_Store"), "").unwrap();
        delete_entry(&folder).unwrap();
        assert!(!folder.exists());
    }

    #[test]
    fn test_delete_refuses_non_empty_folder() {
        let dir = TempDir::new().unwrap();
        let folder = dir.path().join("full");
        fs::create_dir(&folder).unwrap();
        fs::write(folder.join("keep.md"), "").unwrap();

        assert!(matches!(
            delete_entry(&folder),
            Err(LibraryError::FolderNotEmpty(_))
        ));
        assert!(folder.join("keep.md").exists());

        assert!(matches!(
            delete_entry(&dir.path().join("missing.md")),
            Err(LibraryError::IoError { .. })
        ));
    }

    #[test]
    fn test_find_note_requires_directory() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            find_note(&missing, "x"),
            Err(LibraryError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_close_folders_attaches_children() {
        let mut stack = vec![
            LibraryEntry::new(Path::new("/root"), EntryKind::Folder),
            LibraryEntry::new(Path::new("/root/a"), EntryKind::Folder),
            LibraryEntry::new(Path::new("/root/a/b"), EntryKind::Folder),
        ];
        close_folders(&mut stack, 1);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack[0].children[0].name, "a");
        assert_eq!(stack[0].children[0].children[0].name, "b");
    }
}

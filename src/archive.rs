//! Access to a participant's data package.
//!
//! An export is usually a ZIP file, sometimes already extracted into a
//! directory, or a single text file. All of them are exposed through the
//! [`Archive`] trait: a flat list of entry names plus a way to read one
//! entry. Entry names use `/` as separator regardless of platform.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{DonationError, Result};

/// A readable collection of named entries.
pub trait Archive: fmt::Debug {
    /// Returns all entry names, sorted.
    fn entries(&self) -> Result<Vec<String>>;

    /// Returns the bytes of the named entry.
    fn read_entry(&self, name: &str) -> Result<Vec<u8>>;
}

/// Turns a user-supplied location into an [`Archive`].
pub trait ArchiveOpener {
    /// Returns `true` if `location` can be opened as an archive.
    fn is_archive(&self, location: &str) -> bool;

    fn open(&self, location: &str) -> Result<Box<dyn Archive>>;
}

// ============================================================================
// In-memory archive
// ============================================================================

/// Archive backed by a map of entry names to bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryArchive {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry.
    #[must_use]
    pub fn with_entry(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(name, bytes);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.insert(name.into(), bytes.into());
    }
}

impl Archive for MemoryArchive {
    fn entries(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| DonationError::entry_not_found(name))
    }
}

// ============================================================================
// File system archives
// ============================================================================

/// Archive backed by an extracted export directory.
#[derive(Debug, Clone)]
pub struct DirectoryArchive {
    root: PathBuf,
}

impl DirectoryArchive {
    /// Opens a directory. Fails if `root` is not a readable directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DonationError::unreadable_archive(root, "not a directory"));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Archive for DirectoryArchive {
    fn entries(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry =
                entry.map_err(|e| DonationError::unreadable_archive(&self.root, e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                let name: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                names.push(name.join("/"));
            }
        }
        names.sort();
        Ok(names)
    }

    fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        if name.split('/').any(|part| part == "..") {
            return Err(DonationError::entry_not_found(name));
        }
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(DonationError::entry_not_found(name));
        }
        Ok(fs::read(path)?)
    }
}

/// Entries of macOS resource forks that archivers add next to real files.
fn is_resource_fork(name: &str) -> bool {
    name.starts_with("__MACOSX/") || basename(name).starts_with("._")
}

/// A ZIP file on disk.
///
/// Entries are listed once on open. Every read opens the file again, so
/// the archive can be shared without interior locking.
#[derive(Debug, Clone)]
pub struct ZipArchive {
    path: PathBuf,
    names: Vec<String>,
}

impl ZipArchive {
    /// Opens a ZIP file and lists its file entries.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let reader = Self::reader(&path)?;
        let mut names: Vec<String> = reader
            .file_names()
            .filter(|name| !name.ends_with('/') && !is_resource_fork(name))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(Self { path, names })
    }

    fn reader(path: &Path) -> Result<zip::ZipArchive<File>> {
        let file = File::open(path)?;
        zip::ZipArchive::new(file)
            .map_err(|e| DonationError::unreadable_archive(path, e.to_string()))
    }
}

impl Archive for ZipArchive {
    fn entries(&self) -> Result<Vec<String>> {
        Ok(self.names.clone())
    }

    fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        if !self.names.iter().any(|n| n == name) {
            return Err(DonationError::entry_not_found(name));
        }
        let mut reader = Self::reader(&self.path)?;
        let mut file = reader.by_name(name).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => DonationError::entry_not_found(name),
            other => DonationError::unreadable_archive(&self.path, other.to_string()),
        })?;
        let mut bytes = Vec::with_capacity(usize::try_from(file.size()).unwrap_or_default());
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Returns `true` if the file starts with a ZIP signature.
pub fn is_zip_file(path: &Path) -> bool {
    let mut magic = [0u8; 4];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .is_ok_and(|()| matches!(&magic, b"PK\x03\x04" | b"PK\x05\x06"))
}

/// A single exported file treated as a one-entry archive.
#[derive(Debug, Clone)]
pub struct FileArchive {
    path: PathBuf,
    name: String,
}

impl FileArchive {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(DonationError::unreadable_archive(path, "not a file"));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { path, name })
    }
}

impl Archive for FileArchive {
    fn entries(&self) -> Result<Vec<String>> {
        Ok(vec![self.name.clone()])
    }

    fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        if name != self.name {
            return Err(DonationError::entry_not_found(name));
        }
        Ok(fs::read(&self.path)?)
    }
}

/// Opens file system paths as ZIP, directory or single-file archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOpener;

impl ArchiveOpener for FsOpener {
    fn is_archive(&self, location: &str) -> bool {
        let path = Path::new(location);
        path.is_dir() || path.is_file()
    }

    fn open(&self, location: &str) -> Result<Box<dyn Archive>> {
        let path = Path::new(location);
        if path.is_dir() {
            Ok(Box::new(DirectoryArchive::open(path)?))
        } else if is_zip_file(path) {
            Ok(Box::new(ZipArchive::open(path)?))
        } else if path.is_file() {
            Ok(Box::new(FileArchive::open(path)?))
        } else {
            Err(DonationError::unreadable_archive(path, "no such file or directory"))
        }
    }
}

/// Opens named in-memory archives. Used by tests and embedders that
/// receive uploads as bytes.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    archives: BTreeMap<String, MemoryArchive>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_archive(mut self, location: impl Into<String>, archive: MemoryArchive) -> Self {
        self.archives.insert(location.into(), archive);
        self
    }
}

impl ArchiveOpener for MemoryOpener {
    fn is_archive(&self, location: &str) -> bool {
        self.archives.contains_key(location)
    }

    fn open(&self, location: &str) -> Result<Box<dyn Archive>> {
        self.archives
            .get(location)
            .cloned()
            .map(|a| Box::new(a) as Box<dyn Archive>)
            .ok_or_else(|| DonationError::unreadable_archive(location, "unknown upload"))
    }
}

// ============================================================================
// Lookup helpers
// ============================================================================

/// Matches `name` against a pattern with `*` and `?` wildcards.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            backtrack = Some((pi, ni));
            pi += 1;
        } else if let Some((star, matched)) = backtrack {
            pi = star + 1;
            ni = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

/// Returns the final path component of an entry name.
pub fn basename(entry: &str) -> &str {
    entry.rsplit('/').next().unwrap_or(entry)
}

/// Finds the first entry whose basename matches one of `patterns`.
///
/// Patterns are tried in order, so earlier patterns win.
///
/// # Example
///
/// ```rust
/// use chatdonate::archive::{MemoryArchive, find_entry};
///
/// let archive = MemoryArchive::new()
///     .with_entry("export/media.jpg", vec![])
///     .with_entry("export/_chat.txt", b"...".to_vec());
///
/// assert_eq!(find_entry(&archive, &["*.txt"])?, "export/_chat.txt");
/// assert!(find_entry(&archive, &["*.json"]).is_err());
/// # Ok::<(), chatdonate::DonationError>(())
/// ```
pub fn find_entry<A, S>(archive: &A, patterns: &[S]) -> Result<String>
where
    A: Archive + ?Sized,
    S: AsRef<str>,
{
    let entries = archive.entries()?;
    for pattern in patterns {
        let pattern = pattern.as_ref();
        if let Some(entry) = entries.iter().find(|e| glob_match(pattern, basename(e))) {
            debug!(pattern, "found archive entry");
            return Ok(entry.clone());
        }
    }

    warn!(entries = entries.len(), "no expected file in archive");
    Err(DonationError::no_file_found(patterns.iter().map(AsRef::as_ref)))
}

/// Reads an entry and decodes it as UTF-8.
pub fn read_text<A: Archive + ?Sized>(archive: &A, name: &str) -> Result<String> {
    let bytes = archive.read_entry(name)?;
    String::from_utf8(bytes).map_err(|e| DonationError::decode(name, e))
}

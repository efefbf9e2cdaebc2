//! git::memfs
//!
//! In-memory worktree used by the `mem` storage mode.
//!
//! Files are keyed by their `/`-separated path relative to the worktree
//! root and kept in sorted order, so listings are deterministic.

use std::collections::BTreeMap;

/// How a file was recorded in the tree it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Plain file (`100644`).
    Regular,
    /// Executable file (`100755`).
    Executable,
    /// Symbolic link (`120000`); contents are the link target.
    Symlink,
}

impl FileMode {
    /// Map a raw git filemode to a [`FileMode`].
    ///
    /// Returns `None` for modes that are not files (trees, submodules).
    pub fn from_git(mode: i32) -> Option<Self> {
        match mode {
            0o100644 | 0o100664 => Some(FileMode::Regular),
            0o100755 => Some(FileMode::Executable),
            0o120000 => Some(FileMode::Symlink),
            _ => None,
        }
    }
}

/// A single file held by [`MemFs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemFile {
    pub contents: Vec<u8>,
    pub mode: FileMode,
}

/// An in-memory filesystem.
///
/// # Example
///
/// ```
/// use checkout_sha::git::{FileMode, MemFs};
///
/// let mut fs = MemFs::new();
/// fs.write("src/lib.rs", b"fn main() {}".to_vec(), FileMode::Regular);
///
/// assert!(fs.exists("src/lib.rs"));
/// assert_eq!(fs.read("src/lib.rs"), Some(&b"fn main() {}"[..]));
/// assert_eq!(fs.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemFs {
    files: BTreeMap<String, MemFile>,
}

impl MemFs {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a file, replacing any previous contents at `path`.
    pub fn write(&mut self, path: impl Into<String>, contents: Vec<u8>, mode: FileMode) {
        let path = normalize(&path.into());
        self.files.insert(path, MemFile { contents, mode });
    }

    /// Read the contents of a file.
    pub fn read(&self, path: &str) -> Option<&[u8]> {
        self.get(path).map(|f| f.contents.as_slice())
    }

    /// Look up a file with its mode.
    pub fn get(&self, path: &str) -> Option<&MemFile> {
        self.files.get(&normalize(path))
    }

    /// Check whether a file exists.
    pub fn exists(&self, path: &str) -> bool {
        self.files.contains_key(&normalize(path))
    }

    /// All file paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Remove every file.
    pub fn clear(&mut self) {
        self.files.clear();
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches("./").trim_matches('/').to_string()
}

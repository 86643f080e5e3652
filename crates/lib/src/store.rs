//! # Document Store
//!
//! Read-by-path access to prompt documents. The resolver only ever reads
//! through this seam and never caches, so an edit to a prompt set is picked
//! up by the next resolution call.

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::Path;

/// A capability for reading UTF-8 prompt documents by path.
///
/// An `io::Error` from [`DocumentStore::read_to_string`] is the not-found
/// signal; the resolver converts it into its own error taxonomy.
pub trait DocumentStore: Send + Sync + Debug {
    /// Reads the document at `path` as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Returns `true` if `path` refers to a readable document.
    fn exists(&self, path: &Path) -> bool;
}

/// A document store backed by the local filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileStore;

impl DocumentStore for FileStore {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

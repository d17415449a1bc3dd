//! Error types for scanner and catalog operations.
//!
//! Library crates use `thiserror` for explicit error enums; run-level
//! catalog failures carry every offender so reports are complete.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Error types for document and catalog operations
#[derive(Error, Debug)]
pub enum ScanError {
    /// File I/O failure, surfaced with the path that failed
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path of the file or directory that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// Frontmatter block could not be parsed
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// Run-level catalog failure detected after the full pass
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Failed to serialize the index
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Frontmatter parse failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterError {
    /// Opening marker present but closing marker missing
    #[error("frontmatter block opened but never closed")]
    Unterminated,
}

/// A document id that disagrees with its folder name.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FolderMismatch {
    /// Folder name on disk
    pub folder: String,
    /// Id declared inside the document
    pub id: String,
}

impl fmt::Display for FolderMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "folder \"{}\" has id \"{}\"", self.folder, self.id)
    }
}

/// An id declared by more than one document.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DuplicateId {
    /// The colliding id
    pub id: String,
    /// How many documents declare it
    pub count: usize,
}

impl fmt::Display for DuplicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" appears {} times", self.id, self.count)
    }
}

/// Run-level fatal conditions, evaluated only after every folder is processed
#[derive(Error, Debug)]
pub enum CatalogError {
    /// At least one document id disagrees with its folder name
    #[error("folder/id mismatch:\n{}", join_lines(.0))]
    FolderMismatch(Vec<FolderMismatch>),
    /// At least one id is declared by more than one document
    #[error("duplicate task ids:\n{}", join_lines(.0))]
    DuplicateIds(Vec<DuplicateId>),
}

fn join_lines<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

//! Catalog Records - Entry types accumulated during an indexing run.
//!
//! `CatalogEntry` is the internal accumulator; only `IndexTask` fields are
//! serialized into the emitted index document.

use schemars::JsonSchema as SchemarsJsonSchema;
use serde::{Deserialize, Serialize};

/// One successfully processed document, as accumulated during a run.
///
/// Produced only after synchronization and extraction succeed; discarded
/// when the index has been emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Declared id (folder name when the document omits one)
    pub id: String,
    /// Declared display name
    pub name: String,
    /// Folder path relative to the scan root
    pub path: String,
    /// Folder name on disk
    pub folder: String,
    /// Whether the declared id disagrees with the folder name
    pub folder_mismatch: bool,
}

impl CatalogEntry {
    /// Serializable index row for this entry.
    #[must_use]
    pub fn to_index_task(&self) -> IndexTask {
        IndexTask {
            id: self.id.clone(),
            name: self.name.clone(),
            path: self.path.clone(),
        }
    }
}

/// One row of the emitted index.
#[derive(Debug, Clone, Serialize, Deserialize, SchemarsJsonSchema, PartialEq, Eq)]
pub struct IndexTask {
    /// Unique task id, equal to the folder name
    pub id: String,
    /// Human-readable task name
    pub name: String,
    /// Folder path relative to the scan root
    pub path: String,
}

/// The emitted index document: `{ "tasks": [...] }`, sorted by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, SchemarsJsonSchema, PartialEq, Eq)]
pub struct TaskIndex {
    /// Index rows sorted ascending by id
    pub tasks: Vec<IndexTask>,
}

/// Reference changes applied to one folder's document.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FolderSync {
    /// Folder name on disk
    pub folder: String,
    /// File names newly listed
    pub added: Vec<String>,
    /// File names no longer listed
    pub removed: Vec<String>,
}

/// Run-level report of synchronization activity.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct SyncSummary {
    /// Folders whose document was rewritten
    pub synchronized: Vec<FolderSync>,
    /// Count of folders already in canonical form
    pub unchanged_count: usize,
}

impl SyncSummary {
    /// Check if any document was rewritten.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.synchronized.is_empty()
    }

    /// Total count of rewritten documents.
    #[must_use]
    pub fn change_count(&self) -> usize {
        self.synchronized.len()
    }
}

//! Taskdex Scanner - Reference synchronization, validation, and indexing for task documents.
//!
//! Each task folder carries one `task.md` describing a unit of work plus its
//! supporting files. This crate keeps the document's references section in
//! step with the folder's actual contents, validates documents against a
//! fixed rule set, and builds the single sorted index of the whole catalog.
//!
//! # Architecture
//!
//! ```text
//! taskdex-scanner/src/
//! ├── lib.rs          # Main module and exports
//! ├── config.rs       # ScanConfig - fixed sets injected at construction
//! ├── frontmatter.rs  # Flat key/value metadata block extraction
//! ├── references.rs   # References section parse / regenerate / synchronize
//! ├── validate.rs     # ContentValidator - rule set over one document
//! ├── catalog.rs      # CatalogIndexer - full-pass orchestration
//! ├── records.rs      # CatalogEntry, TaskIndex, SyncSummary
//! └── error.rs        # ScanError, FrontmatterError, CatalogError
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use taskdex_scanner::{CatalogIndexer, ContentValidator, ScanConfig};
//!
//! let config = ScanConfig::default();
//!
//! // Synchronize references and build the sorted index
//! let indexer = CatalogIndexer::new(config.clone());
//! let run = indexer.run(Path::new("tasks"))?;
//!
//! // Validate documents without modifying them
//! let validator = ContentValidator::new(config);
//! let reports = validator.validate_catalog(Path::new("tasks"), &[])?;
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod frontmatter;
pub mod records;
pub mod references;
pub mod validate;

// ============================================================================
// Re-exports
// ============================================================================

pub use catalog::{task_folders, CatalogIndexer, IndexRun, DEFAULT_INDEX_NAME};
pub use config::ScanConfig;
pub use error::{CatalogError, DuplicateId, FolderMismatch, FrontmatterError, ScanError};
pub use frontmatter::{extract_frontmatter, Frontmatter};
pub use records::{CatalogEntry, FolderSync, IndexTask, SyncSummary, TaskIndex};
pub use references::{
    contains_bold_label, eligible_files, generate_section, parse_references, synchronize,
    FileRef, ParsedReferences, ReferenceEntry, SectionSpan, SyncOutcome,
};
pub use validate::{
    ContentValidator, FolderReport, ValidationError, ValidationOutcome, ValidationWarning,
};

// ============================================================================
// JSON Schema Generation
// ============================================================================

/// Generate the JSON Schema for one index row.
///
/// Returned as a string so external tooling can validate and document the
/// emitted index without depending on this crate.
#[must_use]
pub fn task_index_schema() -> String {
    let schema = schemars::schema_for!(IndexTask);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

// ============================================================================
// Version
// ============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Catalog Indexer - Orchestrates synchronization and extraction across folders.
//!
//! Processing is single-threaded and strictly sequential over the sorted
//! folder list. Each document is read, synchronized in place, and re-parsed
//! for metadata; entries accumulate until the full pass completes, then the
//! cross-document checks run. Writes already persisted are not rolled back
//! when a later global check fails the run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ScanConfig;
use crate::error::{CatalogError, DuplicateId, FolderMismatch, ScanError};
use crate::frontmatter::extract_frontmatter;
use crate::records::{CatalogEntry, FolderSync, SyncSummary, TaskIndex};
use crate::references::{eligible_files, synchronize, SyncOutcome};

/// Default file name of the emitted index.
pub const DEFAULT_INDEX_NAME: &str = "task-index.json";

/// Result of one full indexing run.
#[derive(Debug, Clone)]
pub struct IndexRun {
    /// Entries sorted ascending by id
    pub entries: Vec<CatalogEntry>,
    /// Synchronization activity across all folders
    pub summary: SyncSummary,
}

impl IndexRun {
    /// The emitted index document for this run.
    #[must_use]
    pub fn to_index(&self) -> TaskIndex {
        TaskIndex {
            tasks: self.entries.iter().map(CatalogEntry::to_index_task).collect(),
        }
    }
}

/// Enumerate the task folders directly under a root, sorted by name.
///
/// # Errors
///
/// `ScanError::Io` when the root cannot be enumerated.
pub fn task_folders(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(root).map_err(|e| ScanError::io(root, e))? {
        let entry = entry.map_err(|e| ScanError::io(root, e))?;
        let path = entry.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    folders.sort();
    Ok(folders)
}

/// Catalog Indexer - builds the sorted index of all task documents.
#[derive(Debug, Clone)]
pub struct CatalogIndexer {
    config: ScanConfig,
}

impl CatalogIndexer {
    /// Create an indexer with the given configuration.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Synchronize one folder's document and extract its catalog entry.
    ///
    /// Returns `Ok(None)` when the folder carries no document, or when the
    /// document declares neither `id` nor `name` (logged, never fatal).
    ///
    /// # Errors
    ///
    /// `ScanError::Io` on any read or write failure, with the failing path.
    pub fn process_folder(
        &self,
        root: &Path,
        folder: &Path,
    ) -> Result<Option<(CatalogEntry, SyncOutcome)>, ScanError> {
        let document_path = folder.join(&self.config.document_name);
        if !document_path.exists() {
            log::debug!("No {} in folder: {:?}", self.config.document_name, folder);
            return Ok(None);
        }

        let content = fs::read_to_string(&document_path)
            .map_err(|e| ScanError::io(&document_path, e))?;

        let mut files = Vec::new();
        for entry in fs::read_dir(folder).map_err(|e| ScanError::io(folder, e))? {
            let entry = entry.map_err(|e| ScanError::io(folder, e))?;
            if entry.path().is_file() {
                files.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        let eligible = eligible_files(&files, &self.config);
        let outcome = synchronize(&content, &eligible);
        if outcome.changed {
            fs::write(&document_path, &outcome.content)
                .map_err(|e| ScanError::io(&document_path, e))?;
            log::info!(
                "Synchronized {:?}: {} added, {} removed",
                folder,
                outcome.added.len(),
                outcome.removed.len()
            );
        }

        let folder_name = folder
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        // Metadata comes from the synchronized text, the same bytes just persisted.
        let frontmatter = match extract_frontmatter(&outcome.content) {
            Ok((mapping, _)) => mapping,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", folder, e);
                return Ok(None);
            }
        };

        let id = frontmatter.get("id");
        let name = frontmatter.get("name");
        if id.is_none() && name.is_none() {
            log::warn!("Skipping {:?}: document declares neither id nor name", folder);
            return Ok(None);
        }

        let id = id.cloned().unwrap_or_else(|| folder_name.clone());
        let name = name.cloned().unwrap_or_else(|| id.clone());
        let path = folder
            .strip_prefix(root)
            .unwrap_or(folder)
            .to_string_lossy()
            .to_string();

        let entry = CatalogEntry {
            folder_mismatch: id != folder_name,
            id,
            name,
            path,
            folder: folder_name,
        };
        Ok(Some((entry, outcome)))
    }

    /// Run the full pass: synchronize every folder, then apply the
    /// cross-document checks and sort the surviving entries by id.
    ///
    /// # Errors
    ///
    /// `ScanError::Io` aborts immediately on the failing folder.
    /// `ScanError::Catalog` after the full pass when any folder/id mismatch
    /// exists, or any id is declared more than once; every offender is
    /// carried in the error.
    pub fn run(&self, root: &Path) -> Result<IndexRun, ScanError> {
        let mut entries = Vec::new();
        let mut summary = SyncSummary::default();

        for folder in task_folders(root)? {
            if let Some((entry, outcome)) = self.process_folder(root, &folder)? {
                if outcome.changed {
                    summary.synchronized.push(FolderSync {
                        folder: entry.folder.clone(),
                        added: outcome.added,
                        removed: outcome.removed,
                    });
                } else {
                    summary.unchanged_count += 1;
                }
                entries.push(entry);
            }
        }

        // Folder names are unique on disk, so a duplicated id always carries
        // a mismatch as well; collisions must be checked first.
        let mut counts = std::collections::BTreeMap::new();
        for entry in &entries {
            *counts.entry(entry.id.clone()).or_insert(0usize) += 1;
        }
        let duplicates: Vec<DuplicateId> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(id, count)| DuplicateId { id, count })
            .collect();
        if !duplicates.is_empty() {
            return Err(CatalogError::DuplicateIds(duplicates).into());
        }

        let mismatches: Vec<FolderMismatch> = entries
            .iter()
            .filter(|e| e.folder_mismatch)
            .map(|e| FolderMismatch {
                folder: e.folder.clone(),
                id: e.id.clone(),
            })
            .collect();
        if !mismatches.is_empty() {
            return Err(CatalogError::FolderMismatch(mismatches).into());
        }

        entries.sort_by(|a, b| a.id.cmp(&b.id));
        log::info!("Indexed {} task folders under {:?}", entries.len(), root);
        Ok(IndexRun { entries, summary })
    }

    /// Run the full pass and write the index document to `output`.
    ///
    /// Nothing is written when the run fails a cross-document check.
    ///
    /// # Errors
    ///
    /// Same as [`CatalogIndexer::run`], plus `ScanError::Io` on the output
    /// write and `ScanError::Json` on serialization.
    pub fn write_index(&self, root: &Path, output: &Path) -> Result<IndexRun, ScanError> {
        let run = self.run(root)?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(|e| ScanError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&run.to_index())?;
        fs::write(output, json).map_err(|e| ScanError::io(output, e))?;

        log::info!(
            "Wrote {} with {} tasks ({} folders synchronized)",
            output.display(),
            run.entries.len(),
            run.summary.change_count()
        );
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_task(root: &Path, folder: &str, content: &str, files: &[&str]) {
        let dir = root.join(folder);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("task.md"), content).unwrap();
        for file in files {
            fs::write(dir.join(file), "x").unwrap();
        }
    }

    fn doc(id: &str) -> String {
        format!(
            "---\nid: {id}\nname: Task {id}\ntype: task\n---\n**Prompt:**\nWork on {id}.\n"
        )
    }

    #[test]
    fn test_process_folder_skips_without_document() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("empty-task")).unwrap();

        let indexer = CatalogIndexer::new(ScanConfig::default());
        let result = indexer
            .process_folder(temp.path(), &temp.path().join("empty-task"))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_process_folder_skips_without_id_and_name() {
        let temp = TempDir::new().unwrap();
        write_task(temp.path(), "anon-task", "**Prompt:**\nWork.\n", &[]);

        let indexer = CatalogIndexer::new(ScanConfig::default());
        let result = indexer
            .process_folder(temp.path(), &temp.path().join("anon-task"))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_process_folder_falls_back_to_folder_id() {
        let temp = TempDir::new().unwrap();
        write_task(
            temp.path(),
            "named-task",
            "---\nname: Only A Name\n---\n**Prompt:**\nWork.\n",
            &[],
        );

        let indexer = CatalogIndexer::new(ScanConfig::default());
        let (entry, _) = indexer
            .process_folder(temp.path(), &temp.path().join("named-task"))
            .unwrap()
            .unwrap();
        assert_eq!(entry.id, "named-task");
        assert!(!entry.folder_mismatch);
    }

    #[test]
    fn test_run_sorts_entries_by_id() {
        let temp = TempDir::new().unwrap();
        write_task(temp.path(), "zeta-task", &doc("zeta-task"), &[]);
        write_task(temp.path(), "alpha-task", &doc("alpha-task"), &[]);

        let indexer = CatalogIndexer::new(ScanConfig::default());
        let run = indexer.run(temp.path()).unwrap();
        let ids: Vec<&str> = run.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha-task", "zeta-task"]);
    }

    #[test]
    fn test_run_records_sync_summary() {
        let temp = TempDir::new().unwrap();
        write_task(temp.path(), "fresh-task", &doc("fresh-task"), &["a.json"]);

        let indexer = CatalogIndexer::new(ScanConfig::default());
        let run = indexer.run(temp.path()).unwrap();
        assert!(run.summary.has_changes());
        assert_eq!(run.summary.synchronized[0].added, vec!["a.json".to_string()]);

        // Second pass finds everything canonical.
        let second = indexer.run(temp.path()).unwrap();
        assert!(!second.summary.has_changes());
        assert_eq!(second.summary.unchanged_count, 1);
    }
}

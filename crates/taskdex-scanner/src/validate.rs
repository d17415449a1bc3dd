//! Content Validator - Fixed rule set over one document and its folder name.
//!
//! Produces blocking errors and informational warnings; a document is valid
//! iff its error list is empty. Pattern scans are delegated to the injected
//! `taskdex-security` policies. The validator never mutates a document and
//! does not require synchronization to have run.

use std::fmt;
use std::fs;
use std::path::Path;

use taskdex_security::PatternPolicy;
use thiserror::Error;

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::frontmatter::extract_frontmatter;
use crate::references::contains_bold_label;

/// Frontmatter keys every document must carry.
const REQUIRED_KEYS: [&str; 3] = ["id", "name", "type"];

/// Label of the mandatory prompt section.
const PROMPT_LABEL: &str = "Prompt";
/// Label of the references section.
const REFERENCES_LABEL: &str = "References";

/// A blocking validation finding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required frontmatter key absent
    #[error("missing required field `{0}`")]
    MissingField(String),
    /// `type` value outside the allowed set
    #[error("invalid type `{0}`")]
    InvalidType(String),
    /// No bold `Prompt` label anywhere in the document
    #[error("prompt section missing")]
    MissingPrompt,
    /// Document matches a forbidden content pattern
    #[error("forbidden pattern `{0}`")]
    ForbiddenPattern(String),
    /// Frontmatter block opened but never closed
    #[error("frontmatter block opened but never closed")]
    UnterminatedFrontmatter,
}

/// A non-blocking validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Document id differs from the folder name (soft check)
    IdFolderMismatch {
        /// Folder name on disk
        folder: String,
        /// Id declared inside the document
        id: String,
    },
    /// No bold `References` label anywhere in the document
    MissingReferences,
    /// Folder name breaks the lowercase-hyphen convention
    NamingConvention(String),
    /// Document matches a suspicious content pattern
    SecurityHeuristic {
        /// Stable rule identifier
        rule_id: String,
        /// Human-readable description of the rule
        description: String,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IdFolderMismatch { folder, id } => {
                write!(f, "id `{id}` does not match folder `{folder}`")
            }
            Self::MissingReferences => write!(f, "references section missing"),
            Self::NamingConvention(folder) => {
                write!(f, "folder `{folder}` breaks the lowercase-hyphen convention")
            }
            Self::SecurityHeuristic {
                rule_id,
                description,
            } => write!(f, "suspicious pattern `{rule_id}`: {description}"),
        }
    }
}

/// Per-document validation result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Blocking findings
    pub errors: Vec<ValidationError>,
    /// Informational findings
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationOutcome {
    /// A document is valid iff no blocking finding was recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validation result for one folder.
#[derive(Debug, Clone)]
pub struct FolderReport {
    /// Folder name on disk
    pub folder: String,
    /// Findings for the folder's document
    pub outcome: ValidationOutcome,
}

/// Content Validator - checks a document against the fixed rule set.
///
/// The configuration and both pattern policies are injected at construction
/// and never change afterwards.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    config: ScanConfig,
    forbidden: PatternPolicy,
    heuristics: PatternPolicy,
}

impl ContentValidator {
    /// Create a validator with the built-in policies.
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Self::with_policies(config, PatternPolicy::forbidden(), PatternPolicy::heuristics())
    }

    /// Create a validator with explicit pattern policies.
    #[must_use]
    pub fn with_policies(
        config: ScanConfig,
        forbidden: PatternPolicy,
        heuristics: PatternPolicy,
    ) -> Self {
        Self {
            config,
            forbidden,
            heuristics,
        }
    }

    /// Run every rule against one document.
    #[must_use]
    pub fn validate(&self, content: &str, folder_name: &str) -> ValidationOutcome {
        let mut outcome = ValidationOutcome::default();

        let frontmatter = match extract_frontmatter(content) {
            Ok((mapping, _)) => mapping,
            Err(_) => {
                outcome.errors.push(ValidationError::UnterminatedFrontmatter);
                crate::frontmatter::Frontmatter::new()
            }
        };

        for key in REQUIRED_KEYS {
            if !frontmatter.contains_key(key) {
                outcome
                    .errors
                    .push(ValidationError::MissingField(key.to_string()));
            }
        }

        if let Some(id) = frontmatter.get("id") {
            if id != folder_name {
                outcome.warnings.push(ValidationWarning::IdFolderMismatch {
                    folder: folder_name.to_string(),
                    id: id.clone(),
                });
            }
        }

        if let Some(kind) = frontmatter.get("type") {
            if !self.config.is_allowed_type(kind) {
                outcome
                    .errors
                    .push(ValidationError::InvalidType(kind.clone()));
            }
        }

        if !contains_bold_label(content, PROMPT_LABEL) {
            outcome.errors.push(ValidationError::MissingPrompt);
        }
        if !contains_bold_label(content, REFERENCES_LABEL) {
            outcome.warnings.push(ValidationWarning::MissingReferences);
        }

        for violation in self.forbidden.scan_all(content) {
            outcome
                .errors
                .push(ValidationError::ForbiddenPattern(violation.rule_id));
        }
        for violation in self.heuristics.scan_all(content) {
            outcome.warnings.push(ValidationWarning::SecurityHeuristic {
                rule_id: violation.rule_id,
                description: violation.description,
            });
        }

        if !ScanConfig::folder_name_is_conventional(folder_name) {
            outcome
                .warnings
                .push(ValidationWarning::NamingConvention(folder_name.to_string()));
        }

        outcome
    }

    /// Validate the document of one folder on disk.
    ///
    /// Returns `Ok(None)` when the folder carries no task document.
    ///
    /// # Errors
    ///
    /// `ScanError::Io` when the document exists but cannot be read.
    pub fn validate_folder(&self, folder: &Path) -> Result<Option<FolderReport>, ScanError> {
        let document_path = folder.join(&self.config.document_name);
        if !document_path.exists() {
            log::warn!("No {} in folder: {:?}", self.config.document_name, folder);
            return Ok(None);
        }

        let content = fs::read_to_string(&document_path)
            .map_err(|e| ScanError::io(&document_path, e))?;
        let folder_name = folder
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Ok(Some(FolderReport {
            outcome: self.validate(&content, &folder_name),
            folder: folder_name,
        }))
    }

    /// Validate every folder under the root, or only the named ones.
    ///
    /// Folders without a document are skipped, never failed: one folder's
    /// findings must not stop evaluation of the next.
    ///
    /// # Errors
    ///
    /// `ScanError::Io` when the root cannot be enumerated or a document read fails.
    pub fn validate_catalog(
        &self,
        root: &Path,
        folders: &[String],
    ) -> Result<Vec<FolderReport>, ScanError> {
        let targets = if folders.is_empty() {
            crate::catalog::task_folders(root)?
        } else {
            folders.iter().map(|name| root.join(name)).collect()
        };

        let mut reports = Vec::new();
        for folder in targets {
            if let Some(report) = self.validate_folder(&folder)? {
                reports.push(report);
            }
        }
        log::info!("Validated {} folders under {:?}", reports.len(), root);
        Ok(reports)
    }
}

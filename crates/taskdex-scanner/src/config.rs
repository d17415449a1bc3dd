//! Scan Configuration - Fixed sets consumed by the synchronizer and validator.
//!
//! All pattern lists are immutable configuration objects handed to the
//! components at construction; nothing here is module-level mutable state.

use once_cell::sync::Lazy;
use regex::Regex;

/// Folder naming convention: lowercase alphanumeric segments joined by single hyphens.
static FOLDER_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("Failed to compile folder name pattern"));

/// Immutable catalog scan configuration.
///
/// Carries the fixed sets the core needs: the task document's file name,
/// the extensions eligible for reference listing, and the allowed values
/// for the `type` frontmatter key.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File name of the task document inside each folder
    pub document_name: String,
    /// File name suffixes eligible for reference listing
    pub reference_extensions: Vec<String>,
    /// Substring that marks template files as reference-eligible
    pub template_marker: String,
    /// Allowed values for the `type` frontmatter key
    pub allowed_types: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            document_name: "task.md".to_string(),
            reference_extensions: [
                ".md", ".json", ".yaml", ".yml", ".toml", ".txt", ".csv", ".sql", ".diff",
                ".patch", ".sh", ".py",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            template_marker: ".template".to_string(),
            allowed_types: ["task", "bugfix", "feature", "refactor"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl ScanConfig {
    /// Create a configuration with the built-in fixed sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a file in the task folder belongs in the references list.
    ///
    /// The task document itself and readme-like files are never eligible;
    /// everything else qualifies by extension or template marker.
    #[must_use]
    pub fn is_reference_eligible(&self, file_name: &str) -> bool {
        if file_name == self.document_name {
            return false;
        }
        if file_name.to_lowercase().starts_with("readme") {
            return false;
        }
        self.reference_extensions
            .iter()
            .any(|ext| file_name.ends_with(ext.as_str()))
            || file_name.contains(self.template_marker.as_str())
    }

    /// Whether a frontmatter `type` value is in the allowed set.
    #[must_use]
    pub fn is_allowed_type(&self, value: &str) -> bool {
        self.allowed_types.iter().any(|t| t == value)
    }

    /// Whether a folder name follows the lowercase-hyphen convention.
    #[must_use]
    pub fn folder_name_is_conventional(name: &str) -> bool {
        FOLDER_NAME_RE.is_match(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_and_readme_excluded() {
        let config = ScanConfig::default();
        assert!(!config.is_reference_eligible("task.md"));
        assert!(!config.is_reference_eligible("README.md"));
        assert!(!config.is_reference_eligible("readme.txt"));
    }

    #[test]
    fn test_extension_allow_list() {
        let config = ScanConfig::default();
        assert!(config.is_reference_eligible("fixture.json"));
        assert!(config.is_reference_eligible("change.diff"));
        assert!(config.is_reference_eligible("setup.sh"));
        assert!(config.is_reference_eligible("notes.md"));
        assert!(!config.is_reference_eligible("binary.exe"));
    }

    #[test]
    fn test_template_marker() {
        let config = ScanConfig::default();
        assert!(config.is_reference_eligible("config.template"));
        assert!(config.is_reference_eligible("app.template.xml"));
    }

    #[test]
    fn test_allowed_types() {
        let config = ScanConfig::default();
        assert!(config.is_allowed_type("task"));
        assert!(config.is_allowed_type("bugfix"));
        assert!(!config.is_allowed_type("chore"));
    }

    #[test]
    fn test_folder_name_convention() {
        assert!(ScanConfig::folder_name_is_conventional("sample-task"));
        assert!(ScanConfig::folder_name_is_conventional("a1-b2-c3"));
        assert!(!ScanConfig::folder_name_is_conventional("Sample-Task"));
        assert!(!ScanConfig::folder_name_is_conventional("double--hyphen"));
        assert!(!ScanConfig::folder_name_is_conventional("trailing-"));
        assert!(!ScanConfig::folder_name_is_conventional("under_score"));
    }
}

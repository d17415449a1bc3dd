//! Reference Synchronizer - Parses and regenerates the references section.
//!
//! The section is located by an explicit line scanner, not by regex over the
//! whole text: the first bold `References` label starts the section, and the
//! scanner then consumes only well-formed `- ` bullet lines, stopping at the
//! first blank or non-bullet line. Only the first labeled section in a
//! document is honored; a second one is left untouched.
//!
//! Regeneration is deterministic: file references sorted ascending by name,
//! `.diff` files tagged as git diffs, URL references appended in their
//! original order.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::ScanConfig;

/// Label that opens the references section.
const SECTION_LABEL: &str = "References";

/// Line tag for diff file references. Checked before the plain file tag.
const GIT_DIFF_PREFIX: &str = "git+file:///";
/// Line tag for local file references.
const LOCAL_FILE_PREFIX: &str = "file:///";
/// Line tags for URL references.
const URL_PREFIXES: [&str; 2] = ["http://", "https://"];

/// One entry in the references section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceEntry {
    /// A file expected to exist in the task folder
    LocalFile(String),
    /// A diff file expected to exist in the task folder
    GitDiff(String),
    /// An opaque URL, never checked against the filesystem
    Url(String),
}

impl ReferenceEntry {
    /// Classify one bullet's content by its leading tag.
    ///
    /// The diff tag is checked before the shorter plain file tag. Unknown
    /// prefixes yield `None` and are silently dropped by the parser.
    #[must_use]
    pub fn classify(item: &str) -> Option<Self> {
        if let Some(rest) = item.strip_prefix(GIT_DIFF_PREFIX) {
            return Some(Self::GitDiff(rest.to_string()));
        }
        if let Some(rest) = item.strip_prefix(LOCAL_FILE_PREFIX) {
            return Some(Self::LocalFile(rest.to_string()));
        }
        if URL_PREFIXES.iter().any(|p| item.starts_with(p)) {
            return Some(Self::Url(item.to_string()));
        }
        None
    }

    /// Render the entry as one canonical bullet line (without newline).
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::LocalFile(path) => format!("- {LOCAL_FILE_PREFIX}{path}"),
            Self::GitDiff(path) => format!("- {GIT_DIFF_PREFIX}{path}"),
            Self::Url(address) => format!("- {address}"),
        }
    }

    /// The canonical entry for a folder file: `.diff` names become git diffs.
    #[must_use]
    pub fn for_file(name: &str) -> Self {
        if name.ends_with(".diff") {
            Self::GitDiff(name.to_string())
        } else {
            Self::LocalFile(name.to_string())
        }
    }
}

/// One parsed file reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    /// File name relative to the task folder
    pub path: String,
    /// Whether the line carried the git diff tag
    pub is_diff: bool,
}

/// Byte range of the located section: label line through last bullet line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    /// Offset of the label line
    pub start: usize,
    /// Offset just past the last consumed line
    pub end: usize,
}

/// Parse result for the first references section of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReferences {
    /// File references in document order
    pub file_refs: Vec<FileRef>,
    /// URL references in document order
    pub url_refs: Vec<String>,
    /// Location of the section, when one was found
    pub section: Option<SectionSpan>,
}

impl ParsedReferences {
    /// Whether a references section was located.
    #[must_use]
    pub fn section_present(&self) -> bool {
        self.section.is_some()
    }
}

/// Result of synchronizing one document against its folder contents.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Document text after synchronization
    pub content: String,
    /// Whether the text differs from the input
    pub changed: bool,
    /// File names newly listed, sorted ascending
    pub added: Vec<String>,
    /// File names no longer listed, sorted ascending
    pub removed: Vec<String>,
}

/// Extract the label from a bold-marker line, e.g. `**References:**`.
fn bold_label(line: &str) -> Option<&str> {
    let inner = line.trim().strip_prefix("**")?.strip_suffix("**")?;
    Some(inner.strip_suffix(':').unwrap_or(inner))
}

/// Whether any line in the text is a bold-marker label with the given name.
#[must_use]
pub fn contains_bold_label(text: &str, label: &str) -> bool {
    text.lines().any(|line| bold_label(line) == Some(label))
}

/// Locate and scan the first references section.
///
/// Bullet lines are classified by their leading tag; lines with unknown
/// prefixes are consumed as part of the section but dropped. The scanner
/// stops at the first blank or non-bullet line.
#[must_use]
pub fn parse_references(text: &str) -> ParsedReferences {
    let mut lines = text.split_inclusive('\n');
    let mut offset = 0usize;
    let mut section_start = None;

    for line in &mut lines {
        let start = offset;
        offset += line.len();
        if bold_label(line) == Some(SECTION_LABEL) {
            section_start = Some(start);
            break;
        }
    }
    let Some(start) = section_start else {
        return ParsedReferences::default();
    };

    let mut file_refs = Vec::new();
    let mut url_refs = Vec::new();
    let mut end = offset;
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            break;
        }
        let Some(item) = trimmed.strip_prefix("- ") else {
            break;
        };
        offset += line.len();
        end = offset;
        match ReferenceEntry::classify(item.trim()) {
            Some(ReferenceEntry::LocalFile(path)) => file_refs.push(FileRef {
                path,
                is_diff: false,
            }),
            Some(ReferenceEntry::GitDiff(path)) => file_refs.push(FileRef {
                path,
                is_diff: true,
            }),
            Some(ReferenceEntry::Url(address)) => url_refs.push(address),
            None => {}
        }
    }

    ParsedReferences {
        file_refs,
        url_refs,
        section: Some(SectionSpan { start, end }),
    }
}

/// List the folder files that belong in the references section, sorted ascending.
#[must_use]
pub fn eligible_files(folder_files: &[String], config: &ScanConfig) -> Vec<String> {
    let mut files: Vec<String> = folder_files
        .iter()
        .filter(|name| config.is_reference_eligible(name))
        .cloned()
        .collect();
    files.sort();
    files
}

/// Build the canonical references section.
///
/// Pure function: label line, one bullet per file sorted ascending with the
/// diff tag applied to `.diff` names, then one bullet per URL in given order.
#[must_use]
pub fn generate_section(files: &[String], url_refs: &[String]) -> String {
    let mut names: Vec<&String> = files.iter().collect();
    names.sort();
    names.dedup();

    let mut section = format!("**{SECTION_LABEL}:**\n");
    for name in names {
        section.push_str(&ReferenceEntry::for_file(name).render());
        section.push('\n');
    }
    for url in url_refs {
        section.push_str(&ReferenceEntry::Url(url.clone()).render());
        section.push('\n');
    }
    section
}

/// Synchronize a document's references section with the folder's eligible files.
///
/// Returns the input unchanged when a section is present and its file set
/// already equals `eligible` (set equality, case-sensitive). Otherwise the
/// canonical section replaces the first located section in place, or is
/// appended after a blank line when none existed. `added`/`removed` carry
/// the set differences for observability.
#[must_use]
pub fn synchronize(document: &str, eligible: &[String]) -> SyncOutcome {
    let parsed = parse_references(document);
    let current: BTreeSet<&str> = parsed.file_refs.iter().map(|r| r.path.as_str()).collect();
    let desired: BTreeSet<&str> = eligible.iter().map(String::as_str).collect();

    if parsed.section_present() && current == desired {
        return SyncOutcome {
            content: document.to_string(),
            changed: false,
            added: Vec::new(),
            removed: Vec::new(),
        };
    }

    let added = desired.difference(&current).map(ToString::to_string).collect();
    let removed = current.difference(&desired).map(ToString::to_string).collect();
    let section = generate_section(eligible, &parsed.url_refs);

    let content = match parsed.section {
        Some(span) => {
            let mut text = String::with_capacity(document.len() + section.len());
            text.push_str(&document[..span.start]);
            text.push_str(&section);
            text.push_str(&document[span.end..]);
            text
        }
        None => {
            let mut text = document.to_string();
            if !text.is_empty() {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push('\n');
            }
            text.push_str(&section);
            text
        }
    };

    SyncOutcome {
        content,
        changed: true,
        added,
        removed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_classifies_by_leading_tag() {
        let text = "\
**References:**
- file:///a.json
- git+file:///b.diff
- https://example.com/docs
";
        let parsed = parse_references(text);
        assert!(parsed.section_present());
        assert_eq!(
            parsed.file_refs,
            vec![
                FileRef {
                    path: "a.json".to_string(),
                    is_diff: false
                },
                FileRef {
                    path: "b.diff".to_string(),
                    is_diff: true
                },
            ]
        );
        assert_eq!(parsed.url_refs, vec!["https://example.com/docs".to_string()]);
    }

    #[test]
    fn test_parse_drops_unknown_prefixes() {
        let text = "**References:**\n- ftp://weird\n- file:///kept.json\n";
        let parsed = parse_references(text);
        assert_eq!(parsed.file_refs.len(), 1);
        assert_eq!(parsed.file_refs[0].path, "kept.json");
        assert!(parsed.url_refs.is_empty());
    }

    #[test]
    fn test_parse_stops_at_blank_line() {
        let text = "**References:**\n- file:///a.json\n\n- file:///after-gap.json\n";
        let parsed = parse_references(text);
        assert_eq!(parsed.file_refs.len(), 1);
    }

    #[test]
    fn test_parse_stops_at_non_bullet_line() {
        let text = "**References:**\n- file:///a.json\n# Heading\n- file:///b.json\n";
        let parsed = parse_references(text);
        assert_eq!(parsed.file_refs.len(), 1);
    }

    #[test]
    fn test_parse_honors_first_section_only() {
        let text = "\
**References:**
- file:///first.json

**References:**
- file:///second.json
";
        let parsed = parse_references(text);
        assert_eq!(parsed.file_refs.len(), 1);
        assert_eq!(parsed.file_refs[0].path, "first.json");
    }

    #[test]
    fn test_parse_without_section() {
        let parsed = parse_references("# Nothing here\n");
        assert!(!parsed.section_present());
        assert!(parsed.file_refs.is_empty());
        assert!(parsed.url_refs.is_empty());
    }

    #[test]
    fn test_generate_sorts_files_and_appends_urls() {
        let section = generate_section(
            &names(&["b.diff", "a.json"]),
            &names(&["https://example.com/z", "https://example.com/a"]),
        );
        assert_eq!(
            section,
            "**References:**\n\
             - file:///a.json\n\
             - git+file:///b.diff\n\
             - https://example.com/z\n\
             - https://example.com/a\n"
        );
    }

    #[test]
    fn test_round_trip_recovers_files_and_urls() {
        let files = names(&["z.template.cfg", "a.json", "m.diff"]);
        let urls = names(&["https://example.com/one", "http://example.com/two"]);
        let parsed = parse_references(&generate_section(&files, &urls));

        let parsed_set: BTreeSet<&str> =
            parsed.file_refs.iter().map(|r| r.path.as_str()).collect();
        let file_set: BTreeSet<&str> = files.iter().map(String::as_str).collect();
        assert_eq!(parsed_set, file_set);
        assert_eq!(parsed.url_refs, urls);
    }

    #[test]
    fn test_synchronize_unchanged_when_set_matches() {
        let document = "\
**Prompt:**
Do the work.

**References:**
- git+file:///b.diff
- file:///a.json
";
        let outcome = synchronize(document, &names(&["a.json", "b.diff"]));
        assert!(!outcome.changed);
        assert_eq!(outcome.content, document);
        assert!(outcome.added.is_empty());
        assert!(outcome.removed.is_empty());
    }

    #[test]
    fn test_synchronize_replaces_stale_section_in_place() {
        let document = "\
**Prompt:**
Do the work.

**References:**
- file:///old.json
- https://example.com/kept

Trailing text.
";
        let outcome = synchronize(document, &names(&["new.json"]));
        assert!(outcome.changed);
        assert_eq!(outcome.added, vec!["new.json".to_string()]);
        assert_eq!(outcome.removed, vec!["old.json".to_string()]);
        assert_eq!(
            outcome.content,
            "\
**Prompt:**
Do the work.

**References:**
- file:///new.json
- https://example.com/kept

Trailing text.
"
        );
    }

    #[test]
    fn test_synchronize_appends_missing_section() {
        let document = "**Prompt:**\nDo the work.\n";
        let outcome = synchronize(document, &names(&["a.json", "b.diff"]));
        assert!(outcome.changed);
        assert_eq!(
            outcome.content,
            "**Prompt:**\nDo the work.\n\n**References:**\n- file:///a.json\n- git+file:///b.diff\n"
        );
    }

    #[test]
    fn test_synchronize_rewrites_present_but_empty_set_mismatch() {
        // Section present with an empty bullet list, folder has files.
        let document = "**References:**\n";
        let outcome = synchronize(document, &names(&["a.json"]));
        assert!(outcome.changed);
        assert_eq!(outcome.content, "**References:**\n- file:///a.json\n");
    }

    #[test]
    fn test_synchronize_is_idempotent() {
        let document = "**Prompt:**\nWork.\n";
        let eligible = names(&["b.diff", "a.json"]);
        let first = synchronize(document, &eligible);
        assert!(first.changed);
        let second = synchronize(&first.content, &eligible);
        assert!(!second.changed);
        assert_eq!(second.content, first.content);
    }

    #[test]
    fn test_eligible_files_filters_and_sorts() {
        let config = ScanConfig::default();
        let files = names(&["task.md", "README.md", "b.diff", "a.json", "x.exe"]);
        assert_eq!(
            eligible_files(&files, &config),
            names(&["a.json", "b.diff"])
        );
    }

    #[test]
    fn test_contains_bold_label() {
        let text = "intro\n**Prompt:**\nbody\n";
        assert!(contains_bold_label(text, "Prompt"));
        assert!(!contains_bold_label(text, "References"));
        assert!(!contains_bold_label("plain Prompt mention", "Prompt"));
    }
}

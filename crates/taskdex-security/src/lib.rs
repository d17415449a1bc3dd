//! taskdex-security - Content pattern scanning for task documents
//!
//! Features:
//! - O(n) linear-time regex matching via RegexSet
//! - Pre-compiled patterns at startup (Lazy static)
//! - One violation reported per distinct rule matched
//!
//! Two severities exist: forbidden patterns block a document outright,
//! heuristic patterns only produce warnings. Both are exposed through the
//! same immutable [`PatternPolicy`] handle so callers receive the policy at
//! construction instead of reaching into module state.

use once_cell::sync::Lazy;
use regex::RegexSet;
use serde::Serialize;

/// A rule identifier plus its human-readable description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternRule {
    /// Stable rule identifier (e.g., "dynamic-eval")
    pub id: &'static str,
    /// Human-readable description of what the rule detects
    pub description: &'static str,
}

/// One rule matched during a scan.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PatternViolation {
    /// Stable rule identifier (e.g., "dynamic-eval")
    pub rule_id: String,
    /// Human-readable description of the matched rule
    pub description: String,
}

/// Rule table for blocking content. Order must mirror `FORBIDDEN_SET`.
const FORBIDDEN_RULES: &[PatternRule] = &[
    PatternRule {
        id: "dynamic-eval",
        description: "Dynamic code evaluation",
    },
    PatternRule {
        id: "dynamic-exec",
        description: "Dynamic code execution",
    },
    PatternRule {
        id: "shell-spawn",
        description: "Shell command injection",
    },
    PatternRule {
        id: "root-delete",
        description: "Recursive delete of filesystem root",
    },
    PatternRule {
        id: "privilege-escalation",
        description: "Privilege escalation via sudo",
    },
    PatternRule {
        id: "pipe-to-shell",
        description: "Remote download piped into a shell",
    },
];

static FORBIDDEN_SET: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)\beval\s*\(",
        r"(?i)\bexec\s*\(",
        r"(?i)os\.system\s*\(|shell\s*=\s*true",
        r"(?i)\brm\s+-(?:rf|fr)\s+/(?:\s|\*|$)",
        r"(?i)\bsudo\s+\S",
        r"(?i)\b(?:curl|wget)\b[^\n]*\|\s*(?:ba|z|da)?sh\b",
    ])
    .expect("Failed to compile forbidden patterns")
});

/// Rule table for warning-level content. Order must mirror `HEURISTIC_SET`.
const HEURISTIC_RULES: &[PatternRule] = &[
    PatternRule {
        id: "instruction-override",
        description: "Instruction-override phrasing",
    },
    PatternRule {
        id: "recursive-delete",
        description: "Recursive filesystem delete",
    },
    PatternRule {
        id: "disk-format",
        description: "Disk formatting command",
    },
    PatternRule {
        id: "raw-device-write",
        description: "Raw write to a block device",
    },
];

static HEURISTIC_SET: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"(?i)\b(?:ignore|disregard)\s+(?:all\s+)?(?:previous|prior|earlier)\s+instructions\b",
        r"(?i)\brm\s+-[a-z]*r[a-z]*\b",
        r"(?i)\bmkfs(?:\.[a-z0-9]+)?\b|\bformat\s+c:",
        r"(?i)\bdd\b[^\n]*\bof=/dev/",
    ])
    .expect("Failed to compile heuristic patterns")
});

/// Immutable scanning policy: a compiled pattern set plus its rule table.
///
/// Policies are cheap to copy and are injected into callers at construction.
#[derive(Debug, Clone, Copy)]
pub struct PatternPolicy {
    set: &'static Lazy<RegexSet>,
    rules: &'static [PatternRule],
}

impl PatternPolicy {
    /// Policy for blocking content (errors).
    #[must_use]
    pub fn forbidden() -> Self {
        Self {
            set: &FORBIDDEN_SET,
            rules: FORBIDDEN_RULES,
        }
    }

    /// Policy for suspicious content (warnings).
    #[must_use]
    pub fn heuristics() -> Self {
        Self {
            set: &HEURISTIC_SET,
            rules: HEURISTIC_RULES,
        }
    }

    /// The rule table backing this policy.
    #[must_use]
    pub fn rules(&self) -> &'static [PatternRule] {
        self.rules
    }

    /// Scan content and return every distinct rule matched.
    ///
    /// RegexSet reports each pattern at most once, so the result carries one
    /// violation per matched rule regardless of how often the text hits it.
    #[must_use]
    pub fn scan_all(&self, content: &str) -> Vec<PatternViolation> {
        let matches = self.set.matches(content);
        let mut violations = Vec::new();

        for idx in matches.iter() {
            if let Some(rule) = self.rules.get(idx) {
                violations.push(PatternViolation {
                    rule_id: rule.id.to_string(),
                    description: rule.description.to_string(),
                });
            }
        }
        violations
    }

    /// Check whether content matches any rule (boolean check only).
    #[must_use]
    pub fn is_match(&self, content: &str) -> bool {
        self.set.is_match(content)
    }
}

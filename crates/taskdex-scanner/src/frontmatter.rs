//! Frontmatter Extractor - Flat key/value metadata block at the head of a document.
//!
//! Only a flat scalar subset is recognized: the block is delimited by a
//! leading `---` line and a matching closing `---` line, and every line in
//! between is read as `key: value`. Malformed lines are silently skipped.
//! A document without an opening marker is not an error; an opening marker
//! without a closing one is.

use std::collections::BTreeMap;

use crate::error::FrontmatterError;

/// Delimiter line for the metadata block.
const MARKER: &str = "---";

/// Flat string-to-string metadata mapping.
pub type Frontmatter = BTreeMap<String, String>;

/// Extract the frontmatter mapping and the remaining body text.
///
/// Returns an empty mapping and the whole text as body when no block is
/// present. Fails only when the opening marker exists but the closing
/// marker does not.
///
/// # Errors
///
/// `FrontmatterError::Unterminated` when the block is never closed.
pub fn extract_frontmatter(content: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let mut lines = content.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return Ok((Frontmatter::new(), String::new()));
    };
    if first.trim_end() != MARKER {
        return Ok((Frontmatter::new(), content.to_string()));
    }

    let mut mapping = Frontmatter::new();
    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        if line.trim_end() == MARKER {
            return Ok((mapping, content[offset..].to_string()));
        }
        if let Some((key, value)) = parse_scalar_line(line) {
            mapping.insert(key, value);
        }
    }

    Err(FrontmatterError::Unterminated)
}

/// Parse one `key: value` line; `None` for malformed lines.
fn parse_scalar_line(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), unquote(value.trim()).to_string()))
}

/// Strip one pair of matching surrounding quotes, if present.
fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

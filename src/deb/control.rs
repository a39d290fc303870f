//! Parsing of `Key: value` control files.

use std::collections::BTreeMap;

use super::error::{Error, Result};

/// Parse control file text into a field map.
///
/// Lines starting with a space or tab continue the previous field: the line,
/// minus its first character, is appended after a newline. Blank lines are
/// ignored. When a key repeats, the last value wins.
///
/// # Errors
///
/// Returns [`Error::InvalidField`] for a line without a `: ` separator
/// (including a key with nothing after its colon), or a continuation line
/// that precedes every key.
pub fn parse_fields(text: &str) -> Result<BTreeMap<String, String>> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    let mut prev: Option<String> = None;

    for line in text.split('\n') {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if line.starts_with([' ', '\t']) {
            let value = prev
                .as_ref()
                .and_then(|key| fields.get_mut(key))
                .ok_or_else(|| Error::InvalidField(line.to_string()))?;
            value.push('\n');
            value.push_str(&line[1..]);
            continue;
        }

        let (key, value) = trimmed
            .split_once(": ")
            .ok_or_else(|| Error::InvalidField(line.to_string()))?;

        fields.insert(key.to_string(), value.to_string());
        prev = Some(key.to_string());
    }

    Ok(fields)
}

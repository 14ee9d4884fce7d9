//! Membership, idempotent insert, and removal for PATH values.
//!
//! Comparison always happens on the expanded canonical form, so a stored
//! `%APPDATA%\npm` and its expanded equivalent are one entry. Insertion
//! appends at the end of the sequence, never prepends, so new tool
//! directories cannot shadow system-critical tools earlier in the order.

use super::entry::{EnvLookup, PathEntry};
use super::value::PathValue;

/// Whether an equivalent entry is already present.
pub fn contains(value: &PathValue, candidate: &PathEntry) -> bool {
    value
        .entries()
        .iter()
        .any(|entry| entry.same_directory(candidate))
}

/// Insert a candidate at the end unless an equivalent entry exists.
///
/// Returns the (possibly unchanged) value and whether it changed. The
/// no-op branch is what makes repeated installer runs idempotent.
pub fn insert(value: PathValue, candidate: PathEntry) -> (PathValue, bool) {
    if candidate.is_empty() || contains(&value, &candidate) {
        return (value, false);
    }
    (value.with_appended(candidate), true)
}

/// Remove every segment equivalent to the candidate.
///
/// Returns the (possibly unchanged) value and whether anything was
/// removed.
pub fn remove(value: PathValue, candidate: &PathEntry) -> (PathValue, bool) {
    let (value, removed) = value.without(candidate);
    (value, removed > 0)
}

/// Normalize a directory to its portable raw form for persistence.
///
/// A directory under the profile's `AppData\Roaming` is rewritten to the
/// `%APPDATA%` token form so the stored value survives profile moves and
/// renames. Anything else is persisted verbatim.
pub fn to_portable_raw(directory: &str, env_fn: &EnvLookup) -> String {
    let trimmed = directory.trim();
    let Some(appdata) = env_fn("APPDATA") else {
        return trimmed.to_string();
    };
    if appdata.is_empty() {
        return trimmed.to_string();
    }

    let appdata_trimmed = appdata.trim_end_matches(['\\', '/']);
    let Some(prefix) = trimmed.get(..appdata_trimmed.len()) else {
        return trimmed.to_string();
    };
    if !prefix.eq_ignore_ascii_case(appdata_trimmed) {
        return trimmed.to_string();
    }

    let rest = &trimmed[appdata_trimmed.len()..];
    if rest.is_empty() {
        return "%APPDATA%".to_string();
    }
    if let Some(stripped) = rest.strip_prefix('\\').or_else(|| rest.strip_prefix('/')) {
        return format!("%APPDATA%\\{stripped}");
    }
    // Prefix match fell inside a path component (e.g. `...\RoamingX`)
    trimmed.to_string()
}

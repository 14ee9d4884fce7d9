//! An ordered PATH value for one scope.
//!
//! Order is significant (it determines resolution precedence) and the
//! stored string type matters just as much: a value containing `%VAR%`
//! tokens must round-trip as the expandable registry type, otherwise the
//! host OS hands every shell the literal percent signs. Misclassifying
//! the type on write is the most common PATH corruption mode this crate
//! exists to avoid.

use super::entry::{EnvLookup, PathEntry};

/// Separator between PATH segments in the stored string.
pub const PATH_SEPARATOR: char = ';';

/// How the value is stored: plain string or expandable string.
///
/// Maps to `REG_SZ` vs `REG_EXPAND_SZ` in the Windows registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Plain,
    Expandable,
}

/// Ordered sequence of [`PathEntry`] for one scope.
#[derive(Debug, Clone)]
pub struct PathValue {
    entries: Vec<PathEntry>,
    kind: ValueKind,
}

impl PathValue {
    /// An empty value. A scope with no stored `Path` value (legal for
    /// User scope on a fresh profile) reads as this.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            kind: ValueKind::Expandable,
        }
    }

    /// Parse a stored string into entries, splitting on `;`.
    ///
    /// Empty segments are preserved exactly as stored. Silently "fixing"
    /// an already-broken value on read would mask the very drift this
    /// subsystem is supposed to diagnose.
    pub fn parse_with_env(raw: &str, kind: ValueKind, env_fn: &EnvLookup) -> Self {
        if raw.is_empty() {
            return Self {
                entries: Vec::new(),
                kind,
            };
        }
        let entries = raw
            .split(PATH_SEPARATOR)
            .map(|segment| PathEntry::parse_with_env(segment, env_fn))
            .collect();
        Self { entries, kind }
    }

    /// Build a value from entries, keeping the given stored kind.
    pub fn from_entries(entries: Vec<PathEntry>, kind: ValueKind) -> Self {
        Self { entries, kind }
    }

    /// The entries in stored order.
    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    /// The kind the value was stored as.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Serialize back to the raw stored string (tokens preserved).
    pub fn serialize(&self) -> String {
        let segments: Vec<&str> = self.entries.iter().map(PathEntry::raw).collect();
        segments.join(";")
    }

    /// The kind this value must be written back as.
    ///
    /// Critical invariant: any raw segment containing a `%VAR%` token
    /// forces the expandable type. An unmodified value keeps its original
    /// classification, so read→write→read is a no-op.
    pub fn kind_for_write(&self) -> ValueKind {
        if self.entries.iter().any(PathEntry::has_tokens) {
            ValueKind::Expandable
        } else {
            self.kind
        }
    }

    /// Number of segments, empty ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the value has no segments at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry at the end, returning the new value.
    pub fn with_appended(mut self, entry: PathEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Remove all entries matching the given directory, returning the
    /// new value and how many segments were dropped.
    pub fn without(mut self, target: &PathEntry) -> (Self, usize) {
        let before = self.entries.len();
        self.entries.retain(|e| !e.same_directory(target));
        let removed = before - self.entries.len();
        (self, removed)
    }
}

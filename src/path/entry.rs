//! A single PATH entry with raw and expanded forms.
//!
//! The raw form is what gets persisted to the environment store; keeping
//! `%APPDATA%`-style tokens intact preserves portability across user
//! profiles. The expanded form is what membership tests compare, so
//! `%APPDATA%\npm` and `C:\Users\jo\AppData\Roaming\npm` are recognized
//! as the same entry regardless of how either is stored.
//!
//! Expansion takes an injected lookup function instead of reading the
//! process environment directly, so tests never have to mutate real
//! environment variables.

use std::sync::Arc;

/// Environment variable lookup used for token expansion.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Build an [`EnvLookup`] backed by the process environment.
pub fn process_env() -> EnvLookup {
    Arc::new(|name: &str| std::env::var(name).ok())
}

/// Expand `%VAR%` tokens in a path string.
///
/// Unknown variables are left as literal `%VAR%` text, matching how the
/// host OS treats an unexpandable token. A lone `%` is passed through
/// unchanged.
pub fn expand_tokens(raw: &str, env_fn: &EnvLookup) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find('%') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match env_fn(name) {
                    Some(value) if !name.is_empty() => {
                        result.push_str(&value);
                    }
                    _ => {
                        // Keep the literal token, delimiters included
                        result.push('%');
                        result.push_str(name);
                        result.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unpaired '%', keep it literal
                result.push('%');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// A single directory entry in a PATH value.
///
/// Invariant: equality and membership use the canonical comparison key;
/// the raw form is what gets written back to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    raw: String,
    expanded: String,
}

impl PathEntry {
    /// Parse a raw segment, expanding tokens via the given lookup.
    pub fn parse_with_env(raw: &str, env_fn: &EnvLookup) -> Self {
        let expanded = expand_tokens(raw, env_fn);
        Self {
            raw: raw.to_string(),
            expanded,
        }
    }

    /// The raw form as stored (tokens preserved).
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The fully expanded form.
    pub fn expanded(&self) -> &str {
        &self.expanded
    }

    /// Canonical key for case-insensitive membership comparison.
    ///
    /// Trailing path separators are ignored so `C:\Tools\` and `C:\Tools`
    /// compare equal, and forward slashes fold into backslashes the way
    /// the host filesystem treats them.
    pub fn comparison_key(&self) -> String {
        self.expanded
            .trim()
            .trim_end_matches(['\\', '/'])
            .replace('/', "\\")
            .to_lowercase()
    }

    /// Whether this entry is an empty segment (e.g. from `;;` in the
    /// stored value). Empty segments are preserved verbatim on write but
    /// never participate in membership tests.
    pub fn is_empty(&self) -> bool {
        self.raw.trim().is_empty()
    }

    /// Whether two entries refer to the same directory.
    pub fn same_directory(&self, other: &PathEntry) -> bool {
        !self.is_empty() && !other.is_empty() && self.comparison_key() == other.comparison_key()
    }

    /// Whether the raw form still contains unexpanded `%VAR%` tokens.
    pub fn has_tokens(&self) -> bool {
        has_token(&self.raw)
    }
}

/// Whether a raw string contains a `%VAR%` token.
pub fn has_token(raw: &str) -> bool {
    let Some(start) = raw.find('%') else {
        return false;
    };
    raw[start + 1..].contains('%')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn fake_env(vars: &[(&str, &str)]) -> EnvLookup {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(move |name: &str| map.get(name).cloned())
    }

    #[test]
    fn expands_known_token() {
        let env = fake_env(&[("APPDATA", r"C:\Users\jo\AppData\Roaming")]);
        let expanded = expand_tokens(r"%APPDATA%\npm", &env);
        assert_eq!(expanded, r"C:\Users\jo\AppData\Roaming\npm");
    }

    #[test]
    fn unknown_token_stays_literal() {
        let env = fake_env(&[]);
        let expanded = expand_tokens(r"%NOPE%\bin", &env);
        assert_eq!(expanded, r"%NOPE%\bin");
    }

    #[test]
    fn unpaired_percent_passes_through() {
        let env = fake_env(&[]);
        assert_eq!(expand_tokens("100% done", &env), "100% done");
    }

    #[test]
    fn multiple_tokens_expand() {
        let env = fake_env(&[("A", "one"), ("B", "two")]);
        assert_eq!(expand_tokens(r"%A%\mid\%B%", &env), r"one\mid\two");
    }

    #[test]
    fn empty_token_name_stays_literal() {
        let env = fake_env(&[]);
        assert_eq!(expand_tokens("%%", &env), "%%");
    }

    #[test]
    fn comparison_key_is_case_insensitive() {
        let env = fake_env(&[]);
        let a = PathEntry::parse_with_env(r"C:\Tools", &env);
        let b = PathEntry::parse_with_env(r"c:\tools", &env);
        assert!(a.same_directory(&b));
    }

    #[test]
    fn comparison_key_ignores_trailing_separator() {
        let env = fake_env(&[]);
        let a = PathEntry::parse_with_env(r"C:\Tools\", &env);
        let b = PathEntry::parse_with_env(r"C:\Tools", &env);
        assert!(a.same_directory(&b));
    }

    #[test]
    fn token_and_expanded_forms_compare_equal() {
        let env = fake_env(&[("APPDATA", r"C:\Users\jo\AppData\Roaming")]);
        let token = PathEntry::parse_with_env(r"%APPDATA%\npm", &env);
        let literal = PathEntry::parse_with_env(r"C:\Users\jo\AppData\Roaming\npm", &env);
        assert!(token.same_directory(&literal));
        // Raw form keeps the token
        assert_eq!(token.raw(), r"%APPDATA%\npm");
    }

    #[test]
    fn empty_segment_never_matches() {
        let env = fake_env(&[]);
        let empty = PathEntry::parse_with_env("", &env);
        let other = PathEntry::parse_with_env("", &env);
        assert!(empty.is_empty());
        assert!(!empty.same_directory(&other));
    }

    #[test]
    fn has_tokens_detects_pairs_only() {
        let env = fake_env(&[]);
        assert!(PathEntry::parse_with_env("%APPDATA%\\npm", &env).has_tokens());
        assert!(!PathEntry::parse_with_env("C:\\100%", &env).has_tokens());
        assert!(!PathEntry::parse_with_env("C:\\plain", &env).has_tokens());
    }
}

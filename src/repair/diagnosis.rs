//! Drift classification between discovered installs and the stored PATH.

use crate::path::entry::{EnvLookup, PathEntry};
use crate::path::{resolver, PathValue};
use crate::repair::discovery::DiscoveredInstall;
use serde::Serialize;

/// How a tool's discovered location relates to the stored PATH.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnosis {
    /// The discovered directory is registered correctly.
    AlreadyCorrect { directory: String },

    /// The tool exists on disk but its directory is not on the stored
    /// PATH.
    MissingFromPath { directory: String },

    /// A canonical match exists but the stored raw form differs from
    /// the portable form this subsystem would persist (e.g. a literal
    /// profile path where the `%APPDATA%` token belongs).
    PresentButWrongForm {
        directory: String,
        stored_raw: String,
        expected_raw: String,
    },

    /// Discovery found no installation at any known location.
    NotInstalled,
}

impl Diagnosis {
    /// Whether this diagnosis calls for a PATH mutation.
    pub fn needs_repair(&self) -> bool {
        matches!(
            self,
            Diagnosis::MissingFromPath { .. } | Diagnosis::PresentButWrongForm { .. }
        )
    }
}

/// Classify the first discovered install against the scope's stored
/// PATH value.
pub fn diagnose(
    discovered: &[DiscoveredInstall],
    value: &PathValue,
    env_fn: &EnvLookup,
) -> Diagnosis {
    let Some(install) = discovered.first() else {
        return Diagnosis::NotInstalled;
    };

    let directory = install.directory.to_string_lossy().to_string();
    let expected_raw = resolver::to_portable_raw(&directory, env_fn);
    let candidate = PathEntry::parse_with_env(&expected_raw, env_fn);

    if !resolver::contains(value, &candidate) {
        return Diagnosis::MissingFromPath { directory };
    }

    // Canonically present; flag a raw form that would not survive a
    // profile move when the portable form is the token
    let stored = value
        .entries()
        .iter()
        .find(|entry| entry.same_directory(&candidate))
        .map(|entry| entry.raw().to_string())
        .unwrap_or_default();

    if crate::path::entry::has_token(&expected_raw) && stored != expected_raw {
        return Diagnosis::PresentButWrongForm {
            directory,
            stored_raw: stored,
            expected_raw,
        };
    }

    Diagnosis::AlreadyCorrect { directory }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ValueKind;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn fake_env(vars: &[(&str, &str)]) -> EnvLookup {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(move |name: &str| map.get(name).cloned())
    }

    fn install(directory: &str) -> Vec<DiscoveredInstall> {
        vec![DiscoveredInstall {
            directory: PathBuf::from(directory),
            executable: "tool.cmd".to_string(),
        }]
    }

    #[test]
    fn no_discovery_is_not_installed() {
        let env = fake_env(&[]);
        let value = PathValue::parse_with_env(r"C:\a", ValueKind::Plain, &env);
        assert_eq!(diagnose(&[], &value, &env), Diagnosis::NotInstalled);
        assert!(!Diagnosis::NotInstalled.needs_repair());
    }

    #[test]
    fn absent_directory_is_missing_from_path() {
        let env = fake_env(&[]);
        let value = PathValue::parse_with_env(r"C:\other", ValueKind::Plain, &env);

        let diagnosis = diagnose(&install(r"C:\nodejs"), &value, &env);

        assert_eq!(
            diagnosis,
            Diagnosis::MissingFromPath {
                directory: r"C:\nodejs".to_string()
            }
        );
        assert!(diagnosis.needs_repair());
    }

    #[test]
    fn registered_directory_is_already_correct() {
        let env = fake_env(&[]);
        let value = PathValue::parse_with_env(r"C:\other;C:\nodejs", ValueKind::Plain, &env);

        let diagnosis = diagnose(&install(r"C:\nodejs"), &value, &env);
        assert!(matches!(diagnosis, Diagnosis::AlreadyCorrect { .. }));
    }

    #[test]
    fn literal_profile_path_is_wrong_form() {
        let appdata = r"C:\Users\jo\AppData\Roaming";
        let env = fake_env(&[("APPDATA", appdata)]);
        // Stored as the literal expansion, not the portable token
        let stored_raw = format!(r"{appdata}\npm");
        let value = PathValue::parse_with_env(&stored_raw, ValueKind::Plain, &env);

        let diagnosis = diagnose(&install(&stored_raw), &value, &env);

        match diagnosis {
            Diagnosis::PresentButWrongForm {
                stored_raw: stored,
                expected_raw,
                ..
            } => {
                assert_eq!(stored, stored_raw);
                assert_eq!(expected_raw, r"%APPDATA%\npm");
            }
            other => panic!("expected PresentButWrongForm, got {other:?}"),
        }
    }

    #[test]
    fn token_form_stored_is_already_correct() {
        let env = fake_env(&[("APPDATA", r"C:\Users\jo\AppData\Roaming")]);
        let value = PathValue::parse_with_env(r"%APPDATA%\npm", ValueKind::Expandable, &env);

        let diagnosis = diagnose(
            &install(r"C:\Users\jo\AppData\Roaming\npm"),
            &value,
            &env,
        );
        assert!(matches!(diagnosis, Diagnosis::AlreadyCorrect { .. }));
    }
}

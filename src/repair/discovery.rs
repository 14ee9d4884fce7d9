//! Install-location discovery.
//!
//! Probes each tool's known install-root conventions on disk,
//! independent of whatever the stored PATH currently claims. The
//! registry can lie after a partial install; the filesystem is the
//! ground truth discovery reports from.

use crate::path::entry::{EnvLookup, expand_tokens};
use crate::tools::ToolDescriptor;
use std::path::PathBuf;

/// One location where a tool's executable actually exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredInstall {
    /// The directory to register on PATH (never the file itself).
    pub directory: PathBuf,
    /// The executable file name found inside it.
    pub executable: String,
}

/// Probe all known install roots for a tool.
///
/// Returns every root that exists and contains one of the tool's
/// executable candidates, in descriptor order. An empty result means
/// the tool is not installed anywhere this subsystem knows to look;
/// that feeds diagnosis, it is not an error.
pub fn discover(tool: &ToolDescriptor, env_fn: &EnvLookup) -> Vec<DiscoveredInstall> {
    let mut found = Vec::new();

    for root in &tool.install_roots {
        let expanded = expand_tokens(root, env_fn);
        let root_path = PathBuf::from(&expanded);
        if !root_path.is_dir() {
            continue;
        }
        for candidate in tool.executable_candidates() {
            if root_path.join(&candidate).is_file() {
                tracing::debug!(tool = %tool.name, directory = %root_path.display(), "found installation");
                found.push(DiscoveredInstall {
                    directory: root_path.clone(),
                    executable: candidate,
                });
                break;
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PathScope;
    use std::collections::HashMap;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn fake_env(vars: &[(&str, &str)]) -> EnvLookup {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(move |name: &str| map.get(name).cloned())
    }

    fn tool_with_roots(command: &str, roots: Vec<String>) -> ToolDescriptor {
        ToolDescriptor {
            name: command.to_string(),
            command: command.to_string(),
            version_args: vec!["--version".to_string()],
            path_patterns: vec![],
            install_roots: roots,
            scope: PathScope::User,
            version_pattern: None,
        }
    }

    #[test]
    fn finds_executable_in_existing_root() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("mytool.cmd"), "@echo off\n").unwrap();
        let dir = temp.path().to_string_lossy().to_string();

        let found = discover(&tool_with_roots("mytool", vec![dir]), &fake_env(&[]));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].directory, temp.path());
        assert_eq!(found[0].executable, "mytool.cmd");
    }

    #[test]
    fn expands_tokens_in_roots() {
        let temp = TempDir::new().unwrap();
        let npm_dir = temp.path().join("npm");
        fs::create_dir_all(&npm_dir).unwrap();
        fs::write(npm_dir.join("claude.cmd"), "@echo off\n").unwrap();

        let env = fake_env(&[("APPDATA", &temp.path().to_string_lossy())]);
        let found = discover(
            &tool_with_roots("claude", vec!["%APPDATA%/npm".to_string()]),
            &env,
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].directory, npm_dir);
    }

    #[test]
    fn missing_roots_yield_empty() {
        let found = discover(
            &tool_with_roots("ghost", vec!["/nonexistent/a".to_string()]),
            &fake_env(&[]),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn directory_without_executable_is_skipped() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_string_lossy().to_string();

        let found = discover(&tool_with_roots("mytool", vec![dir]), &fake_env(&[]));
        assert!(found.is_empty());
    }

    #[test]
    fn prefers_exe_over_cmd_within_a_root() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("mytool.exe"), "MZ").unwrap();
        fs::write(temp.path().join("mytool.cmd"), "@echo off\n").unwrap();
        let dir = temp.path().to_string_lossy().to_string();

        let found = discover(&tool_with_roots("mytool", vec![dir]), &fake_env(&[]));
        assert_eq!(found[0].executable, "mytool.exe");
    }
}

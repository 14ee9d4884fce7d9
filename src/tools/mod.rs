//! Tool descriptors and the builtin catalog.
//!
//! A [`ToolDescriptor`] names everything the verification and repair
//! subsystems need to know about one command-line tool: how to invoke
//! it, where installers conventionally put it, and which PATH scope it
//! should live in.

use crate::registry::PathScope;
use serde::{Deserialize, Serialize};

/// Windows executable suffixes probed for each command, most specific
/// first. The bare name is included last so non-suffixed launchers are
/// still found.
pub const EXECUTABLE_SUFFIXES: &[&str] = &[".exe", ".cmd", ".bat", ""];

/// Everything the subsystem knows about one tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Display name (e.g. "Claude CLI").
    pub name: String,

    /// Command invoked on the PATH (e.g. "claude").
    pub command: String,

    /// Arguments for the version query.
    #[serde(default = "default_version_args")]
    pub version_args: Vec<String>,

    /// Substrings expected in a PATH entry that serves this tool
    /// (e.g. "npm" for npm-installed CLIs).
    #[serde(default)]
    pub path_patterns: Vec<String>,

    /// Install-root directories to probe, raw form (tokens allowed).
    #[serde(default)]
    pub install_roots: Vec<String>,

    /// The scope this tool's directory should live in.
    #[serde(default = "default_scope")]
    pub scope: PathScope,

    /// Regex the version output must match. None accepts any non-empty
    /// output.
    #[serde(default)]
    pub version_pattern: Option<String>,
}

fn default_version_args() -> Vec<String> {
    vec!["--version".to_string()]
}

fn default_scope() -> PathScope {
    PathScope::User
}

impl ToolDescriptor {
    /// Executable file names to probe for this command, in preference
    /// order.
    pub fn executable_candidates(&self) -> Vec<String> {
        EXECUTABLE_SUFFIXES
            .iter()
            .map(|suffix| format!("{}{}", self.command, suffix))
            .collect()
    }
}

/// The builtin tool catalog: the CLIs this utility provisions PATH
/// entries for, with install roots covering official installers,
/// Chocolatey, and npm global packages.
pub fn builtin_catalog() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "Git".to_string(),
            command: "git".to_string(),
            version_args: default_version_args(),
            path_patterns: vec![r"Git\cmd".to_string(), r"Git\bin".to_string()],
            install_roots: vec![
                r"C:\Program Files\Git\cmd".to_string(),
                r"C:\Program Files\Git\bin".to_string(),
                r"C:\Program Files (x86)\Git\cmd".to_string(),
                r"C:\Program Files (x86)\Git\bin".to_string(),
                r"C:\ProgramData\chocolatey\lib\git.install\tools\cmd".to_string(),
            ],
            scope: PathScope::Machine,
            version_pattern: Some(r"git version \d+".to_string()),
        },
        ToolDescriptor {
            name: "Node.js".to_string(),
            command: "node".to_string(),
            version_args: default_version_args(),
            path_patterns: vec!["nodejs".to_string()],
            install_roots: vec![
                r"C:\Program Files\nodejs".to_string(),
                r"C:\Program Files (x86)\nodejs".to_string(),
                r"C:\ProgramData\chocolatey\lib\nodejs\tools".to_string(),
            ],
            scope: PathScope::Machine,
            version_pattern: Some(r"v\d+\.\d+".to_string()),
        },
        ToolDescriptor {
            name: "npm".to_string(),
            command: "npm".to_string(),
            version_args: default_version_args(),
            path_patterns: vec!["nodejs".to_string(), "npm".to_string()],
            install_roots: vec![
                r"C:\Program Files\nodejs".to_string(),
                r"%APPDATA%\npm".to_string(),
            ],
            scope: PathScope::Machine,
            version_pattern: Some(r"\d+\.\d+\.\d+".to_string()),
        },
        ToolDescriptor {
            name: "Claude CLI".to_string(),
            command: "claude".to_string(),
            version_args: default_version_args(),
            path_patterns: vec!["npm".to_string()],
            install_roots: vec![r"%APPDATA%\npm".to_string()],
            scope: PathScope::User,
            version_pattern: Some(r"\d+\.\d+".to_string()),
        },
        ToolDescriptor {
            name: "Gemini CLI".to_string(),
            command: "gemini".to_string(),
            version_args: default_version_args(),
            path_patterns: vec!["npm".to_string()],
            install_roots: vec![r"%APPDATA%\npm".to_string()],
            scope: PathScope::User,
            version_pattern: Some(r"\d+\.\d+".to_string()),
        },
    ]
}

/// Find a descriptor by command name, case-insensitively.
pub fn find_tool<'a>(catalog: &'a [ToolDescriptor], command: &str) -> Option<&'a ToolDescriptor> {
    catalog
        .iter()
        .find(|tool| tool.command.eq_ignore_ascii_case(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_cover_windows_suffixes() {
        let tool = &builtin_catalog()[3];
        let candidates = tool.executable_candidates();
        assert_eq!(
            candidates,
            vec!["claude.exe", "claude.cmd", "claude.bat", "claude"]
        );
    }

    #[test]
    fn catalog_contains_expected_tools() {
        let catalog = builtin_catalog();
        let commands: Vec<&str> = catalog.iter().map(|t| t.command.as_str()).collect();
        assert_eq!(commands, vec!["git", "node", "npm", "claude", "gemini"]);
    }

    #[test]
    fn npm_installed_tools_live_in_user_scope() {
        let catalog = builtin_catalog();
        let claude = find_tool(&catalog, "claude").unwrap();
        assert_eq!(claude.scope, PathScope::User);
        assert!(claude
            .install_roots
            .iter()
            .any(|root| root.contains("%APPDATA%")));
    }

    #[test]
    fn find_tool_is_case_insensitive() {
        let catalog = builtin_catalog();
        assert!(find_tool(&catalog, "GIT").is_some());
        assert!(find_tool(&catalog, "unknown").is_none());
    }

    #[test]
    fn descriptor_deserializes_with_defaults() {
        let yaml = "name: Deno\ncommand: deno\n";
        let tool: ToolDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(tool.version_args, vec!["--version"]);
        assert_eq!(tool.scope, PathScope::User);
        assert!(tool.install_roots.is_empty());
        assert!(tool.version_pattern.is_none());
    }
}

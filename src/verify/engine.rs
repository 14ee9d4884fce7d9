//! The three-tier verification engine.
//!
//! Tier 1 searches the tool's known install roots for an executable.
//! Tier 2 checks the stored PATH for the executable's directory (or a
//! pattern-matched ancestor). Tier 3 runs the version query in a fresh
//! process. The tiers are always all evaluated; diagnosis needs to
//! distinguish "not installed" from "installed but not on PATH" from
//! "on PATH but broken".

use crate::path::entry::{process_env, EnvLookup, PathEntry};
use crate::path::{expand_tokens, resolver, PathValue};
use crate::registry::{EnvironmentStore, PathScope};
use crate::tools::ToolDescriptor;
use crate::verify::execution::{self, ExecutionOutput};
use crate::verify::result::{TierCheck, VerificationResult};
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default execution-test timeout.
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the three verification tiers against the environment store.
pub struct VerificationEngine {
    store: Arc<dyn EnvironmentStore>,
    env_fn: EnvLookup,
    timeout: Duration,
}

impl VerificationEngine {
    pub fn new(store: Arc<dyn EnvironmentStore>) -> Self {
        Self {
            store,
            env_fn: process_env(),
            timeout: DEFAULT_EXECUTION_TIMEOUT,
        }
    }

    /// Override the execution-test timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the token-expansion lookup (tests).
    pub fn with_env(mut self, env_fn: EnvLookup) -> Self {
        self.env_fn = env_fn;
        self
    }

    /// Verify one tool. Never fails: store and process errors become
    /// failed tiers with their reason in the detail.
    pub fn verify(&self, tool: &ToolDescriptor) -> VerificationResult {
        let found = self.find_executable(tool);
        let file_check = match &found {
            Some(path) => TierCheck::pass(format!("found {}", path.display())),
            None => TierCheck::fail(format!(
                "no executable for '{}' under {} known install roots",
                tool.command,
                tool.install_roots.len()
            )),
        };

        let registry_check = self.check_registry(tool, found.as_deref());
        let (execution_check, version) = self.check_execution(tool);

        VerificationResult {
            tool: tool.name.clone(),
            command: tool.command.clone(),
            file_check,
            registry_check,
            execution_check,
            version,
        }
    }

    /// Verify every tool in a catalog, strictly sequentially.
    pub fn verify_all(&self, catalog: &[ToolDescriptor]) -> Vec<VerificationResult> {
        catalog.iter().map(|tool| self.verify(tool)).collect()
    }

    /// Tier 1: probe install roots for an executable candidate.
    fn find_executable(&self, tool: &ToolDescriptor) -> Option<PathBuf> {
        for root in &tool.install_roots {
            let expanded = expand_tokens(root, &self.env_fn);
            let root_path = PathBuf::from(&expanded);
            if !root_path.is_dir() {
                continue;
            }
            for candidate in tool.executable_candidates() {
                let path = root_path.join(&candidate);
                if path.is_file() {
                    return Some(path);
                }
            }
        }
        None
    }

    /// Tier 2: is the tool's directory registered on the expected
    /// scope's PATH?
    ///
    /// With a discovered executable, membership of its containing
    /// directory is checked canonically. Without one, the scope's
    /// entries are matched against the descriptor's path patterns; an
    /// ancestor known to serve the tool (e.g. the npm global bin
    /// directory) still counts.
    fn check_registry(&self, tool: &ToolDescriptor, found: Option<&std::path::Path>) -> TierCheck {
        let value = match self.store.read_path(tool.scope) {
            Ok(value) => value,
            Err(e) => {
                return TierCheck::fail(format!(
                    "could not read {} PATH ({e})",
                    tool.scope
                ));
            }
        };

        if let Some(executable) = found {
            if let Some(dir) = executable.parent() {
                let entry = PathEntry::parse_with_env(&dir.to_string_lossy(), &self.env_fn);
                if resolver::contains(&value, &entry) {
                    return TierCheck::pass(format!(
                        "{} present in {} PATH",
                        dir.display(),
                        tool.scope
                    ));
                }
                return TierCheck::fail(format!(
                    "{} missing from {} PATH ({} entries checked)",
                    dir.display(),
                    tool.scope,
                    value.len()
                ));
            }
        }

        match self.match_pattern(&value, tool) {
            Some(entry) => TierCheck::pass(format!(
                "'{entry}' matches an expected location in {} PATH",
                tool.scope
            )),
            None => TierCheck::fail(format!(
                "no {} PATH entry matches {:?}",
                tool.scope, tool.path_patterns
            )),
        }
    }

    fn match_pattern(&self, value: &PathValue, tool: &ToolDescriptor) -> Option<String> {
        for entry in value.entries() {
            if entry.is_empty() {
                continue;
            }
            let expanded = entry.expanded().to_lowercase();
            for pattern in &tool.path_patterns {
                if expanded.contains(&pattern.to_lowercase()) {
                    return Some(entry.raw().to_string());
                }
            }
        }
        None
    }

    /// Tier 3: run the version query in a fresh process.
    ///
    /// The child's PATH is rebuilt from the store (Machine then User),
    /// so the check sees what a newly opened shell would see, not this
    /// process's cached environment.
    fn check_execution(&self, tool: &ToolDescriptor) -> (TierCheck, Option<String>) {
        let path_override = self.fresh_path();

        let output = execution::run_version_query(
            &tool.command,
            &tool.version_args,
            path_override.as_deref(),
            self.timeout,
        );

        match output {
            Ok(output) if output.success() => self.classify_output(tool, &output),
            Ok(output) => (
                TierCheck::fail(format!(
                    "exit code {:?}: {}",
                    output.exit_code,
                    first_line(&output.stderr).unwrap_or("no output")
                )),
                None,
            ),
            Err(e) => (TierCheck::fail(e.to_string()), None),
        }
    }

    fn classify_output(
        &self,
        tool: &ToolDescriptor,
        output: &ExecutionOutput,
    ) -> (TierCheck, Option<String>) {
        let Some(version) = first_line(&output.stdout) else {
            return (TierCheck::fail("exit 0 but no output".to_string()), None);
        };

        if let Some(pattern) = &tool.version_pattern {
            match Regex::new(pattern) {
                Ok(re) if !re.is_match(version) => {
                    return (
                        TierCheck::fail(format!(
                            "output '{version}' does not match expected pattern '{pattern}'"
                        )),
                        None,
                    );
                }
                // An unparseable pattern from user config must not turn a
                // working tool into a failure
                Err(e) => {
                    tracing::warn!(tool = %tool.name, error = %e, "invalid version pattern, accepting any output");
                }
                Ok(_) => {}
            }
        }

        (
            TierCheck::pass(format!("reported '{version}'")),
            Some(version.to_string()),
        )
    }

    /// Compose Machine + User PATH entries from the store, expanded, in
    /// the order the OS applies them. None when the store is unreadable
    /// in which case the probe runs with the weaker inherited environment.
    fn fresh_path(&self) -> Option<String> {
        let machine = self.store.read_path(PathScope::Machine).ok()?;
        let user = self.store.read_path(PathScope::User).ok()?;
        let entries: Vec<&str> = machine
            .entries()
            .iter()
            .chain(user.entries().iter())
            .filter(|e| !e.is_empty())
            .map(PathEntry::expanded)
            .collect();
        Some(entries.join(if cfg!(windows) { ";" } else { ":" }))
    }
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

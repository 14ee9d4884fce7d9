//! Verification results: per-tier outcomes and the derived status.
//!
//! The result is a fixed-arity struct of three tier checks rather than
//! an early-return chain, so every diagnostic detail survives to the
//! caller even when an earlier tier already failed.

use serde::Serialize;
use std::fmt;

/// One tier's outcome with its diagnostic detail (path searched,
/// registry key checked, captured output or exit code).
#[derive(Debug, Clone, Serialize)]
pub struct TierCheck {
    pub passed: bool,
    pub detail: String,
}

impl TierCheck {
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Overall status derived from the three tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// All three tiers passed.
    Verified,
    /// Installed and registered but not executable from a fresh shell:
    /// the classic stale-environment case.
    PartiallyVerified,
    /// Anything else.
    Unverified,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallStatus::Verified => write!(f, "verified"),
            OverallStatus::PartiallyVerified => write!(f, "partially verified"),
            OverallStatus::Unverified => write!(f, "unverified"),
        }
    }
}

/// Per-tool verification result. Produced per check cycle, never
/// persisted or cached; every call re-evaluates all three tiers.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    /// Tool display name.
    pub tool: String,
    /// Command the execution tier invoked.
    pub command: String,
    /// Tier 1: executable found at a known install root.
    pub file_check: TierCheck,
    /// Tier 2: containing directory present in the stored PATH.
    pub registry_check: TierCheck,
    /// Tier 3: version query succeeded in a fresh process.
    pub execution_check: TierCheck,
    /// Version string captured by a successful execution check.
    pub version: Option<String>,
}

impl VerificationResult {
    /// Derive the overall status from the tiers.
    ///
    /// `PartiallyVerified` requires file and registry to pass with
    /// execution failing. That combination, and only that combination,
    /// points at stale shell environments rather than a broken install.
    pub fn status(&self) -> OverallStatus {
        match (
            self.file_check.passed,
            self.registry_check.passed,
            self.execution_check.passed,
        ) {
            (true, true, true) => OverallStatus::Verified,
            (true, true, false) => OverallStatus::PartiallyVerified,
            _ => OverallStatus::Unverified,
        }
    }

    /// Actionable remediation hint for non-verified results.
    pub fn hint(&self) -> Option<String> {
        match self.status() {
            OverallStatus::Verified => None,
            OverallStatus::PartiallyVerified => Some(format!(
                "{} is installed and registered but not visible in this session — \
                 restart your terminal to pick up the updated PATH",
                self.tool
            )),
            OverallStatus::Unverified => {
                if !self.file_check.passed {
                    Some(format!(
                        "{} does not appear to be installed ({})",
                        self.tool, self.file_check.detail
                    ))
                } else {
                    Some(format!(
                        "{} is installed but its directory is not registered on PATH — \
                         run `pathmend repair {}`",
                        self.tool, self.command
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(file: bool, registry: bool, execution: bool) -> VerificationResult {
        VerificationResult {
            tool: "Claude CLI".to_string(),
            command: "claude".to_string(),
            file_check: if file {
                TierCheck::pass("found")
            } else {
                TierCheck::fail("no executable found")
            },
            registry_check: if registry {
                TierCheck::pass("present")
            } else {
                TierCheck::fail("absent")
            },
            execution_check: if execution {
                TierCheck::pass("exit 0")
            } else {
                TierCheck::fail("exit 1")
            },
            version: execution.then(|| "1.2.3".to_string()),
        }
    }

    #[test]
    fn all_tiers_passing_is_verified() {
        assert_eq!(result(true, true, true).status(), OverallStatus::Verified);
    }

    #[test]
    fn execution_failure_alone_is_partially_verified() {
        let r = result(true, true, false);
        assert_eq!(r.status(), OverallStatus::PartiallyVerified);
        assert!(r.hint().unwrap().contains("restart your terminal"));
    }

    #[test]
    fn missing_file_is_unverified_even_if_execution_passes() {
        // A stale shim elsewhere on PATH can execute while the install
        // root is gone; that is not a healthy state.
        assert_eq!(result(false, true, true).status(), OverallStatus::Unverified);
    }

    #[test]
    fn missing_registry_entry_is_unverified() {
        let r = result(true, false, false);
        assert_eq!(r.status(), OverallStatus::Unverified);
        assert!(r.hint().unwrap().contains("repair"));
    }

    #[test]
    fn nothing_found_hint_names_missing_install() {
        let r = result(false, false, false);
        assert!(r.hint().unwrap().contains("does not appear to be installed"));
    }

    #[test]
    fn verified_has_no_hint() {
        assert!(result(true, true, true).hint().is_none());
    }

    #[test]
    fn partially_verified_distinct_from_unverified() {
        assert_ne!(
            result(true, true, false).status(),
            result(false, true, false).status()
        );
    }
}

//! Minimal repair plans.
//!
//! A plan contains only the mutations a diagnosis justifies: it never
//! replaces a whole PATH value and never removes entries it did not
//! itself diagnose as stale. The dry-run flag lets the same plan be
//! rendered for review or executed.

use crate::registry::PathScope;
use crate::repair::diagnosis::Diagnosis;
use crate::tools::ToolDescriptor;
use serde::Serialize;
use std::fmt;

/// One proposed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanAction {
    /// Append a directory to the scope's PATH.
    Add { scope: PathScope, directory: String },

    /// Remove a stale entry this cycle diagnosed (wrong-form original
    /// after its portable replacement lands).
    RemoveStale { scope: PathScope, directory: String },
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanAction::Add { scope, directory } => {
                write!(f, "add '{directory}' to {scope} PATH")
            }
            PlanAction::RemoveStale { scope, directory } => {
                write!(f, "remove stale '{directory}' from {scope} PATH")
            }
        }
    }
}

/// Ordered mutations proposed for one tool.
#[derive(Debug, Clone, Serialize)]
pub struct RepairPlan {
    /// Tool the plan repairs.
    pub tool: String,
    /// Mutations in application order.
    pub actions: Vec<PlanAction>,
    /// When true the plan is rendered but never applied.
    pub dry_run: bool,
}

impl RepairPlan {
    /// An empty plan, for a diagnosis that needed no mutation.
    pub fn empty(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            actions: Vec::new(),
            dry_run: false,
        }
    }

    pub fn new(tool: impl Into<String>, actions: Vec<PlanAction>) -> Self {
        Self {
            tool: tool.into(),
            actions,
            dry_run: false,
        }
    }

    /// Mark the plan as dry-run.
    pub fn as_dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Human-readable summary, one line per action.
    pub fn describe(&self) -> String {
        self.actions
            .iter()
            .map(|action| action.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Build the minimal plan a diagnosis justifies.
///
/// Always the directory, never the executable path. Removals appear
/// only for the wrong-form entry the same cycle diagnosed.
pub fn propose(tool: &ToolDescriptor, diagnosis: &Diagnosis) -> RepairPlan {
    match diagnosis {
        Diagnosis::MissingFromPath { directory } => RepairPlan::new(
            &tool.name,
            vec![PlanAction::Add {
                scope: tool.scope,
                directory: directory.clone(),
            }],
        ),
        Diagnosis::PresentButWrongForm {
            stored_raw,
            expected_raw,
            ..
        } => RepairPlan::new(
            &tool.name,
            vec![
                PlanAction::RemoveStale {
                    scope: tool.scope,
                    directory: stored_raw.clone(),
                },
                PlanAction::Add {
                    scope: tool.scope,
                    directory: expected_raw.clone(),
                },
            ],
        ),
        Diagnosis::AlreadyCorrect { .. } | Diagnosis::NotInstalled => {
            RepairPlan::empty(&tool.name)
        }
    }
}

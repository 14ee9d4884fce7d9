//! The repair state machine.
//!
//! Discover → Diagnose → Propose → Apply → Reverify, with Resolved and
//! Unresolved as terminal states. One automatic retry of the whole
//! cycle; anything beyond that is the operator's call.

use crate::ops::{Outcome, PathOperations};
use crate::repair::diagnosis::{self, Diagnosis};
use crate::repair::discovery;
use crate::repair::plan::{self, PlanAction, RepairPlan};
use crate::tools::ToolDescriptor;
use crate::verify::{OverallStatus, VerificationEngine, VerificationResult};
use serde::Serialize;

/// Terminal state of a repair cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairState {
    Resolved,
    Unresolved,
}

/// One executed plan action and what happened to it.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedAction {
    pub action: PlanAction,
    /// Outcome when the action ran; None when it errored.
    pub outcome: Option<Outcome>,
    /// Error text when the action failed; the remaining plan is
    /// aborted at that point.
    pub error: Option<String>,
}

/// Full account of one repair cycle for one tool.
#[derive(Debug, Clone, Serialize)]
pub struct RepairReport {
    pub tool: String,
    pub diagnosis: Diagnosis,
    pub plan: RepairPlan,
    pub applied: Vec<AppliedAction>,
    /// How many Discover→Reverify cycles ran.
    pub attempts: u32,
    /// The reverification result, when the cycle got that far.
    pub verification: Option<VerificationResult>,
    pub state: RepairState,
    /// Actionable next step when unresolved.
    pub hint: Option<String>,
}

/// Reviews a proposed plan before it is applied.
///
/// Wired to an interactive confirmation in the CLI; the silent-fix
/// configuration bypasses it entirely.
pub trait PlanReviewer: Send + Sync {
    fn approve(&self, plan: &RepairPlan) -> bool;
}

/// Reviewer that approves everything.
pub struct ApproveAll;

impl PlanReviewer for ApproveAll {
    fn approve(&self, _plan: &RepairPlan) -> bool {
        true
    }
}

/// Drives repair cycles against the store through [`PathOperations`].
pub struct RepairOrchestrator {
    ops: PathOperations,
    engine: VerificationEngine,
    auto_apply: bool,
    reviewer: Box<dyn PlanReviewer>,
}

impl RepairOrchestrator {
    pub fn new(ops: PathOperations, engine: VerificationEngine) -> Self {
        Self {
            ops,
            engine,
            auto_apply: false,
            reviewer: Box::new(ApproveAll),
        }
    }

    /// Apply plans without review (silent-fix callers).
    pub fn with_auto_apply(mut self, auto_apply: bool) -> Self {
        self.auto_apply = auto_apply;
        self
    }

    /// Reviewer consulted when auto-apply is off.
    pub fn with_reviewer(mut self, reviewer: Box<dyn PlanReviewer>) -> Self {
        self.reviewer = reviewer;
        self
    }

    /// Run the repair cycle for one tool.
    pub fn repair(&self, tool: &ToolDescriptor) -> RepairReport {
        let mut report = self.run_cycle(tool, 1);

        // One automatic retry, and only when the first cycle changed
        // something that still reverified as Unverified. A
        // PartiallyVerified outcome is the expected stale-session case;
        // re-running the cycle cannot freshen another process's
        // environment.
        let applied_something = report
            .applied
            .iter()
            .any(|a| matches!(a.outcome, Some(Outcome::Added) | Some(Outcome::Removed)));
        let fix_did_not_take = report
            .verification
            .as_ref()
            .is_some_and(|v| v.status() == OverallStatus::Unverified);
        if report.state == RepairState::Unresolved && applied_something && fix_did_not_take {
            tracing::info!(tool = %tool.name, "repair not yet verified, retrying once");
            let retry = self.run_cycle(tool, 2);
            if retry.state == RepairState::Resolved {
                return retry;
            }
            report = retry;
        }

        report
    }

    fn run_cycle(&self, tool: &ToolDescriptor, attempt: u32) -> RepairReport {
        // Discover
        let discovered = discovery::discover(tool, self.ops.env_fn());

        // Diagnose
        let value = match self.ops.store().read_path(tool.scope) {
            Ok(value) => value,
            Err(e) => {
                return RepairReport {
                    tool: tool.name.clone(),
                    diagnosis: Diagnosis::NotInstalled,
                    plan: RepairPlan::empty(&tool.name),
                    applied: Vec::new(),
                    attempts: attempt,
                    verification: None,
                    state: RepairState::Unresolved,
                    hint: Some(format!("could not read {} PATH: {e}", tool.scope)),
                };
            }
        };
        let diagnosis = diagnosis::diagnose(&discovered, &value, self.ops.env_fn());

        if diagnosis == Diagnosis::NotInstalled {
            return RepairReport {
                tool: tool.name.clone(),
                diagnosis,
                plan: RepairPlan::empty(&tool.name),
                applied: Vec::new(),
                attempts: attempt,
                verification: None,
                state: RepairState::Unresolved,
                hint: Some(format!(
                    "{} is not installed at any known location — install it first",
                    tool.name
                )),
            };
        }

        // Propose
        let plan = plan::propose(tool, &diagnosis);

        if !plan.is_empty() && !self.auto_apply && !self.reviewer.approve(&plan) {
            return RepairReport {
                tool: tool.name.clone(),
                diagnosis,
                plan,
                applied: Vec::new(),
                attempts: attempt,
                verification: None,
                state: RepairState::Unresolved,
                hint: Some("proposed repair was declined".to_string()),
            };
        }

        // Apply, aborting the remainder on first failure
        let mut applied = Vec::new();
        for action in &plan.actions {
            match self.apply_action(action) {
                Ok(outcome) => applied.push(AppliedAction {
                    action: action.clone(),
                    outcome: Some(outcome),
                    error: None,
                }),
                Err(e) => {
                    applied.push(AppliedAction {
                        action: action.clone(),
                        outcome: None,
                        error: Some(e.to_string()),
                    });
                    tracing::warn!(tool = %tool.name, action = %action, error = %e, "repair action failed, aborting remaining plan");
                    break;
                }
            }
        }

        // Reverify
        let verification = self.engine.verify(tool);
        let status = verification.status();
        let (state, hint) = match status {
            OverallStatus::Verified => (RepairState::Resolved, None),
            OverallStatus::PartiallyVerified => (
                RepairState::Unresolved,
                Some(format!(
                    "{} was repaired but this session's environment is stale — \
                     open a fresh terminal to use it",
                    tool.name
                )),
            ),
            OverallStatus::Unverified => (
                RepairState::Unresolved,
                Some(
                    verification
                        .hint()
                        .unwrap_or_else(|| "the applied fix did not take effect".to_string()),
                ),
            ),
        };

        RepairReport {
            tool: tool.name.clone(),
            diagnosis,
            plan,
            applied,
            attempts: attempt,
            verification: Some(verification),
            state,
            hint,
        }
    }

    fn apply_action(&self, action: &PlanAction) -> crate::error::Result<Outcome> {
        match action {
            PlanAction::Add { scope, directory } => self.ops.ensure_present(*scope, directory),
            PlanAction::RemoveStale { scope, directory } => {
                self.ops.ensure_absent(*scope, directory)
            }
        }
    }
}

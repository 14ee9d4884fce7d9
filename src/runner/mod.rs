//! Sequential step execution on a background worker.
//!
//! Installation steps arrive from an external collaborator as
//! `(tool, directory, scope)` tuples after each tool installs. The
//! runner registers the directory, verifies the tool, and, when
//! verification falls short, hands the tool to the repair
//! orchestrator, emitting progress events throughout.
//!
//! Steps run strictly sequentially on one worker thread: each step's
//! PATH mutation may be a precondition for the next step's discovery,
//! and the registry offers no locking of its own. The foreground
//! receives events over a bounded channel and renders them; nothing in
//! here blocks on the consumer.
//!
//! # Modules
//!
//! - [`events`] - Progress events and non-blocking sinks

pub mod events;

use crate::ops::{Outcome, PathOperations};
use crate::registry::PathScope;
use crate::repair::{RepairOrchestrator, RepairReport, RepairState};
use crate::runner::events::{EventSink, ProgressEvent};
use crate::tools::ToolDescriptor;
use crate::verify::{OverallStatus, VerificationEngine, VerificationResult};
use chrono::Utc;
use serde::Serialize;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::JoinHandle;

/// One installation step handed to the runner by an external
/// collaborator.
#[derive(Debug, Clone)]
pub struct InstallStep {
    /// Step name for events (defaults to the tool's command).
    pub name: String,
    /// The tool the step installed.
    pub tool: ToolDescriptor,
    /// Directory the installer placed executables in.
    pub directory: String,
    /// Scope the directory belongs in.
    pub scope: PathScope,
}

impl InstallStep {
    pub fn new(tool: ToolDescriptor, directory: impl Into<String>, scope: PathScope) -> Self {
        Self {
            name: tool.command.clone(),
            tool,
            directory: directory.into(),
            scope,
        }
    }
}

/// What one step produced, surfaced verbatim to the operator as the
/// authoritative "is this tool usable now" answer.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: String,
    /// PATH registration outcome; None when the operation errored.
    pub outcome: Option<Outcome>,
    /// Registration error, if any.
    pub error: Option<String>,
    pub verification: Option<VerificationResult>,
    /// Present when verification fell short and repair ran.
    pub repair: Option<RepairReport>,
}

impl StepReport {
    /// Whether the tool ended the step verified.
    pub fn is_verified(&self) -> bool {
        let repaired = self
            .repair
            .as_ref()
            .is_some_and(|r| r.state == RepairState::Resolved);
        let verified = self
            .verification
            .as_ref()
            .is_some_and(|v| v.status() == OverallStatus::Verified);
        repaired || verified
    }
}

/// Executes install steps sequentially.
pub struct Runner {
    ops: PathOperations,
    engine: VerificationEngine,
    orchestrator: RepairOrchestrator,
    sink: Arc<dyn EventSink>,
}

impl Runner {
    pub fn new(
        ops: PathOperations,
        engine: VerificationEngine,
        orchestrator: RepairOrchestrator,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            ops,
            engine,
            orchestrator,
            sink,
        }
    }

    /// Run all steps in order on the calling thread.
    ///
    /// A failed registration is reported and the run moves on: the
    /// next step's tool may be entirely unrelated, and the caller
    /// decides what a partial run means.
    pub fn run(&self, steps: &[InstallStep]) -> Vec<StepReport> {
        steps.iter().map(|step| self.run_step(step)).collect()
    }

    fn run_step(&self, step: &InstallStep) -> StepReport {
        self.sink.emit(ProgressEvent::StepStarted {
            step: step.name.clone(),
            tool: step.tool.name.clone(),
            timestamp: Utc::now(),
        });

        let (outcome, error) = match self.ops.ensure_present(step.scope, &step.directory) {
            Ok(outcome) => {
                self.sink.emit(ProgressEvent::StepCompleted {
                    step: step.name.clone(),
                    outcome,
                    timestamp: Utc::now(),
                });
                (Some(outcome), None)
            }
            Err(e) => {
                self.sink.emit(ProgressEvent::StepFailed {
                    step: step.name.clone(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                (None, Some(e.to_string()))
            }
        };

        let verification = self.engine.verify(&step.tool);
        self.sink.emit(ProgressEvent::VerificationCompleted {
            tool: step.tool.name.clone(),
            status: verification.status(),
            version: verification.version.clone(),
            hint: verification.hint(),
            timestamp: Utc::now(),
        });

        let repair = if verification.status() != OverallStatus::Verified {
            let report = self.orchestrator.repair(&step.tool);
            if !report.plan.is_empty() {
                self.sink.emit(ProgressEvent::RepairProposed {
                    tool: step.tool.name.clone(),
                    plan: report.plan.clone(),
                    timestamp: Utc::now(),
                });
            }
            self.sink.emit(ProgressEvent::RepairCompleted {
                tool: step.tool.name.clone(),
                state: report.state,
                hint: report.hint.clone(),
                timestamp: Utc::now(),
            });
            Some(report)
        } else {
            None
        };

        StepReport {
            step: step.name.clone(),
            outcome,
            error,
            verification: Some(verification),
            repair,
        }
    }
}

/// Move the runner onto a background worker thread.
///
/// Returns the worker handle and the event receiver for the foreground
/// to drain. Only one worker is ever spawned per run; the steps inside
/// it stay strictly sequential.
pub fn spawn_worker(
    ops: PathOperations,
    engine: VerificationEngine,
    orchestrator: RepairOrchestrator,
    steps: Vec<InstallStep>,
) -> (JoinHandle<Vec<StepReport>>, Receiver<ProgressEvent>) {
    let (sink, rx) = events::ChannelSink::bounded(256);
    let runner = Runner::new(ops, engine, orchestrator, Arc::new(sink));
    let handle = std::thread::spawn(move || runner.run(&steps));
    (handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::CountingNotifier;
    use crate::path::entry::EnvLookup;
    use crate::registry::memory::MemoryStore;
    use crate::runner::events::CollectingSink;
    use std::collections::HashMap;
    use std::time::Duration;

    fn fake_env(vars: &[(&str, &str)]) -> EnvLookup {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(move |name: &str| map.get(name).cloned())
    }

    fn tool(command: &str, roots: Vec<String>) -> ToolDescriptor {
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

    fn runner_with(store: Arc<MemoryStore>, env: EnvLookup, sink: Arc<dyn EventSink>) -> Runner {
        let notifier = Arc::new(CountingNotifier::new());
        let ops = PathOperations::new(store.clone(), notifier.clone()).with_env(env.clone());
        let engine = VerificationEngine::new(store.clone())
            .with_env(env.clone())
            .with_timeout(Duration::from_secs(5));
        let orchestrator = RepairOrchestrator::new(
            PathOperations::new(store.clone(), notifier).with_env(env.clone()),
            VerificationEngine::new(store)
                .with_env(env)
                .with_timeout(Duration::from_secs(5)),
        )
        .with_auto_apply(true);
        Runner::new(ops, engine, orchestrator, sink)
    }

    #[cfg(unix)]
    fn write_fake_tool(dir: &std::path::Path, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn working_step_registers_and_verifies() {
        let temp = tempfile::TempDir::new().unwrap();
        write_fake_tool(temp.path(), "steptool", "#!/bin/sh\necho 1.0.0\n");
        let dir = temp.path().to_string_lossy().to_string();

        let env = fake_env(&[]);
        let store = Arc::new(MemoryStore::with_env(env.clone()));
        let sink = Arc::new(CollectingSink::new());
        let runner = runner_with(store.clone(), env, sink.clone());

        let step = InstallStep::new(tool("steptool", vec![dir.clone()]), dir, PathScope::User);
        let reports = runner.run(std::slice::from_ref(&step));

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcome, Some(Outcome::Added));
        assert!(reports[0].is_verified());
        assert!(reports[0].repair.is_none());

        let events = sink.events();
        assert!(matches!(events[0], ProgressEvent::StepStarted { .. }));
        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressEvent::VerificationCompleted { .. })));
    }

    #[test]
    fn failed_step_reports_error_and_continues() {
        let env = fake_env(&[]);
        let store = Arc::new(MemoryStore::with_env(env.clone()));
        store.deny_machine_writes();
        let sink = Arc::new(CollectingSink::new());
        let runner = runner_with(store, env, sink.clone());

        let steps = vec![
            InstallStep::new(
                tool("denied", vec!["/nonexistent".to_string()]),
                r"C:\denied",
                PathScope::Machine,
            ),
            InstallStep::new(
                tool("later", vec!["/nonexistent".to_string()]),
                r"C:\later",
                PathScope::User,
            ),
        ];
        let reports = runner.run(&steps);

        assert_eq!(reports.len(), 2);
        assert!(reports[0].error.is_some());
        // Second step still ran
        assert_eq!(reports[1].outcome, Some(Outcome::Added));

        let events = sink.events();
        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressEvent::StepFailed { .. })));
    }

    #[test]
    fn unverifiable_step_triggers_repair_events() {
        let env = fake_env(&[]);
        let store = Arc::new(MemoryStore::with_env(env.clone()));
        let sink = Arc::new(CollectingSink::new());
        let runner = runner_with(store, env, sink.clone());

        let step = InstallStep::new(
            tool("ghost", vec!["/nonexistent".to_string()]),
            r"C:\ghost",
            PathScope::User,
        );
        let reports = runner.run(std::slice::from_ref(&step));

        let repair = reports[0].repair.as_ref().unwrap();
        assert_eq!(repair.state, RepairState::Unresolved);
        assert!(!reports[0].is_verified());

        let events = sink.events();
        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressEvent::RepairCompleted { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn spawn_worker_streams_events_to_foreground() {
        let temp = tempfile::TempDir::new().unwrap();
        write_fake_tool(temp.path(), "bgtool", "#!/bin/sh\necho 3.1.4\n");
        let dir = temp.path().to_string_lossy().to_string();

        let env = fake_env(&[]);
        let store = Arc::new(MemoryStore::with_env(env.clone()));
        let notifier = Arc::new(CountingNotifier::new());
        let ops = PathOperations::new(store.clone(), notifier.clone()).with_env(env.clone());
        let engine = VerificationEngine::new(store.clone())
            .with_env(env.clone())
            .with_timeout(Duration::from_secs(5));
        let orchestrator = RepairOrchestrator::new(
            PathOperations::new(store.clone(), notifier).with_env(env.clone()),
            VerificationEngine::new(store)
                .with_env(env.clone())
                .with_timeout(Duration::from_secs(5)),
        )
        .with_auto_apply(true);

        let step = InstallStep::new(tool("bgtool", vec![dir.clone()]), dir, PathScope::User);
        let (handle, rx) = spawn_worker(ops, engine, orchestrator, vec![step]);

        let events: Vec<ProgressEvent> = rx.iter().collect();
        let reports = handle.join().unwrap();

        assert!(reports[0].is_verified());
        assert!(events.len() >= 3);
        assert!(matches!(events[0], ProgressEvent::StepStarted { .. }));
    }
}

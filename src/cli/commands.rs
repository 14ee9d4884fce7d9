//! Command dispatch and rendering.
//!
//! Each subcommand wires the store, notifier, engine, and orchestrator
//! together, runs, and renders either styled text or JSON lines. The
//! exit code is the contract: 0 when everything asked about is healthy,
//! 1 otherwise.

use crate::broadcast::platform_notifier;
use crate::cli::args::{AddArgs, Cli, Commands, RemoveArgs, RepairArgs, VerifyArgs};
use crate::config::Settings;
use crate::error::Result;
use crate::ops::PathOperations;
use crate::registry::{platform_store, EnvironmentStore, PathScope};
use crate::repair::orchestrator::{PlanReviewer, RepairOrchestrator};
use crate::repair::plan::{self, RepairPlan};
use crate::repair::{diagnosis, discovery, RepairState};
use crate::tools::{self, ToolDescriptor};
use crate::verify::{OverallStatus, VerificationEngine, VerificationResult};
use console::style;
use std::sync::Arc;

/// Reviewer backed by an interactive confirmation prompt.
struct ConfirmReviewer;

impl PlanReviewer for ConfirmReviewer {
    fn approve(&self, plan: &RepairPlan) -> bool {
        println!("\nProposed repair for {}:", style(&plan.tool).bold());
        for line in plan.describe().lines() {
            println!("  {line}");
        }
        dialoguer::Confirm::new()
            .with_prompt("Apply this plan?")
            .default(true)
            .interact()
            .unwrap_or(false)
    }
}

/// Dispatches parsed CLI commands.
pub struct CommandDispatcher {
    settings: Settings,
    store: Arc<dyn EnvironmentStore>,
    json: bool,
}

impl CommandDispatcher {
    pub fn new(settings: Settings, json: bool) -> Self {
        Self {
            settings,
            store: platform_store(),
            json,
        }
    }

    /// Override the store (tests).
    pub fn with_store(mut self, store: Arc<dyn EnvironmentStore>) -> Self {
        self.store = store;
        self
    }

    /// Run the requested command, returning the process exit code.
    pub fn dispatch(&self, cli: &Cli) -> Result<i32> {
        match &cli.command {
            None | Some(Commands::Status(_)) => self.status(),
            Some(Commands::Verify(args)) => self.verify(args),
            Some(Commands::Repair(args)) => self.repair(args),
            Some(Commands::Add(args)) => self.add(args),
            Some(Commands::Remove(args)) => self.remove(args),
            Some(Commands::Completions(args)) => {
                let mut cmd = <Cli as clap::CommandFactory>::command();
                clap_complete::generate(
                    args.shell,
                    &mut cmd,
                    "pathmend",
                    &mut std::io::stdout(),
                );
                Ok(0)
            }
        }
    }

    fn ops(&self) -> PathOperations {
        let notifier = platform_notifier(self.settings.broadcast_timeout_ms);
        PathOperations::new(self.store.clone(), notifier)
    }

    fn engine(&self) -> VerificationEngine {
        VerificationEngine::new(self.store.clone())
            .with_timeout(self.settings.execution_timeout())
    }

    fn selected_tools(&self, tool: Option<&str>) -> Result<Vec<ToolDescriptor>> {
        let catalog = self.settings.catalog();
        match tool {
            None => Ok(catalog),
            Some(command) => match tools::find_tool(&catalog, command) {
                Some(descriptor) => Ok(vec![descriptor.clone()]),
                None => Err(crate::error::PathmendError::DiscoveryNotFound {
                    tool: command.to_string(),
                }),
            },
        }
    }

    fn status(&self) -> Result<i32> {
        for scope in [PathScope::Machine, PathScope::User] {
            let value = self.store.read_path(scope)?;
            if self.json {
                let entries: Vec<&str> =
                    value.entries().iter().map(|e| e.raw()).collect();
                println!(
                    "{}",
                    serde_json::json!({ "scope": scope.to_string(), "entries": entries })
                );
                continue;
            }
            println!("{} PATH ({} entries):", style(scope).bold(), value.len());
            for entry in value.entries() {
                if entry.is_empty() {
                    println!("  {}", style("<empty segment>").dim());
                } else {
                    println!("  {}", entry.raw());
                }
            }
            println!();
        }
        Ok(0)
    }

    fn verify(&self, args: &VerifyArgs) -> Result<i32> {
        let catalog = self.selected_tools(args.tool.as_deref())?;
        let engine = self.engine();
        let results = engine.verify_all(&catalog);

        let mut all_verified = true;
        for result in &results {
            self.render_verification(result);
            if result.status() != OverallStatus::Verified {
                all_verified = false;
            }
        }
        Ok(if all_verified { 0 } else { 1 })
    }

    fn render_verification(&self, result: &VerificationResult) {
        if self.json {
            if let Ok(line) = serde_json::to_string(result) {
                println!("{line}");
            }
            return;
        }

        let status = result.status();
        let marker = match status {
            OverallStatus::Verified => style("ok").green(),
            OverallStatus::PartiallyVerified => style("stale").yellow(),
            OverallStatus::Unverified => style("missing").red(),
        };
        let version = result.version.as_deref().unwrap_or("-");
        println!("[{marker}] {} ({version})", style(&result.tool).bold());
        println!("    file:      {}", result.file_check.detail);
        println!("    registry:  {}", result.registry_check.detail);
        println!("    execution: {}", result.execution_check.detail);
        if let Some(hint) = result.hint() {
            println!("    {}", style(hint).yellow());
        }
    }

    fn repair(&self, args: &RepairArgs) -> Result<i32> {
        let catalog = self.selected_tools(args.tool.as_deref())?;

        if args.dry_run {
            return self.repair_dry_run(&catalog);
        }

        let auto_apply = args.yes || self.settings.auto_apply;
        let orchestrator = RepairOrchestrator::new(self.ops(), self.engine())
            .with_auto_apply(auto_apply)
            .with_reviewer(Box::new(ConfirmReviewer));

        let mut all_resolved = true;
        for tool in &catalog {
            let report = orchestrator.repair(tool);
            if self.json {
                if let Ok(line) = serde_json::to_string(&report) {
                    println!("{line}");
                }
            } else {
                let marker = match report.state {
                    RepairState::Resolved => style("resolved").green(),
                    RepairState::Unresolved => style("unresolved").red(),
                };
                println!("[{marker}] {}", style(&report.tool).bold());
                if !report.plan.is_empty() {
                    for line in report.plan.describe().lines() {
                        println!("    {line}");
                    }
                }
                if let Some(hint) = &report.hint {
                    println!("    {}", style(hint).yellow());
                }
            }
            if report.state != RepairState::Resolved {
                all_resolved = false;
            }
        }
        Ok(if all_resolved { 0 } else { 1 })
    }

    /// Discover → Diagnose → Propose without touching the store.
    fn repair_dry_run(&self, catalog: &[ToolDescriptor]) -> Result<i32> {
        let ops = self.ops();
        for tool in catalog {
            let discovered = discovery::discover(tool, ops.env_fn());
            let value = self.store.read_path(tool.scope)?;
            let diagnosis = diagnosis::diagnose(&discovered, &value, ops.env_fn());
            let proposed = plan::propose(tool, &diagnosis).as_dry_run();

            if self.json {
                if let Ok(line) = serde_json::to_string(&proposed) {
                    println!("{line}");
                }
            } else if proposed.is_empty() {
                println!("{}: nothing to do", style(&tool.name).bold());
            } else {
                println!("{} (dry run):", style(&tool.name).bold());
                for line in proposed.describe().lines() {
                    println!("    {line}");
                }
            }
        }
        Ok(0)
    }

    fn add(&self, args: &AddArgs) -> Result<i32> {
        let scope = scope_from_flag(args.machine);
        let outcome = self.ops().ensure_present(scope, &args.directory)?;
        if self.json {
            println!(
                "{}",
                serde_json::json!({ "directory": args.directory, "scope": scope.to_string(), "outcome": outcome.to_string() })
            );
        } else {
            println!("{} {} on {} PATH", args.directory, outcome, scope);
        }
        Ok(0)
    }

    fn remove(&self, args: &RemoveArgs) -> Result<i32> {
        let scope = scope_from_flag(args.machine);
        let outcome = self.ops().ensure_absent(scope, &args.directory)?;
        if self.json {
            println!(
                "{}",
                serde_json::json!({ "directory": args.directory, "scope": scope.to_string(), "outcome": outcome.to_string() })
            );
        } else {
            println!("{} {} on {} PATH", args.directory, outcome, scope);
        }
        Ok(0)
    }
}

fn scope_from_flag(machine: bool) -> PathScope {
    if machine {
        PathScope::Machine
    } else {
        PathScope::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ValueKind;
    use crate::registry::memory::MemoryStore;
    use clap::Parser;

    fn dispatcher() -> (CommandDispatcher, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let dispatcher =
            CommandDispatcher::new(Settings::default(), true).with_store(store.clone());
        (dispatcher, store)
    }

    #[test]
    fn add_then_status_exits_zero() {
        let (dispatcher, store) = dispatcher();

        let cli = Cli::try_parse_from(["pathmend", "add", r"C:\Tools"]).unwrap();
        assert_eq!(dispatcher.dispatch(&cli).unwrap(), 0);
        let (raw, _) = store.stored_path(PathScope::User).unwrap();
        assert_eq!(raw, r"C:\Tools");

        let cli = Cli::try_parse_from(["pathmend", "status"]).unwrap();
        assert_eq!(dispatcher.dispatch(&cli).unwrap(), 0);
    }

    #[test]
    fn remove_missing_directory_still_succeeds() {
        let (dispatcher, _) = dispatcher();
        let cli = Cli::try_parse_from(["pathmend", "remove", r"C:\absent"]).unwrap();
        assert_eq!(dispatcher.dispatch(&cli).unwrap(), 0);
    }

    #[test]
    fn verify_unknown_tool_is_an_error() {
        let (dispatcher, _) = dispatcher();
        let cli = Cli::try_parse_from(["pathmend", "verify", "not-a-tool"]).unwrap();
        assert!(dispatcher.dispatch(&cli).is_err());
    }

    #[test]
    fn repair_dry_run_does_not_mutate() {
        let (dispatcher, store) = dispatcher();
        store.seed_path(PathScope::User, r"C:\existing", ValueKind::Plain);

        let cli = Cli::try_parse_from(["pathmend", "repair", "--dry-run"]).unwrap();
        assert_eq!(dispatcher.dispatch(&cli).unwrap(), 0);

        let (raw, _) = store.stored_path(PathScope::User).unwrap();
        assert_eq!(raw, r"C:\existing");
    }
}

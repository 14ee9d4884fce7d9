//! PATH drift diagnosis and repair.
//!
//! Repair runs as a small state machine: Discover the actual install
//! location, Diagnose it against the stored PATH, Propose the minimal
//! mutation, Apply it, Reverify. Terminal states are Resolved and
//! Unresolved; the whole cycle retries at most once before handing the
//! outcome back to the caller.
//!
//! # Modules
//!
//! - [`discovery`] - Probe install-root conventions for real locations
//! - [`diagnosis`] - Classify discovered location vs stored PATH
//! - [`plan`] - Minimal proposed mutations with dry-run support
//! - [`orchestrator`] - The state machine driving a repair cycle

pub mod diagnosis;
pub mod discovery;
pub mod orchestrator;
pub mod plan;

pub use diagnosis::Diagnosis;
pub use discovery::DiscoveredInstall;
pub use orchestrator::{RepairOrchestrator, RepairReport, RepairState};
pub use plan::{PlanAction, RepairPlan};

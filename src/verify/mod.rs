//! Three-tier tool verification.
//!
//! A tool can be missing, installed-but-invisible, or visible-but-broken,
//! and the caller needs to know which. The engine therefore runs three
//! independent checks (file existence, registry presence, live
//! execution) and never short-circuits: all three always run and all
//! three report their own diagnostic detail.
//!
//! # Modules
//!
//! - [`result`] - Tier results and the derived overall status
//! - [`execution`] - Fresh-process version query with a bounded timeout
//! - [`engine`] - The engine composing the three tiers

pub mod engine;
pub mod execution;
pub mod result;

pub use engine::VerificationEngine;
pub use result::{OverallStatus, TierCheck, VerificationResult};

//! pathmend - Windows PATH repair and verification.
//!
//! pathmend keeps the Windows PATH environment variable truthful after
//! developer tools are installed: it registers new tool directories in
//! the environment registry, broadcasts the change so new processes see
//! it without a reboot, verifies each tool through three independent
//! checks, and repairs the drift it diagnoses.
//!
//! # Modules
//!
//! - [`broadcast`] - System-wide environment-change notification
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Settings file loading
//! - [`error`] - Error types and result aliases
//! - [`ops`] - Atomic ensure-present/ensure-absent PATH operations
//! - [`path`] - Semantic PATH entries, values, and resolution
//! - [`registry`] - Environment store access (registry hive on Windows)
//! - [`repair`] - Drift discovery, diagnosis, and repair orchestration
//! - [`runner`] - Sequential step execution and progress events
//! - [`tools`] - Tool descriptors and the builtin catalog
//! - [`verify`] - Three-tier verification engine
//!
//! # Example
//!
//! ```
//! use pathmend::ops::{Outcome, PathOperations};
//! use pathmend::broadcast::NullNotifier;
//! use pathmend::registry::{memory::MemoryStore, PathScope};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! let ops = PathOperations::new(store, Arc::new(NullNotifier));
//!
//! let outcome = ops.ensure_present(PathScope::User, r"C:\Tools").unwrap();
//! assert_eq!(outcome, Outcome::Added);
//! // A second run is a no-op
//! let outcome = ops.ensure_present(PathScope::User, r"C:\Tools").unwrap();
//! assert_eq!(outcome, Outcome::Unchanged);
//! ```

pub mod broadcast;
pub mod cli;
pub mod config;
pub mod error;
pub mod ops;
pub mod path;
pub mod registry;
pub mod repair;
pub mod runner;
pub mod tools;
pub mod verify;

pub use error::{PathmendError, Result};

//! Environment-variable store access.
//!
//! The registry is process-wide, externally shared, mutable state with no
//! built-in locking. All access goes through the [`EnvironmentStore`]
//! trait. There is deliberately no in-process caching layer, so the
//! store stays the sole source of truth and every operation re-reads it.
//!
//! # Modules
//!
//! - [`memory`] - In-memory store for tests and non-Windows builds
//! - [`windows`] - Registry-backed store (Windows only)

pub mod memory;
#[cfg(windows)]
pub mod windows;

use crate::error::Result;
use crate::path::PathValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry subkey holding user-scope environment variables.
pub const USER_ENV_KEY: &str = r"Environment";

/// Registry subkey holding machine-scope environment variables.
pub const MACHINE_ENV_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

/// Name of the PATH value within an environment key.
pub const PATH_VALUE_NAME: &str = "Path";

/// Which environment hive an operation targets.
///
/// Machine scope requires an elevated process to write; User scope does
/// not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathScope {
    User,
    Machine,
}

impl PathScope {
    /// The registry subkey for this scope.
    pub fn env_key(self) -> &'static str {
        match self {
            PathScope::User => USER_ENV_KEY,
            PathScope::Machine => MACHINE_ENV_KEY,
        }
    }
}

impl fmt::Display for PathScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathScope::User => write!(f, "User"),
            PathScope::Machine => write!(f, "Machine"),
        }
    }
}

/// Raw read/write access to scoped environment variables.
///
/// Implementations must read the **unexpanded** stored value and report
/// its stored type, and must write values back with the type the caller
/// supplies. Writes are per-scope independent; there is no transaction
/// across scopes.
pub trait EnvironmentStore: Send + Sync {
    /// Read the PATH value for a scope.
    ///
    /// A scope without a stored PATH value reads as an empty
    /// [`PathValue`]; a fresh user profile legitimately has none.
    fn read_path(&self, scope: PathScope) -> Result<PathValue>;

    /// Write the PATH value for a scope, preserving token form and
    /// re-classifying the stored type via [`PathValue::kind_for_write`].
    fn write_path(&self, scope: PathScope, value: &PathValue) -> Result<()>;

    /// Read an arbitrary environment variable, unexpanded.
    fn read_var(&self, scope: PathScope, name: &str) -> Result<Option<String>>;

    /// Set an arbitrary environment variable.
    fn set_var(&self, scope: PathScope, name: &str, value: &str) -> Result<()>;

    /// Delete an environment variable. Returns whether it existed.
    fn delete_var(&self, scope: PathScope, name: &str) -> Result<bool>;
}

/// The store for the platform this process runs on.
///
/// Windows gets the real registry hive; everywhere else falls back to an
/// empty in-memory store so the binary and its tests stay runnable.
#[cfg(windows)]
pub fn platform_store() -> std::sync::Arc<dyn EnvironmentStore> {
    std::sync::Arc::new(windows::RegistryStore::new())
}

#[cfg(not(windows))]
pub fn platform_store() -> std::sync::Arc<dyn EnvironmentStore> {
    std::sync::Arc::new(memory::MemoryStore::new())
}

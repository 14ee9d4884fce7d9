//! Atomic "ensure directory X is on scope S" operations.
//!
//! Composes the environment store, the entry resolver, and the change
//! notifier into read → resolve → write → broadcast sequences. The only
//! mutating step is the single store write, so an operation either lands
//! fully or leaves the original value untouched.
//!
//! Concurrency discipline: callers run every mutating operation on one
//! worker thread, never two at once from this process. Cross-process
//! races resolve last-writer-wins, matching the underlying OS mechanism.

use crate::broadcast::ChangeNotifier;
use crate::error::Result;
use crate::path::entry::{process_env, EnvLookup, PathEntry};
use crate::path::{resolver, PathValue};
use crate::registry::{EnvironmentStore, PathScope};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// What an ensure operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Directory was appended and the change broadcast.
    Added,
    /// Directory was removed and the change broadcast.
    Removed,
    /// An equivalent entry was already in the requested state; the
    /// write and broadcast were skipped.
    Unchanged,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Added => write!(f, "added"),
            Outcome::Removed => write!(f, "removed"),
            Outcome::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// High-level PATH mutation facade.
pub struct PathOperations {
    store: Arc<dyn EnvironmentStore>,
    notifier: Arc<dyn ChangeNotifier>,
    env_fn: EnvLookup,
}

impl PathOperations {
    pub fn new(store: Arc<dyn EnvironmentStore>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        Self {
            store,
            notifier,
            env_fn: process_env(),
        }
    }

    /// Override the token-expansion lookup (tests).
    pub fn with_env(mut self, env_fn: EnvLookup) -> Self {
        self.env_fn = env_fn;
        self
    }

    /// The store this facade mutates.
    pub fn store(&self) -> &Arc<dyn EnvironmentStore> {
        &self.store
    }

    /// The expansion lookup in use.
    pub fn env_fn(&self) -> &EnvLookup {
        &self.env_fn
    }

    /// Ensure a directory is present on the scope's PATH.
    ///
    /// Reads fresh from the store, normalizes the directory to its
    /// portable raw form, appends it unless an equivalent entry exists,
    /// writes back, and broadcasts. Returns [`Outcome::Unchanged`]
    /// without writing when the directory is already present; repeated
    /// installer runs hit this branch.
    pub fn ensure_present(&self, scope: PathScope, directory: &str) -> Result<Outcome> {
        let value = self.read_with_retry(scope)?;
        let raw = resolver::to_portable_raw(directory, &self.env_fn);
        let entry = PathEntry::parse_with_env(&raw, &self.env_fn);

        let (value, changed) = resolver::insert(value, entry);
        if !changed {
            tracing::debug!(%scope, directory, "already on PATH, skipping write");
            return Ok(Outcome::Unchanged);
        }

        self.write_with_retry(scope, &value)?;
        self.notifier.notify();
        tracing::info!(%scope, directory, "appended to PATH");
        Ok(Outcome::Added)
    }

    /// Ensure a directory is absent from the scope's PATH.
    pub fn ensure_absent(&self, scope: PathScope, directory: &str) -> Result<Outcome> {
        let value = self.read_with_retry(scope)?;
        let entry = PathEntry::parse_with_env(directory, &self.env_fn);

        let (value, changed) = resolver::remove(value, &entry);
        if !changed {
            tracing::debug!(%scope, directory, "not on PATH, nothing to remove");
            return Ok(Outcome::Unchanged);
        }

        self.write_with_retry(scope, &value)?;
        self.notifier.notify();
        tracing::info!(%scope, directory, "removed from PATH");
        Ok(Outcome::Removed)
    }

    /// Set an arbitrary environment variable and broadcast the change.
    pub fn set_var(&self, scope: PathScope, name: &str, value: &str) -> Result<()> {
        self.store.set_var(scope, name, value)?;
        self.notifier.notify();
        Ok(())
    }

    /// Delete an environment variable. Returns whether it existed; a
    /// missing variable is reported, not an error.
    pub fn delete_var(&self, scope: PathScope, name: &str) -> Result<bool> {
        let existed = self.store.delete_var(scope, name)?;
        if existed {
            self.notifier.notify();
        }
        Ok(existed)
    }

    /// Rebuild the current process PATH from the store (Machine then
    /// User, expanded), mirroring how the OS composes the two scopes for
    /// a fresh process. Best-effort convenience for the hosting process;
    /// already-spawned children keep whatever they inherited.
    pub fn refresh_process_path(&self) -> Result<String> {
        let machine = self.read_with_retry(PathScope::Machine)?;
        let user = self.read_with_retry(PathScope::User)?;

        let combined: Vec<&str> = machine
            .entries()
            .iter()
            .chain(user.entries().iter())
            .filter(|e| !e.is_empty())
            .map(PathEntry::expanded)
            .collect();
        let joined = combined.join(if cfg!(windows) { ";" } else { ":" });

        std::env::set_var("PATH", &joined);
        Ok(joined)
    }

    /// Read the PATH for a scope, retrying once on a transient failure.
    ///
    /// `AccessDenied` is surfaced immediately, since retrying a privilege
    /// error cannot succeed.
    fn read_with_retry(&self, scope: PathScope) -> Result<PathValue> {
        match self.store.read_path(scope) {
            Err(e) if e.is_retryable() => {
                tracing::warn!(%scope, error = %e, "registry read failed, retrying once");
                self.store.read_path(scope)
            }
            other => other,
        }
    }

    fn write_with_retry(&self, scope: PathScope, value: &PathValue) -> Result<()> {
        match self.store.write_path(scope, value) {
            Err(e) if e.is_retryable() => {
                tracing::warn!(%scope, error = %e, "registry write failed, retrying once");
                self.store.write_path(scope, value)
            }
            other => other,
        }
    }
}

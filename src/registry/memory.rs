//! In-memory environment store.
//!
//! Backs every test and the non-Windows fallback build. Values are held
//! as raw strings plus their stored kind, exactly as the registry-backed
//! store would hold them, so token-form and kind-preservation behavior
//! can be exercised without a Windows host. Failure injection covers the
//! two error paths callers must handle: privilege denial and transient
//! unavailability.

use super::{EnvironmentStore, PathScope, PATH_VALUE_NAME};
use crate::error::{PathmendError, Result};
use crate::path::entry::{process_env, EnvLookup};
use crate::path::{PathValue, ValueKind};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Hive {
    values: HashMap<String, (String, ValueKind)>,
}

/// An in-memory [`EnvironmentStore`].
pub struct MemoryStore {
    user: Mutex<Hive>,
    machine: Mutex<Hive>,
    env_fn: EnvLookup,
    deny_machine_writes: Mutex<bool>,
    fail_reads_once: Mutex<bool>,
}

impl MemoryStore {
    /// An empty store expanding tokens from the process environment.
    pub fn new() -> Self {
        Self::with_env(process_env())
    }

    /// An empty store with a custom token-expansion lookup.
    pub fn with_env(env_fn: EnvLookup) -> Self {
        Self {
            user: Mutex::new(Hive::default()),
            machine: Mutex::new(Hive::default()),
            env_fn,
            deny_machine_writes: Mutex::new(false),
            fail_reads_once: Mutex::new(false),
        }
    }

    /// Seed a scope's PATH value with a raw string and stored kind.
    pub fn seed_path(&self, scope: PathScope, raw: &str, kind: ValueKind) {
        self.hive(scope)
            .lock()
            .unwrap()
            .values
            .insert(PATH_VALUE_NAME.to_string(), (raw.to_string(), kind));
    }

    /// The raw stored string and kind for a scope's PATH, if any.
    pub fn stored_path(&self, scope: PathScope) -> Option<(String, ValueKind)> {
        self.hive(scope)
            .lock()
            .unwrap()
            .values
            .get(PATH_VALUE_NAME)
            .cloned()
    }

    /// Make Machine-scope writes fail with `AccessDenied`, as they do in
    /// an unelevated process.
    pub fn deny_machine_writes(&self) {
        *self.deny_machine_writes.lock().unwrap() = true;
    }

    /// Make the next read fail with `RegistryUnavailable` once.
    pub fn fail_next_read(&self) {
        *self.fail_reads_once.lock().unwrap() = true;
    }

    fn hive(&self, scope: PathScope) -> &Mutex<Hive> {
        match scope {
            PathScope::User => &self.user,
            PathScope::Machine => &self.machine,
        }
    }

    fn check_write(&self, scope: PathScope) -> Result<()> {
        if scope == PathScope::Machine && *self.deny_machine_writes.lock().unwrap() {
            return Err(PathmendError::AccessDenied {
                scope,
                message: "administrator privileges required".to_string(),
            });
        }
        Ok(())
    }

    fn check_read(&self, scope: PathScope) -> Result<()> {
        let mut flag = self.fail_reads_once.lock().unwrap();
        if *flag {
            *flag = false;
            return Err(PathmendError::RegistryUnavailable {
                scope,
                message: "injected transient failure".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentStore for MemoryStore {
    fn read_path(&self, scope: PathScope) -> Result<PathValue> {
        self.check_read(scope)?;
        match self.stored_path(scope) {
            Some((raw, kind)) => Ok(PathValue::parse_with_env(&raw, kind, &self.env_fn)),
            None => Ok(PathValue::empty()),
        }
    }

    fn write_path(&self, scope: PathScope, value: &PathValue) -> Result<()> {
        self.check_write(scope)?;
        self.hive(scope).lock().unwrap().values.insert(
            PATH_VALUE_NAME.to_string(),
            (value.serialize(), value.kind_for_write()),
        );
        Ok(())
    }

    fn read_var(&self, scope: PathScope, name: &str) -> Result<Option<String>> {
        self.check_read(scope)?;
        Ok(self
            .hive(scope)
            .lock()
            .unwrap()
            .values
            .get(name)
            .map(|(raw, _)| raw.clone()))
    }

    fn set_var(&self, scope: PathScope, name: &str, value: &str) -> Result<()> {
        self.check_write(scope)?;
        let kind = if crate::path::entry::has_token(value) {
            ValueKind::Expandable
        } else {
            ValueKind::Plain
        };
        self.hive(scope)
            .lock()
            .unwrap()
            .values
            .insert(name.to_string(), (value.to_string(), kind));
        Ok(())
    }

    fn delete_var(&self, scope: PathScope, name: &str) -> Result<bool> {
        self.check_write(scope)?;
        Ok(self
            .hive(scope)
            .lock()
            .unwrap()
            .values
            .remove(name)
            .is_some())
    }
}

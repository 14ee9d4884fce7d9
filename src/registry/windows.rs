//! Registry-backed environment store.
//!
//! Reads and writes the `Path` value under the scope's environment key,
//! always through the raw value API so the stored type (`REG_SZ` vs
//! `REG_EXPAND_SZ`) survives the round trip. Reading through the typed
//! API would silently expand tokens and lose the classification, the
//! exact corruption this store exists to prevent.

use super::{EnvironmentStore, PathScope, PATH_VALUE_NAME};
use crate::error::{PathmendError, Result};
use crate::path::entry::{process_env, EnvLookup};
use crate::path::{PathValue, ValueKind};
use std::io;
use winreg::enums::{RegType, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WRITE};
use winreg::{RegKey, RegValue};

/// [`EnvironmentStore`] backed by the Windows registry.
pub struct RegistryStore {
    env_fn: EnvLookup,
}

impl RegistryStore {
    /// A store expanding tokens from the process environment.
    pub fn new() -> Self {
        Self {
            env_fn: process_env(),
        }
    }

    fn open(&self, scope: PathScope, write: bool) -> Result<RegKey> {
        let root = match scope {
            PathScope::User => RegKey::predef(HKEY_CURRENT_USER),
            PathScope::Machine => RegKey::predef(HKEY_LOCAL_MACHINE),
        };
        let access = if write { KEY_READ | KEY_WRITE } else { KEY_READ };
        root.open_subkey_with_flags(scope.env_key(), access)
            .map_err(|e| map_error(scope, &e))
    }
}

impl Default for RegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentStore for RegistryStore {
    fn read_path(&self, scope: PathScope) -> Result<PathValue> {
        let key = self.open(scope, false)?;
        match key.get_raw_value(PATH_VALUE_NAME) {
            Ok(raw) => {
                let kind = kind_from_reg_type(&raw.vtype);
                let text = decode_utf16le(&raw.bytes);
                Ok(PathValue::parse_with_env(&text, kind, &self.env_fn))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(PathValue::empty()),
            Err(e) => Err(map_error(scope, &e)),
        }
    }

    fn write_path(&self, scope: PathScope, value: &PathValue) -> Result<()> {
        let key = self.open(scope, true)?;
        let reg_value = RegValue {
            bytes: encode_utf16le(&value.serialize()),
            vtype: reg_type_from_kind(value.kind_for_write()),
        };
        key.set_raw_value(PATH_VALUE_NAME, &reg_value)
            .map_err(|e| map_error(scope, &e))
    }

    fn read_var(&self, scope: PathScope, name: &str) -> Result<Option<String>> {
        let key = self.open(scope, false)?;
        match key.get_raw_value(name) {
            Ok(raw) => Ok(Some(decode_utf16le(&raw.bytes))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_error(scope, &e)),
        }
    }

    fn set_var(&self, scope: PathScope, name: &str, value: &str) -> Result<()> {
        let key = self.open(scope, true)?;
        let vtype = if crate::path::entry::has_token(value) {
            RegType::REG_EXPAND_SZ
        } else {
            RegType::REG_SZ
        };
        let reg_value = RegValue {
            bytes: encode_utf16le(value),
            vtype,
        };
        key.set_raw_value(name, &reg_value)
            .map_err(|e| map_error(scope, &e))
    }

    fn delete_var(&self, scope: PathScope, name: &str) -> Result<bool> {
        let key = self.open(scope, true)?;
        match key.delete_value(name) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_error(scope, &e)),
        }
    }
}

fn map_error(scope: PathScope, e: &io::Error) -> PathmendError {
    if e.kind() == io::ErrorKind::PermissionDenied {
        PathmendError::AccessDenied {
            scope,
            message: e.to_string(),
        }
    } else {
        PathmendError::RegistryUnavailable {
            scope,
            message: e.to_string(),
        }
    }
}

fn kind_from_reg_type(vtype: &RegType) -> ValueKind {
    match vtype {
        RegType::REG_EXPAND_SZ => ValueKind::Expandable,
        _ => ValueKind::Plain,
    }
}

fn reg_type_from_kind(kind: ValueKind) -> RegType {
    match kind {
        ValueKind::Expandable => RegType::REG_EXPAND_SZ,
        ValueKind::Plain => RegType::REG_SZ,
    }
}

/// Decode a registry string payload (UTF-16LE, possibly null-terminated).
fn decode_utf16le(bytes: &[u8]) -> String {
    let mut units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    while units.last() == Some(&0) {
        units.pop();
    }
    String::from_utf16_lossy(&units)
}

/// Encode a string as null-terminated UTF-16LE for a registry payload.
fn encode_utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

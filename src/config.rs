//! Settings file loading.
//!
//! Settings live in an optional `pathmend.yml` next to the working
//! directory (or wherever `--config` points). Everything has a default;
//! a missing file is not an error, a missing explicit `--config` path
//! is.
//!
//! ```yaml
//! execution_timeout_secs: 10
//! auto_apply: true
//! tools:
//!   - name: Deno
//!     command: deno
//!     install_roots: ["%USERPROFILE%\\.deno\\bin"]
//! ```

use crate::error::{PathmendError, Result};
use crate::tools::{self, ToolDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default settings file name, looked up in the working directory.
pub const SETTINGS_FILE: &str = "pathmend.yml";

/// Tunable behavior for verification and repair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Execution-test timeout in seconds.
    pub execution_timeout_secs: u64,

    /// Per-recipient broadcast delivery timeout in milliseconds.
    pub broadcast_timeout_ms: u32,

    /// Apply repair plans without interactive confirmation.
    pub auto_apply: bool,

    /// Extra tool descriptors merged over the builtin catalog. An entry
    /// with a builtin's command replaces that builtin.
    pub tools: Vec<ToolDescriptor>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            execution_timeout_secs: 10,
            broadcast_timeout_ms: crate::broadcast::DEFAULT_BROADCAST_TIMEOUT_MS,
            auto_apply: false,
            tools: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit path must exist and parse. Without one, the default
    /// file is used if present, otherwise defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(SETTINGS_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)?;
        serde_yaml::from_str(&text).map_err(|e| PathmendError::SettingsParseError {
            path,
            message: e.to_string(),
        })
    }

    /// The effective tool catalog: builtins plus configured extras,
    /// extras winning on command-name collision.
    pub fn catalog(&self) -> Vec<ToolDescriptor> {
        let mut catalog: Vec<ToolDescriptor> = tools::builtin_catalog()
            .into_iter()
            .filter(|builtin| {
                !self
                    .tools
                    .iter()
                    .any(|extra| extra.command.eq_ignore_ascii_case(&builtin.command))
            })
            .collect();
        catalog.extend(self.tools.iter().cloned());
        catalog
    }

    pub fn execution_timeout(&self) -> Duration {
        Duration::from_secs(self.execution_timeout_secs)
    }
}

//! Settings file support.
//!
//! Optional `fritz.toml`:
//!
//! ```toml
//! [portal]
//! host = "https://fritz.science"
//! token_file = "/home/me/.fritz/token.txt"
//!
//! [defaults]
//! group_id = 1423
//! allocation_id = 1050
//! priority = 0
//! ```
//!
//! Every key is optional; a missing file means built-in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::config::DEFAULT_HOST;
use super::repository::{ErrorContext, PortalError, PortalResult};
use crate::models::{AllocationId, GroupId, RequestDefaults};

pub const SETTINGS_FILE_NAME: &str = "fritz.toml";

/// Settings read from `fritz.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortalSettings {
    #[serde(default)]
    pub portal: PortalSection,
    #[serde(default)]
    pub defaults: DefaultsSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub token_file: Option<PathBuf>,
}

impl Default for PortalSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            token_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsSection {
    #[serde(default = "default_group_id")]
    pub group_id: i64,
    #[serde(default = "default_allocation_id")]
    pub allocation_id: i64,
    #[serde(default)]
    pub priority: i64,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            group_id: default_group_id(),
            allocation_id: default_allocation_id(),
            priority: 0,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_group_id() -> i64 {
    RequestDefaults::default().group_id.value()
}

fn default_allocation_id() -> i64 {
    RequestDefaults::default().allocation_id.value()
}

impl PortalSettings {
    /// Load settings from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the settings file
    ///
    /// # Returns
    /// * `Ok(PortalSettings)` if successful
    /// * `Err(PortalError::ConfigurationError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> PortalResult<Self> {
        let path = path.as_ref();
        let context = || ErrorContext::new("load_settings").with_entity_id(path.display());

        let content = fs::read_to_string(path).map_err(|e| PortalError::ConfigurationError {
            message: format!("Failed to read settings file: {}", e),
            context: context(),
        })?;

        toml::from_str(&content).map_err(|e| PortalError::ConfigurationError {
            message: format!("Failed to parse settings file: {}", e),
            context: context(),
        })
    }

    /// Load settings from the first default location that exists.
    ///
    /// Searches for `fritz.toml` in:
    /// 1. Current directory
    /// 2. `fritz_tools/` directory
    /// 3. Parent directory
    ///
    /// # Returns
    /// * `Ok(None)` if no settings file exists
    /// * `Err(PortalError)` if a file exists but cannot be parsed
    pub fn from_default_location() -> PortalResult<Option<Self>> {
        let search_paths = [
            PathBuf::from(SETTINGS_FILE_NAME),
            PathBuf::from("fritz_tools").join(SETTINGS_FILE_NAME),
            PathBuf::from("..").join(SETTINGS_FILE_NAME),
        ];

        for path in search_paths.iter() {
            if path.exists() {
                debug!("Using settings from {}", path.display());
                return Self::from_file(path).map(Some);
            }
        }
        Ok(None)
    }

    /// Load from `explicit` when given, else from the default locations,
    /// else fall back to built-in defaults.
    pub fn load(explicit: Option<&Path>) -> PortalResult<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => Ok(Self::from_default_location()?.unwrap_or_default()),
        }
    }

    /// Request defaults described by the `[defaults]` section.
    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            group_id: GroupId(self.defaults.group_id),
            allocation_id: AllocationId(self.defaults.allocation_id),
            priority: self.defaults.priority,
        }
    }
}

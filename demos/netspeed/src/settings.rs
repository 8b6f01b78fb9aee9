use std::{env::VarError, time::Duration};

use serde::{Deserialize, Serialize};

use crate::errors::SettingsError;

/// Environment variable holding the path of a JSON settings file.
pub const SETTINGS_PATH_VAR: &str = "NETSPEED_SETTINGS";

const DEFAULT_INTERFACE: &str = "lo";
// Similar to top.
const DEFAULT_REFRESH_INTERVAL_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetspeedSettings {
    pub interface: String,
    pub refresh_interval_ms: u64,
}

impl NetspeedSettings {
    /// Load the settings file named by [`SETTINGS_PATH_VAR`], or the defaults
    /// if the variable is not set.
    ///
    /// Fields missing from the file keep their default value.
    pub fn load() -> Result<Self, SettingsError> {
        Self::from_path_var(std::env::var(SETTINGS_PATH_VAR))
    }

    fn from_path_var(path: Result<String, VarError>) -> Result<Self, SettingsError> {
        match path {
            Ok(path) => Self::from_file(path),
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(path)) => Err(SettingsError::PathNotUnicode(
                path.to_string_lossy().into_owned(),
            )),
        }
    }

    pub fn from_file(path: String) -> Result<Self, SettingsError> {
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(source) => return Err(SettingsError::Read { path, source }),
        };
        Self::from_json(path, &contents)
    }

    fn from_json(path: String, contents: &str) -> Result<Self, SettingsError> {
        let settings: Self = match serde_json::from_str(contents) {
            Ok(settings) => settings,
            Err(source) => return Err(SettingsError::Json { path, source }),
        };
        if settings.refresh_interval_ms == 0 {
            return Err(SettingsError::ZeroRefreshInterval { path });
        }
        Ok(settings)
    }

    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

impl Default for NetspeedSettings {
    fn default() -> Self {
        Self {
            interface: String::from(DEFAULT_INTERFACE),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

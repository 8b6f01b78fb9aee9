use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetspeedError {
    #[error("Couldn't read interface statistics: {0}")]
    Io(#[from] io::Error),
    #[error("Interface {0} not found")]
    InterfaceNotFound(String),
    #[error("Malformed statistics for interface {interface}: {line}")]
    Parse { interface: String, line: String },
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Settings path {0} is not valid unicode")]
    PathNotUnicode(String),
    #[error("Couldn't read settings file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("Invalid settings file {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Invalid settings file {path}: refresh_interval_ms must be positive")]
    ZeroRefreshInterval { path: String },
}

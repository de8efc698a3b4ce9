use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("host action unavailable: {0}")]
    Unavailable(&'static str),

    #[error("tool {tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("host dropped the pending call")]
    Dropped,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read fixture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("state directory unavailable: no home directory and no --state-dir")]
    NoStateDir,
}

//! Error types for schema discovery and configuration loading.

use std::path::PathBuf;

use aspect_flags_core::ValidationError;
use thiserror::Error;

use crate::wire::WireError;

/// Errors raised while retrieving the flag schema from a located Bazel.
///
/// "No workspace" and "no Bazel binary" are not errors; sources report them
/// as [`SchemaDiscovery::NotFound`](crate::SchemaDiscovery::NotFound).
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Bazel could not be started.
    #[error("failed to run {}: {source}", .binary.display())]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the Bazel process failed.
    #[error("failed to wait on {}: {source}", .binary.display())]
    Wait {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Bazel did not answer within the probe timeout.
    #[error("bazel did not print its flags within {seconds}s")]
    TimedOut { seconds: u64 },

    /// Bazel exited unsuccessfully.
    #[error("bazel exited with {}: {stderr}", .code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
    Failed { code: Option<i32>, stderr: String },

    /// Bazel's output is not valid base64.
    #[error("flag schema is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Bazel's output is not a valid `FlagCollection` message.
    #[error("flag schema is not a valid protobuf message: {0}")]
    Wire(#[from] WireError),

    /// The decoded schema failed structural validation.
    #[error("flag schema failed validation: {}", join_errors(.0))]
    InvalidSchema(Vec<ValidationError>),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON schema parsing failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading the front-end config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for the expected shape.
    #[error("invalid config {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Convenience alias for results with [`DiscoveryError`].
pub type Result<T> = std::result::Result<T, DiscoveryError>;

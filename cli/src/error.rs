//! Error types for flag synthesis and replay.

use aspect_flags_core::FlagValueError;
use aspect_flags_discovery::DiscoveryError;
use thiserror::Error;

/// Errors that abort flag synthesis.
///
/// Any of these is fatal to CLI startup: registering a partial flag surface
/// would let the front-end disagree with Bazel about which flags exist.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Bazel was found but its schema could not be retrieved.
    #[error("unable to determine available bazel flags: {0}")]
    SchemaUnavailable(#[source] DiscoveryError),

    /// A flag name is already registered in the target namespace.
    #[error("flag --{flag} is already defined on command '{command}'")]
    DuplicateFlag { command: String, flag: String },

    /// A shorthand is already used by another flag visible in the namespace.
    #[error("shorthand -{shorthand} for --{flag} is already used on command '{command}'")]
    DuplicateShorthand {
        command: String,
        flag: String,
        shorthand: char,
    },
}

/// A parsed occurrence could not be stored in its binding.
#[derive(Debug, Error)]
#[error("invalid value for --{flag}: {source}")]
pub struct ApplyError {
    pub flag: String,
    #[source]
    pub source: FlagValueError,
}

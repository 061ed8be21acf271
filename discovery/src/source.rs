//! Flag schema sources.
//!
//! The registration driver only needs one call: "give me every flag the
//! wrapped tool knows, or tell me there is no tool here". The absence of a
//! workspace is part of the return type rather than an error, so callers
//! cannot mistake best-effort augmentation for a failure.

use std::path::Path;

use aspect_flags_core::{FlagDescriptor, validate_descriptors};

use crate::error::{DiscoveryError, Result};

/// Why no schema could be looked up in the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// Not inside a Bazel workspace.
    NoWorkspace,
    /// Inside a workspace, but no Bazel binary could be located.
    NoBazelBinary,
}

/// Outcome of a schema lookup that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaDiscovery {
    /// The tool answered with its descriptors.
    Found(Vec<FlagDescriptor>),
    /// There is no tool to ask; augmentation is skipped.
    NotFound(NotFoundReason),
}

impl SchemaDiscovery {
    /// Descriptors, empty when nothing was found.
    pub fn into_descriptors(self) -> Vec<FlagDescriptor> {
        match self {
            Self::Found(descriptors) => descriptors,
            Self::NotFound(_) => Vec::new(),
        }
    }
}

/// Something that can report the wrapped tool's flag schema.
pub trait FlagSchemaSource {
    /// Queries the schema once.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscoveryError`] only when the tool exists but its schema
    /// could not be retrieved.
    fn discover_flag_schema(&self) -> Result<SchemaDiscovery>;
}

/// Fixed, in-memory schema.
///
/// # Examples
///
/// ```
/// use aspect_flags_core::FlagDescriptor;
/// use aspect_flags_discovery::{FlagSchemaSource, SchemaDiscovery, StaticSchemaSource};
///
/// let source = StaticSchemaSource::new(vec![FlagDescriptor::new("keep_going")]);
/// let SchemaDiscovery::Found(flags) = source.discover_flag_schema().unwrap() else {
///     panic!("expected descriptors");
/// };
/// assert_eq!(flags[0].name, "keep_going");
///
/// let nothing = StaticSchemaSource::no_workspace();
/// assert!(nothing.discover_flag_schema().unwrap().into_descriptors().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct StaticSchemaSource {
    discovery: SchemaDiscovery,
}

impl StaticSchemaSource {
    pub fn new(descriptors: Vec<FlagDescriptor>) -> Self {
        Self {
            discovery: SchemaDiscovery::Found(descriptors),
        }
    }

    /// A source that behaves as if run outside any workspace.
    pub fn no_workspace() -> Self {
        Self {
            discovery: SchemaDiscovery::NotFound(NotFoundReason::NoWorkspace),
        }
    }

    /// Loads a JSON array of descriptors.
    ///
    /// # Errors
    ///
    /// I/O and JSON failures, or [`DiscoveryError::InvalidSchema`] when the
    /// descriptors fail validation.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let descriptors: Vec<FlagDescriptor> = serde_json::from_str(&raw)?;
        let errors = validate_descriptors(&descriptors);
        if !errors.is_empty() {
            return Err(DiscoveryError::InvalidSchema(errors));
        }
        Ok(Self::new(descriptors))
    }
}

impl FlagSchemaSource for StaticSchemaSource {
    fn discover_flag_schema(&self) -> Result<SchemaDiscovery> {
        Ok(self.discovery.clone())
    }
}

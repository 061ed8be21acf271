//! Flag descriptor types reported by the wrapped build tool.
//!
//! A [`FlagDescriptor`] is the read-only record Bazel publishes for each of
//! its options (`bazel help flags-as-proto`). The front-end never edits
//! descriptors; it classifies them into a [`FlagKind`] and synthesizes
//! matching flags on its own command tree.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Command name Bazel uses for options accepted before the verb.
///
/// A descriptor listing this name is registered on the root command as a
/// persistent flag rather than on a subcommand.
pub const STARTUP_COMMAND: &str = "startup";

/// One flag as described by the wrapped tool.
///
/// # Examples
///
/// ```
/// use aspect_flags_core::FlagDescriptor;
///
/// let flag = FlagDescriptor::new("keep_going")
///     .with_abbreviation('k')
///     .with_negative_flag()
///     .with_commands(["startup", "build"]);
///
/// assert!(flag.applies_to("build"));
/// assert!(flag.is_startup());
/// assert!(!flag.applies_to("query"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagDescriptor {
    /// Flag name without leading dashes (e.g. `keep_going`).
    pub name: String,
    /// Single-character shorthand, if the tool defines one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<char>,
    /// Help text.
    #[serde(default)]
    pub documentation: String,
    /// The tool accepts a `no`-prefixed form of this boolean flag.
    #[serde(default)]
    pub has_negative_flag: bool,
    /// Repeated occurrences accumulate instead of overwriting.
    #[serde(default)]
    pub allows_multiple: bool,
    /// Command names this flag is valid for, including [`STARTUP_COMMAND`].
    #[serde(default)]
    pub commands: BTreeSet<String>,
}

impl FlagDescriptor {
    /// Creates a descriptor with the given name and no capabilities.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Sets the single-character shorthand.
    pub fn with_abbreviation(mut self, abbreviation: char) -> Self {
        self.abbreviation = Some(abbreviation);
        self
    }

    /// Sets the help text.
    pub fn with_documentation(mut self, documentation: &str) -> Self {
        self.documentation = documentation.to_string();
        self
    }

    /// Marks the flag as having a `no`-prefixed negative form.
    pub fn with_negative_flag(mut self) -> Self {
        self.has_negative_flag = true;
        self
    }

    /// Marks the flag as accumulating repeated occurrences.
    pub fn allow_multiple(mut self) -> Self {
        self.allows_multiple = true;
        self
    }

    /// Adds applicable command names.
    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }

    /// Returns `true` if the flag is valid for `command`.
    pub fn applies_to(&self, command: &str) -> bool {
        self.commands.contains(command)
    }

    /// Returns `true` if the flag is a startup (pre-verb) option.
    pub fn is_startup(&self) -> bool {
        self.applies_to(STARTUP_COMMAND)
    }
}

/// Synthesis shape chosen for a descriptor.
///
/// Produced by [`classify`](crate::classify) and consumed by the
/// registration driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagKind {
    /// `--name` / `--noname` pair sharing one boolean.
    NegatableBool,
    /// Accumulates every occurrence in order.
    MultiString,
    /// Plain boolean without a negated companion, default `false`.
    ExpandoBool,
    /// Plain string, default empty.
    ScalarString,
}

impl FlagKind {
    /// Stable lowercase label used in listings.
    pub fn label(self) -> &'static str {
        match self {
            Self::NegatableBool => "negatable_bool",
            Self::MultiString => "multi_string",
            Self::ExpandoBool => "expando_bool",
            Self::ScalarString => "scalar_string",
        }
    }

    /// Returns `true` for the two boolean-typed shapes.
    pub fn is_boolean(self) -> bool {
        matches!(self, Self::NegatableBool | Self::ExpandoBool)
    }
}

impl fmt::Display for FlagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_builder() {
        let flag = FlagDescriptor::new("copt")
            .with_documentation("Additional options to pass to gcc.")
            .allow_multiple()
            .with_commands(["build", "test", "build"]);

        assert_eq!(flag.name, "copt");
        assert!(flag.allows_multiple);
        assert!(!flag.has_negative_flag);
        assert_eq!(flag.commands.len(), 2);
        assert!(!flag.is_startup());
    }

    #[test]
    fn test_descriptor_json_defaults() {
        let flag: FlagDescriptor =
            serde_json::from_str(r#"{"name": "output_base", "commands": ["startup"]}"#).unwrap();

        assert_eq!(flag.abbreviation, None);
        assert!(flag.documentation.is_empty());
        assert!(flag.is_startup());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(FlagKind::NegatableBool.to_string(), "negatable_bool");
        assert!(FlagKind::ExpandoBool.is_boolean());
        assert!(!FlagKind::MultiString.is_boolean());
    }
}

//! Descriptor classification.
//!
//! Bazel does not say whether a flag without a negative form is a boolean or
//! a string. The only booleans we can recognize are the "expando" flags,
//! options that expand into other options during Bazel's own parsing and so
//! never get a `--no` form. They are kept in a curated table.

use std::collections::BTreeSet;

use crate::types::{FlagDescriptor, FlagKind};

/// Bazel flags that expand to other flags.
///
/// Union across the supported Bazel releases, gathered from the "Expands
/// to:" entries of the command-line reference. Update when a new release
/// adds one.
pub const BAZEL_EXPANDO_FLAGS: &[&str] = &[
    "debug_app",
    "experimental_persistent_javac",
    "experimental_spawn_scheduler",
    "expunge_async",
    "host_jvm_debug",
    "java_debug",
    "long",
    "noincompatible_genquery_use_graphless_query",
    "noorder_results",
    "null",
    "order_results",
    "persistent_android_dex_desugar",
    "persistent_android_resource_processor",
    "persistent_multiplex_android_dex_desugar",
    "persistent_multiplex_android_resource_processor",
    "persistent_multiplex_android_tools",
    "remote_download_minimal",
    "remote_download_toplevel",
    "short",
    "start_app",
];

/// Names synthesized as plain, non-negatable booleans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandoSet {
    names: BTreeSet<String>,
}

impl ExpandoSet {
    /// The curated Bazel table.
    pub fn bazel() -> Self {
        Self::from_names(BAZEL_EXPANDO_FLAGS.iter().copied())
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds names on top of the current set.
    pub fn with_extra<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Chooses the synthesis shape for a descriptor.
///
/// First match wins: negative form, then multiple occurrences, then the
/// expando table; everything else is a scalar string.
///
/// # Examples
///
/// ```
/// use aspect_flags_core::{ExpandoSet, FlagDescriptor, FlagKind, classify};
///
/// let expando = ExpandoSet::bazel();
///
/// let keep_going = FlagDescriptor::new("keep_going").with_negative_flag();
/// assert_eq!(classify(&keep_going, &expando), FlagKind::NegatableBool);
///
/// let expunge_async = FlagDescriptor::new("expunge_async");
/// assert_eq!(classify(&expunge_async, &expando), FlagKind::ExpandoBool);
///
/// let output_base = FlagDescriptor::new("output_base");
/// assert_eq!(classify(&output_base, &expando), FlagKind::ScalarString);
/// ```
pub fn classify(descriptor: &FlagDescriptor, expando: &ExpandoSet) -> FlagKind {
    if descriptor.has_negative_flag {
        FlagKind::NegatableBool
    } else if descriptor.allows_multiple {
        FlagKind::MultiString
    } else if expando.contains(&descriptor.name) {
        FlagKind::ExpandoBool
    } else {
        FlagKind::ScalarString
    }
}

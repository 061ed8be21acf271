//! Help visibility of synthesized flags.
//!
//! Bazel exposes several hundred options. Only a handful are worth showing in
//! `aspect help`; the rest are registered so they parse and pass through, but
//! stay hidden.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Bazel flags shown in help output by default.
pub const DOCUMENTED_BAZEL_FLAGS: &[&str] = &["keep_going", "expunge", "expunge_async", "show_make_env"];

/// Whether a synthesized flag appears in help output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Shown,
    Hidden,
}

impl Visibility {
    pub fn is_hidden(self) -> bool {
        self == Self::Hidden
    }
}

/// Allow-list of flag names shown in help.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentedFlags {
    names: BTreeSet<String>,
}

impl DocumentedFlags {
    /// The default Bazel allow-list.
    pub fn bazel() -> Self {
        Self::from_names(DOCUMENTED_BAZEL_FLAGS.iter().copied())
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

    /// Adds names on top of the current allow-list.
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

    /// Visibility of the flag registered under `name`.
    ///
    /// Callers pass the plain name for a negated companion so both names of
    /// a pair share one visibility.
    ///
    /// # Examples
    ///
    /// ```
    /// use aspect_flags_core::{DocumentedFlags, Visibility};
    ///
    /// let documented = DocumentedFlags::bazel();
    /// assert_eq!(documented.visibility("keep_going"), Visibility::Shown);
    /// assert_eq!(documented.visibility("output_base"), Visibility::Hidden);
    /// ```
    pub fn visibility(&self, name: &str) -> Visibility {
        if self.contains(name) {
            Visibility::Shown
        } else {
            Visibility::Hidden
        }
    }
}

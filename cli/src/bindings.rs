//! Storage behind synthesized flags, and replay of parsed occurrences.
//!
//! clap parses and validates the command line; afterwards
//! [`SynthesizedFlags::apply_matches`] walks every occurrence of every
//! synthesized flag in command-line order and stores it through the flag's
//! [`FlagValue`]. For a negatable pair, occurrences of both names are
//! interleaved by position, so the last one on the command line wins.

use aspect_flags_core::{
    BoolValue, FlagKind, FlagValue, MultiString, NegatableBool, StringValue, Visibility,
};
use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::error::ApplyError;

/// Command a synthesized flag was registered on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// Root command, persistent namespace (Bazel startup options).
    Root,
    /// A subcommand's local namespace.
    Subcommand(String),
}

impl Scope {
    pub fn subcommand(name: impl Into<String>) -> Self {
        Self::Subcommand(name.into())
    }
}

/// Typed storage of one synthesized flag.
#[derive(Debug, Clone)]
pub enum FlagBinding {
    NegatableBool(NegatableBool),
    MultiString(MultiString),
    ExpandoBool(BoolValue),
    ScalarString(StringValue),
}

impl FlagBinding {
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::NegatableBool(_) => FlagKind::NegatableBool,
            Self::MultiString(_) => FlagKind::MultiString,
            Self::ExpandoBool(_) => FlagKind::ExpandoBool,
            Self::ScalarString(_) => FlagKind::ScalarString,
        }
    }

    /// Current value in flag syntax.
    pub fn render(&self) -> String {
        match self {
            Self::NegatableBool(binding) => binding.plain().render(),
            Self::MultiString(value) => value.render(),
            Self::ExpandoBool(value) => value.render(),
            Self::ScalarString(value) => value.render(),
        }
    }

    fn apply(&mut self, negated: bool, raw: &str) -> Result<(), aspect_flags_core::FlagValueError> {
        match self {
            Self::NegatableBool(binding) if negated => binding.negated().apply(raw),
            Self::NegatableBool(binding) => binding.plain().apply(raw),
            Self::MultiString(value) => value.apply(raw),
            Self::ExpandoBool(value) => value.apply(raw),
            Self::ScalarString(value) => value.apply(raw),
        }
    }
}

/// One synthesized flag on one command.
#[derive(Debug, Clone)]
pub struct FlagEntry {
    pub scope: Scope,
    pub name: String,
    /// Name of the negated companion, for negatable booleans.
    pub negated_name: Option<String>,
    pub visibility: Visibility,
    pub binding: FlagBinding,
    changed: bool,
}

impl FlagEntry {
    pub fn new(scope: Scope, name: impl Into<String>, binding: FlagBinding) -> Self {
        Self {
            scope,
            name: name.into(),
            negated_name: None,
            visibility: Visibility::Hidden,
            binding,
            changed: false,
        }
    }

    pub fn with_negated_name(mut self, negated: impl Into<String>) -> Self {
        self.negated_name = Some(negated.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn kind(&self) -> FlagKind {
        self.binding.kind()
    }

    /// Whether the flag appeared on the command line.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Command-line tokens that reproduce this flag's value for Bazel.
    ///
    /// Empty when the flag was not given.
    pub fn forwarded_args(&self) -> Vec<String> {
        if !self.changed {
            return Vec::new();
        }
        match &self.binding {
            FlagBinding::NegatableBool(binding) if binding.get() => {
                vec![format!("--{}", self.name)]
            }
            FlagBinding::NegatableBool(_) => {
                let negated = self.negated_name.as_deref().unwrap_or(&self.name);
                vec![format!("--{negated}")]
            }
            FlagBinding::ExpandoBool(value) if value.get() => vec![format!("--{}", self.name)],
            FlagBinding::ExpandoBool(_) => vec![format!("--{}=false", self.name)],
            FlagBinding::MultiString(values) => values
                .values()
                .iter()
                .map(|value| format!("--{}={value}", self.name))
                .collect(),
            FlagBinding::ScalarString(value) => vec![format!("--{}={}", self.name, value.get())],
        }
    }

    fn occurrences(&self, matches: &ArgMatches) -> Vec<(usize, bool, String)> {
        let mut events: Vec<(usize, bool, String)> = raw_occurrences(matches, &self.name)
            .into_iter()
            .map(|(index, raw)| (index, false, raw))
            .collect();
        if let Some(negated) = &self.negated_name {
            events.extend(
                raw_occurrences(matches, negated)
                    .into_iter()
                    .map(|(index, raw)| (index, true, raw)),
            );
        }
        events.sort_by_key(|(index, ..)| *index);
        events
    }

    fn apply_from(&mut self, matches: &ArgMatches) -> Result<(), ApplyError> {
        for (_, negated, raw) in self.occurrences(matches) {
            self.binding.apply(negated, &raw).map_err(|source| ApplyError {
                flag: match (&self.negated_name, negated) {
                    (Some(name), true) => name.clone(),
                    _ => self.name.clone(),
                },
                source,
            })?;
            self.changed = true;
        }
        Ok(())
    }
}

/// Every flag synthesized from the Bazel schema, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SynthesizedFlags {
    entries: Vec<FlagEntry>,
}

impl SynthesizedFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: FlagEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[FlagEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, scope: &Scope, name: &str) -> Option<&FlagEntry> {
        self.entries
            .iter()
            .find(|entry| &entry.scope == scope && entry.name == name)
    }

    pub fn in_scope<'a>(&'a self, scope: &'a Scope) -> impl Iterator<Item = &'a FlagEntry> + 'a {
        self.entries.iter().filter(move |entry| &entry.scope == scope)
    }

    pub fn get_bool(&self, scope: &Scope, name: &str) -> Option<bool> {
        match &self.get(scope, name)?.binding {
            FlagBinding::NegatableBool(binding) => Some(binding.get()),
            FlagBinding::ExpandoBool(value) => Some(value.get()),
            _ => None,
        }
    }

    pub fn get_string(&self, scope: &Scope, name: &str) -> Option<&str> {
        match &self.get(scope, name)?.binding {
            FlagBinding::ScalarString(value) => Some(value.get()),
            _ => None,
        }
    }

    pub fn get_strings(&self, scope: &Scope, name: &str) -> Option<&[String]> {
        match &self.get(scope, name)?.binding {
            FlagBinding::MultiString(values) => Some(values.values()),
            _ => None,
        }
    }

    /// Stores every synthesized flag occurrence found in `matches`.
    ///
    /// `matches` are the root command's matches. Root entries read them
    /// directly; subcommand entries read the invoked subcommand's matches
    /// and are skipped for other subcommands.
    ///
    /// clap copies values of a persistent flag between the root and the
    /// invoked subcommand. When the subcommand declares a flag of the same
    /// name, the occurrence is credited to the subcommand only.
    ///
    /// # Errors
    ///
    /// [`ApplyError`] if a value is rejected by its binding. Values accepted
    /// by the registered value parsers never are.
    pub fn apply_matches(&mut self, matches: &ArgMatches) -> Result<(), ApplyError> {
        let invoked = matches.subcommand();
        let claimed: Vec<String> = match invoked {
            Some((name, sub_matches)) => self
                .entries
                .iter()
                .filter(|entry| entry.scope == Scope::Subcommand(name.to_string()))
                .filter(|entry| !entry.occurrences(sub_matches).is_empty())
                .map(|entry| entry.name.clone())
                .collect(),
            None => Vec::new(),
        };

        for entry in &mut self.entries {
            let scoped = match &entry.scope {
                Scope::Root if claimed.contains(&entry.name) => continue,
                Scope::Root => matches,
                Scope::Subcommand(name) => match invoked {
                    Some((invoked_name, sub_matches)) if invoked_name == name => sub_matches,
                    _ => continue,
                },
            };
            entry.apply_from(scoped)?;
        }
        Ok(())
    }

    /// Tokens reproducing every flag of `scope` that was given, in
    /// registration order.
    pub fn forwarded_args(&self, scope: &Scope) -> Vec<String> {
        self.in_scope(scope)
            .flat_map(FlagEntry::forwarded_args)
            .collect()
    }
}

/// `(index, raw value)` for each command-line occurrence of `id`.
fn raw_occurrences(matches: &ArgMatches, id: &str) -> Vec<(usize, String)> {
    if matches.value_source(id) != Some(ValueSource::CommandLine) {
        return Vec::new();
    }
    let (Some(indices), Some(raw)) = (matches.indices_of(id), matches.get_raw(id)) else {
        return Vec::new();
    };
    indices
        .zip(raw)
        .map(|(index, value)| (index, value.to_string_lossy().into_owned()))
        .collect()
}

//! Synthesizes Bazel's flags onto the front-end's command tree.
//!
//! One call, [`synthesize_flags`], does the whole job at startup:
//!
//! 1. Ask a [`FlagSchemaSource`] for Bazel's flag schema. No workspace or no
//!    Bazel means nothing to do.
//! 2. Classify every descriptor and register it on each command it applies
//!    to: `startup` flags on the root as persistent flags, all others as
//!    local flags of the matching subcommand. Commands the front-end does not
//!    have are skipped.
//! 3. Hide every flag that is not on the documented list.
//! 4. Mark the Bazel-backed subcommands as delegated, so flags Bazel knows
//!    and the front-end does not still reach Bazel.

use std::collections::{BTreeMap, BTreeSet};

use aspect_flags_core::{
    BoolValue, DocumentedFlags, ExpandoSet, FlagDescriptor, FlagKind, MultiString,
    STARTUP_COMMAND, StringValue, Visibility, classify, negated_flag_name,
};
use aspect_flags_discovery::config::DEFAULT_ADMINISTRATIVE_COMMANDS;
use aspect_flags_discovery::{CliConfig, FlagSchemaSource, SchemaDiscovery};
use clap::Command;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::bindings::{FlagBinding, FlagEntry, Scope, SynthesizedFlags};
use crate::error::SynthesisError;
use crate::register::{
    FlagSpec, Namespace, check_inherited, hide_flag, mark_delegated, register_bool,
    register_multi_string, register_negatable, register_string,
};

/// Tables and policies that steer synthesis.
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    pub expando: ExpandoSet,
    pub documented: DocumentedFlags,
    /// Subcommands that receive Bazel flags but are never delegated.
    pub administrative: BTreeSet<String>,
    /// Initial value of every negatable boolean.
    pub negatable_default: bool,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            expando: ExpandoSet::bazel(),
            documented: DocumentedFlags::bazel(),
            administrative: DEFAULT_ADMINISTRATIVE_COMMANDS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            negatable_default: false,
        }
    }
}

impl SynthesisOptions {
    /// Built-in tables extended by the `flags` and `commands` config sections.
    ///
    /// Configured administrative commands are added to `version` and
    /// `flags`, which always stay administrative.
    pub fn from_config(config: &CliConfig) -> Self {
        let mut administrative = Self::default().administrative;
        administrative.extend(config.commands.administrative.iter().cloned());
        Self {
            expando: ExpandoSet::bazel().with_extra(&config.flags.expando),
            documented: DocumentedFlags::bazel().with_extra(&config.flags.documented),
            administrative,
            negatable_default: false,
        }
    }
}

/// A descriptor together with how it was synthesized.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedFlag {
    #[serde(flatten)]
    pub descriptor: FlagDescriptor,
    pub kind: FlagKind,
    pub visibility: Visibility,
}

/// Result of [`synthesize_flags`].
#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    /// Storage for every registered flag.
    pub flags: SynthesizedFlags,
    /// The classified schema, in schema order.
    pub schema: Vec<ClassifiedFlag>,
    /// Subcommands marked as delegated.
    pub delegated: Vec<String>,
}

/// Registers Bazel's flags on `root` and its subcommands.
///
/// Outside a workspace, or with no Bazel available, this is a no-op that
/// returns an empty [`Synthesis`].
///
/// # Errors
///
/// [`SynthesisError::SchemaUnavailable`] if Bazel was found but its schema
/// could not be read; [`SynthesisError::DuplicateFlag`] or
/// [`SynthesisError::DuplicateShorthand`] if a name collides with a flag
/// already on the command tree. `root` may be partially modified on error;
/// callers are expected to abort.
pub fn synthesize_flags(
    root: &mut Command,
    source: &dyn FlagSchemaSource,
    options: &SynthesisOptions,
) -> Result<Synthesis, SynthesisError> {
    let descriptors = match source
        .discover_flag_schema()
        .map_err(SynthesisError::SchemaUnavailable)?
    {
        SchemaDiscovery::Found(descriptors) => descriptors,
        SchemaDiscovery::NotFound(reason) => {
            debug!(?reason, "No bazel flag schema available, skipping flag synthesis");
            return Ok(Synthesis::default());
        }
    };
    synthesize_from_descriptors(root, &descriptors, options)
}

/// Same as [`synthesize_flags`] for an already discovered schema.
pub fn synthesize_from_descriptors(
    root: &mut Command,
    descriptors: &[FlagDescriptor],
    options: &SynthesisOptions,
) -> Result<Synthesis, SynthesisError> {
    let verbs = subcommand_verbs(root);
    let mut synthesis = Synthesis::default();
    let mut touched: BTreeSet<String> = BTreeSet::new();

    for descriptor in descriptors {
        let kind = classify(descriptor, &options.expando);
        let visibility = options.documented.visibility(&descriptor.name);
        trace!(flag = %descriptor.name, %kind, "Classified bazel flag");

        let mut registered_on: BTreeSet<&str> = BTreeSet::new();
        for command in &descriptor.commands {
            let (cmd, scope, namespace) = if command == STARTUP_COMMAND {
                (&mut *root, Scope::Root, Namespace::Persistent)
            } else {
                let Some(sub_name) = verbs.get(command.as_str()) else {
                    trace!(flag = %descriptor.name, %command, "Skipping flag for unknown command");
                    continue;
                };
                if !registered_on.insert(sub_name.as_str()) {
                    continue;
                }
                let Some(sub) = root.find_subcommand_mut(sub_name) else {
                    continue;
                };
                touched.insert(sub_name.clone());
                (sub, Scope::subcommand(sub_name.clone()), Namespace::Local)
            };

            let spec = FlagSpec::new(&descriptor.name, namespace)
                .with_shorthand(descriptor.abbreviation)
                .with_help(&descriptor.documentation);
            let mut entry = FlagEntry::new(
                scope,
                &descriptor.name,
                register_shape(cmd, &spec, kind, options)?,
            )
            .with_visibility(visibility);
            if kind == FlagKind::NegatableBool {
                entry = entry.with_negated_name(negated_flag_name(&descriptor.name));
            }

            if visibility.is_hidden() {
                hide_flag(cmd, &entry.name);
                if let Some(negated) = &entry.negated_name {
                    hide_flag(cmd, negated);
                }
            }
            synthesis.flags.push(entry);
        }

        synthesis.schema.push(ClassifiedFlag {
            descriptor: descriptor.clone(),
            kind,
            visibility,
        });
    }

    check_inherited(root)?;

    for sub_name in &touched {
        let primary = sub_name.split_whitespace().next().unwrap_or(sub_name.as_str());
        if options.administrative.contains(primary) {
            continue;
        }
        if let Some(sub) = root.find_subcommand_mut(sub_name) {
            mark_delegated(sub);
            synthesis.delegated.push(sub_name.clone());
        }
    }

    info!(
        flags = synthesis.schema.len(),
        registrations = synthesis.flags.len(),
        delegated = synthesis.delegated.len(),
        "Synthesized bazel flags"
    );
    Ok(synthesis)
}

/// Registers one flag in the shape its kind calls for.
fn register_shape(
    cmd: &mut Command,
    spec: &FlagSpec<'_>,
    kind: FlagKind,
    options: &SynthesisOptions,
) -> Result<FlagBinding, SynthesisError> {
    match kind {
        FlagKind::NegatableBool => {
            register_negatable(cmd, spec, options.negatable_default).map(FlagBinding::NegatableBool)
        }
        FlagKind::MultiString => {
            register_multi_string(cmd, spec)?;
            Ok(FlagBinding::MultiString(MultiString::default()))
        }
        FlagKind::ExpandoBool => {
            register_bool(cmd, spec)?;
            Ok(FlagBinding::ExpandoBool(BoolValue::new(false)))
        }
        FlagKind::ScalarString => {
            register_string(cmd, spec)?;
            Ok(FlagBinding::ScalarString(StringValue::new("")))
        }
    }
}

/// Maps each subcommand's primary verb and aliases to its name.
///
/// The primary verb is the first whitespace-separated word of the name.
fn subcommand_verbs(root: &Command) -> BTreeMap<String, String> {
    let mut verbs = BTreeMap::new();
    for sub in root.get_subcommands() {
        let name = sub.get_name();
        let primary = name.split_whitespace().next().unwrap_or(name);
        for verb in std::iter::once(primary).chain(sub.get_all_aliases()) {
            verbs
                .entry(verb.to_string())
                .or_insert_with(|| name.to_string());
        }
    }
    verbs
}

//! Registration primitives on a clap [`Command`].
//!
//! Each synthesized flag shape has one builder here. Builders refuse to
//! register a name or shorthand that is already taken instead of letting
//! clap panic when the command is built. Values are never stored by clap
//! callbacks; see [`crate::bindings`] for how parsed occurrences reach the
//! flag storage.

use aspect_flags_core::{NegatableBool, negated_flag_name};
use clap::{Arg, ArgAction, Command};

use crate::error::SynthesisError;
use crate::value_parser::BoolGrammar;

/// Id of the trailing positional that collects arguments for Bazel.
pub const PASSTHROUGH_ARGS: &str = "args";

/// Where a flag lives on its command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Registered on the command and inherited by its subcommands.
    Persistent,
    /// Registered on the command only.
    Local,
}

/// Name, shorthand and help of a flag about to be registered.
#[derive(Debug, Clone, Copy)]
pub struct FlagSpec<'a> {
    pub name: &'a str,
    pub shorthand: Option<char>,
    pub help: &'a str,
    pub namespace: Namespace,
}

impl<'a> FlagSpec<'a> {
    pub fn new(name: &'a str, namespace: Namespace) -> Self {
        Self {
            name,
            shorthand: None,
            help: "",
            namespace,
        }
    }

    pub fn with_shorthand(mut self, shorthand: Option<char>) -> Self {
        self.shorthand = shorthand;
        self
    }

    pub fn with_help(mut self, help: &'a str) -> Self {
        self.help = help;
        self
    }

    fn arg(&self, id: &str) -> Arg {
        Arg::new(id.to_string())
            .long(id.to_string())
            .help(self.help.to_string())
            .global(self.namespace == Namespace::Persistent)
    }
}

/// Registers `--name` and `--noname` sharing one boolean.
///
/// The shorthand, if any, goes to the plain name. Both faces take an
/// optional `=value`; a bare occurrence means `true`. The plain face accepts
/// `true|yes|1|false|no|0` and the negated face only `true`.
///
/// # Errors
///
/// [`SynthesisError::DuplicateFlag`] if either name is taken on `cmd`,
/// [`SynthesisError::DuplicateShorthand`] if the shorthand is.
///
/// # Examples
///
/// ```
/// use aspect_cli::register::{FlagSpec, Namespace, register_negatable};
/// use clap::Command;
///
/// let mut cmd = Command::new("aspect");
/// let spec = FlagSpec::new("keep_going", Namespace::Local);
/// let binding = register_negatable(&mut cmd, &spec, false).unwrap();
///
/// assert!(!binding.get());
/// assert!(cmd.get_arguments().any(|a| a.get_long() == Some("nokeep_going")));
/// ```
pub fn register_negatable(
    cmd: &mut Command,
    spec: &FlagSpec<'_>,
    default: bool,
) -> Result<NegatableBool, SynthesisError> {
    let negated = negated_flag_name(spec.name);
    ensure_available(cmd, spec.name, spec.shorthand)?;
    ensure_available(cmd, &negated, None)?;

    let plain = boolean_arg(spec, spec.name, BoolGrammar::Plain).short(spec.shorthand);
    let negated_help = format!("Negated form of --{}", spec.name);
    let negated = boolean_arg(spec, &negated, BoolGrammar::Negated).help(negated_help);
    update(cmd, |cmd| cmd.arg(plain).arg(negated));

    Ok(NegatableBool::new(default))
}

/// Registers a repeatable string flag.
pub fn register_multi_string(cmd: &mut Command, spec: &FlagSpec<'_>) -> Result<(), SynthesisError> {
    ensure_available(cmd, spec.name, spec.shorthand)?;
    let arg = string_arg(spec);
    update(cmd, |cmd| cmd.arg(arg));
    Ok(())
}

/// Registers a boolean flag without a negated companion.
pub fn register_bool(cmd: &mut Command, spec: &FlagSpec<'_>) -> Result<(), SynthesisError> {
    ensure_available(cmd, spec.name, spec.shorthand)?;
    let arg = boolean_arg(spec, spec.name, BoolGrammar::Expando).short(spec.shorthand);
    update(cmd, |cmd| cmd.arg(arg));
    Ok(())
}

/// Registers a single-valued string flag. Later occurrences replace earlier
/// ones.
pub fn register_string(cmd: &mut Command, spec: &FlagSpec<'_>) -> Result<(), SynthesisError> {
    ensure_available(cmd, spec.name, spec.shorthand)?;
    let arg = string_arg(spec);
    update(cmd, |cmd| cmd.arg(arg));
    Ok(())
}

/// Hides a flag from help output. Returns `false` if `cmd` has no such flag.
pub fn hide_flag(cmd: &mut Command, name: &str) -> bool {
    let Some(id) = find_arg(cmd, name).map(|arg| arg.get_id().to_string()) else {
        return false;
    };
    update(cmd, |cmd| cmd.mut_arg(id, |arg| arg.hide(true)));
    true
}

/// Whether `cmd` collects trailing arguments verbatim.
pub fn is_delegated(cmd: &Command) -> bool {
    cmd.get_positionals()
        .any(|arg| arg.is_trailing_var_arg_set() && arg.is_allow_hyphen_values_set())
}

/// Lets `cmd` accept flags it does not declare.
///
/// Adds a trailing positional, [`PASSTHROUGH_ARGS`], that takes the first
/// unrecognized token and everything after it verbatim. Commands that
/// already have such a positional are left alone. Returns whether an
/// argument was added.
pub fn mark_delegated(cmd: &mut Command) -> bool {
    if is_delegated(cmd) {
        return false;
    }
    let passthrough = Arg::new(PASSTHROUGH_ARGS)
        .value_name("ARGS")
        .help("Arguments passed through to bazel")
        .num_args(0..)
        .trailing_var_arg(true)
        .allow_hyphen_values(true);
    update(cmd, |cmd| cmd.arg(passthrough));
    true
}

/// Fails if `name` or `shorthand` is already claimed on `cmd`.
///
/// The automatic `--help`/`-h` and `--version`/`-V` flags count as claimed.
pub fn ensure_available(
    cmd: &Command,
    name: &str,
    shorthand: Option<char>,
) -> Result<(), SynthesisError> {
    let builtin_long = (name == "help" && !cmd.is_disable_help_flag_set())
        || (name == "version" && has_version_flag(cmd));
    if builtin_long || find_arg(cmd, name).is_some() {
        return Err(SynthesisError::DuplicateFlag {
            command: cmd.get_name().to_string(),
            flag: name.to_string(),
        });
    }

    let Some(short) = shorthand else {
        return Ok(());
    };
    let builtin_short = (short == 'h' && !cmd.is_disable_help_flag_set())
        || (short == 'V' && has_version_flag(cmd));
    if builtin_short || cmd.get_arguments().any(|arg| arg.get_short() == Some(short)) {
        return Err(SynthesisError::DuplicateShorthand {
            command: cmd.get_name().to_string(),
            flag: name.to_string(),
            shorthand: short,
        });
    }
    Ok(())
}

/// Checks persistent flags of `root` against every subcommand they would be
/// inherited by.
///
/// A subcommand flag with the same id overrides the inherited one. Any other
/// clash of long name or shorthand is an error.
pub fn check_inherited(root: &Command) -> Result<(), SynthesisError> {
    let globals: Vec<&Arg> = root.get_arguments().filter(|a| a.is_global_set()).collect();
    for sub in root.get_subcommands() {
        for global in &globals {
            let id = global.get_id().as_str();
            if sub.get_arguments().any(|a| a.get_id() == id) {
                continue;
            }
            if let Some(long) = global.get_long() {
                if sub.get_arguments().any(|a| a.get_long() == Some(long)) {
                    return Err(SynthesisError::DuplicateFlag {
                        command: sub.get_name().to_string(),
                        flag: long.to_string(),
                    });
                }
            }
            if let Some(short) = global.get_short() {
                if sub.get_arguments().any(|a| a.get_short() == Some(short)) {
                    return Err(SynthesisError::DuplicateShorthand {
                        command: sub.get_name().to_string(),
                        flag: id.to_string(),
                        shorthand: short,
                    });
                }
            }
        }
    }
    Ok(())
}

fn boolean_arg(spec: &FlagSpec<'_>, id: &str, grammar: BoolGrammar) -> Arg {
    spec.arg(id)
        .value_name("BOOL")
        .num_args(0..=1)
        .require_equals(true)
        .default_missing_value("true")
        .action(ArgAction::Append)
        .value_parser(grammar)
}

fn string_arg(spec: &FlagSpec<'_>) -> Arg {
    spec.arg(spec.name)
        .short(spec.shorthand)
        .value_name("VALUE")
        .num_args(1)
        .allow_hyphen_values(true)
        .action(ArgAction::Append)
}

fn find_arg<'a>(cmd: &'a Command, name: &str) -> Option<&'a Arg> {
    cmd.get_arguments()
        .find(|arg| arg.get_id() == name || arg.get_long() == Some(name))
}

fn has_version_flag(cmd: &Command) -> bool {
    cmd.get_version().is_some() && !cmd.is_disable_version_flag_set()
}

/// Applies a by-value builder method to a command held by reference.
pub(crate) fn update(cmd: &mut Command, f: impl FnOnce(Command) -> Command) {
    *cmd = f(std::mem::take(cmd));
}

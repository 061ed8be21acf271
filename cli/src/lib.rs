//! Bazel flag synthesis for the `aspect` command tree.
//!
//! The front-end's own commands are declared with clap. At startup,
//! [`synthesize_flags`] asks Bazel for its option list and registers every
//! option on the matching clap command, so `aspect build --keep_going`
//! parses, validates and shows up in help exactly like a native flag:
//!
//! - `startup` options go on the root command as global args.
//! - Negatable booleans get both `--foo` and `--nofoo`, backed by one
//!   [`NegatableBool`](aspect_flags_core::NegatableBool).
//! - Everything not on the documented list is hidden.
//! - Bazel-backed subcommands accept flags the schema did not mention.
//!
//! After clap parses the command line, [`SynthesizedFlags::apply_matches`]
//! stores every occurrence into its binding, and
//! [`SynthesizedFlags::forwarded_args`] turns the result back into Bazel
//! arguments.
//!
//! # Example
//!
//! ```
//! use aspect_cli::{Scope, SynthesisOptions, synthesize_flags};
//! use aspect_flags_core::FlagDescriptor;
//! use aspect_flags_discovery::StaticSchemaSource;
//! use clap::Command;
//!
//! let mut root = Command::new("aspect").subcommand(Command::new("build"));
//! let source = StaticSchemaSource::new(vec![
//!     FlagDescriptor::new("keep_going")
//!         .with_abbreviation('k')
//!         .with_negative_flag()
//!         .with_commands(["build"]),
//! ]);
//! let mut synthesis =
//!     synthesize_flags(&mut root, &source, &SynthesisOptions::default()).unwrap();
//!
//! let matches = root
//!     .try_get_matches_from(["aspect", "build", "-k", "//app:server"])
//!     .unwrap();
//! synthesis.flags.apply_matches(&matches).unwrap();
//!
//! let build = Scope::subcommand("build");
//! assert_eq!(synthesis.flags.get_bool(&build, "keep_going"), Some(true));
//! assert_eq!(synthesis.flags.forwarded_args(&build), ["--keep_going"]);
//! ```

pub mod bindings;
mod error;
pub mod register;
mod synth;
pub mod value_parser;

pub use bindings::{FlagBinding, FlagEntry, Scope, SynthesizedFlags};
pub use error::{ApplyError, SynthesisError};
pub use register::PASSTHROUGH_ARGS;
pub use synth::{
    ClassifiedFlag, Synthesis, SynthesisOptions, synthesize_flags, synthesize_from_descriptors,
};
pub use value_parser::BoolGrammar;

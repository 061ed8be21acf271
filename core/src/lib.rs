//! Flag model for mirroring Bazel's options on the `aspect` front-end.
//!
//! This crate is free of any CLI framework. It defines:
//!
//! - [`FlagDescriptor`]: one option as reported by Bazel.
//! - [`classify`]: picks the [`FlagKind`] a descriptor is synthesized as,
//!   using the curated [`ExpandoSet`].
//! - [`NegatableBool`]: the `--foo` / `--nofoo` pair sharing one boolean,
//!   with [`negated_flag_name`] for the companion's name.
//! - [`MultiString`], [`StringValue`], [`BoolValue`]: the other
//!   [`FlagValue`] storages.
//! - [`DocumentedFlags`]: which synthesized flags show up in help.
//! - [`validate_descriptors`]: structural checks on a discovered schema.
//!
//! # Example
//!
//! ```
//! use aspect_flags_core::*;
//!
//! let keep_going = FlagDescriptor::new("keep_going")
//!     .with_negative_flag()
//!     .with_commands(["startup", "build"]);
//!
//! assert_eq!(classify(&keep_going, &ExpandoSet::bazel()), FlagKind::NegatableBool);
//! assert_eq!(negated_flag_name(&keep_going.name), "nokeep_going");
//! assert_eq!(DocumentedFlags::bazel().visibility("keep_going"), Visibility::Shown);
//! ```

mod classify;
mod negatable;
mod types;
mod validate;
mod values;
mod visibility;

pub use classify::{BAZEL_EXPANDO_FLAGS, ExpandoSet, classify};
pub use negatable::{
    NAMESPACE_PREFIX, NEGATION_PREFIX, NegatableBool, NegatableBoolFace, accept_face_input,
    negated_flag_name,
};
pub use types::*;
pub use validate::{ValidationError, validate_descriptors};
pub use values::{
    BOOL_FALSE_TOKENS, BOOL_TRUE_TOKENS, BoolValue, FlagValue, FlagValueError, MultiString,
    StringValue, bool_str, parse_bool,
};
pub use visibility::{DOCUMENTED_BAZEL_FLAGS, DocumentedFlags, Visibility};

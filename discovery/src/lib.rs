//! Flag schema discovery for the `aspect` front-end.
//!
//! Bazel publishes its full option list through
//! `bazel help flags-as-proto`. This crate finds the workspace, finds Bazel,
//! runs that query and turns the answer into
//! [`FlagDescriptor`](aspect_flags_core::FlagDescriptor)s.
//!
//! # Main entry points
//!
//! - [`FlagSchemaSource`]: the one call the registration driver makes.
//! - [`BazelSchemaSource`]: live source backed by a Bazel subprocess.
//! - [`StaticSchemaSource`]: fixed descriptors, or a JSON file of them.
//! - [`locate_workspace_root`]: upward search for `MODULE.bazel` and
//!   friends.
//! - [`CliConfig`]: the front-end's YAML config.
//!
//! Running outside a workspace, or without a Bazel binary, is not an error:
//! sources answer [`SchemaDiscovery::NotFound`] and the front-end simply
//! registers no Bazel flags.
//!
//! # Example
//!
//! ```no_run
//! use aspect_flags_discovery::{BazelSchemaSource, CliConfig, FlagSchemaSource, SchemaDiscovery};
//!
//! let config = CliConfig::default();
//! match BazelSchemaSource::from_cwd(&config).discover_flag_schema() {
//!     Ok(SchemaDiscovery::Found(flags)) => println!("bazel has {} flags", flags.len()),
//!     Ok(SchemaDiscovery::NotFound(reason)) => println!("skipped: {reason:?}"),
//!     Err(err) => eprintln!("error: {err}"),
//! }
//! ```

pub mod bazel;
pub mod config;
mod error;
mod source;
pub mod wire;
pub mod workspace;

pub use bazel::{BazelSchemaSource, decode_schema_output, resolve_bazel_binary};
pub use config::CliConfig;
pub use error::{ConfigError, DiscoveryError, Result};
pub use source::{FlagSchemaSource, NotFoundReason, SchemaDiscovery, StaticSchemaSource};
pub use workspace::{locate_workspace_root, locate_workspace_root_from_cwd};

//! Front-end configuration file.
//!
//! Read from `<workspace>/.aspect/cli/config.yaml`, or from the path in
//! `ASPECT_CONFIG`. Every section is optional; a missing file means
//! defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! bazel:
//!   binary: tools/bazel
//!   probe_timeout_secs: 30
//! flags:
//!   documented:
//!     - config
//!   expando:
//!     - my_expando
//! commands:
//!   administrative:
//!     - version
//!     - flags
//!     - lint
//! ```
//!
//! `flags.documented`, `flags.expando` and `commands.administrative` extend
//! the built-in lists; they never shrink them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "ASPECT_CONFIG";

/// Config file location relative to the workspace root.
pub const CONFIG_RELATIVE_PATH: &str = ".aspect/cli/config.yaml";

/// Default time Bazel gets to print its flag schema.
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 60;

/// Subcommands that belong to the front-end rather than to Bazel.
pub const DEFAULT_ADMINISTRATIVE_COMMANDS: &[&str] = &["version", "flags"];

/// How Bazel is located and queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BazelConfig {
    /// Explicit Bazel binary; relative paths resolve against the workspace root.
    pub binary: Option<PathBuf>,
    /// Seconds to wait for `bazel help flags-as-proto`.
    pub probe_timeout_secs: u64,
}

impl Default for BazelConfig {
    fn default() -> Self {
        Self {
            binary: None,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

/// Additions to the built-in flag tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    /// Extra flags shown in help.
    pub documented: Vec<String>,
    /// Extra flags synthesized as non-negatable booleans.
    pub expando: Vec<String>,
}

/// Front-end command settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Subcommands that receive Bazel flags but never delegate parsing.
    pub administrative: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            administrative: DEFAULT_ADMINISTRATIVE_COMMANDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Top-level front-end configuration.
///
/// # Examples
///
/// ```
/// use aspect_flags_discovery::CliConfig;
///
/// let config: CliConfig = serde_yaml::from_str("flags:\n  documented: [config]\n").unwrap();
/// assert_eq!(config.flags.documented, vec!["config"]);
/// assert_eq!(config.bazel.probe_timeout_secs, 60);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub bazel: BazelConfig,
    pub flags: FlagsConfig,
    pub commands: CommandsConfig,
}

impl CliConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Yaml`]
    /// if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the config for a workspace.
    ///
    /// `ASPECT_CONFIG` wins when set; otherwise the file under the workspace
    /// root is used if it exists. No workspace and no override yields
    /// defaults.
    pub fn discover(workspace_root: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(PathBuf::from(path));
        }
        match workspace_root.map(|root| root.join(CONFIG_RELATIVE_PATH)) {
            Some(path) if path.is_file() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Bazel binary override resolved against the workspace root.
    pub fn bazel_binary(&self, workspace_root: &Path) -> Option<PathBuf> {
        self.bazel.binary.as_ref().map(|binary| {
            if binary.is_absolute() {
                binary.clone()
            } else {
                workspace_root.join(binary)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();

        assert_eq!(config.bazel.binary, None);
        assert_eq!(config.bazel.probe_timeout_secs, DEFAULT_PROBE_TIMEOUT_SECS);
        assert_eq!(config.commands.administrative, vec!["version", "flags"]);
        assert!(config.flags.documented.is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "bazel:\n  binary: tools/bazel\nflags:\n  expando: [my_expando]\n",
        )
        .unwrap();

        let config = CliConfig::load(&path).unwrap();
        assert_eq!(config.bazel.binary, Some(PathBuf::from("tools/bazel")));
        assert_eq!(config.bazel.probe_timeout_secs, DEFAULT_PROBE_TIMEOUT_SECS);
        assert_eq!(config.flags.expando, vec!["my_expando"]);
        assert_eq!(config.commands, CommandsConfig::default());
        assert_eq!(
            config.bazel_binary(Path::new("/ws")),
            Some(PathBuf::from("/ws/tools/bazel"))
        );
    }

    #[test]
    fn test_load_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "\n").unwrap();

        assert_eq!(CliConfig::load(&path).unwrap(), CliConfig::default());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "bazel: [not, a, map]\n").unwrap();

        assert!(matches!(CliConfig::load(&path), Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let err = CliConfig::load("/nonexistent/aspect/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_absolute_binary_is_kept() {
        let config = CliConfig {
            bazel: BazelConfig {
                binary: Some(PathBuf::from("/opt/bazel")),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(
            config.bazel_binary(Path::new("/ws")),
            Some(PathBuf::from("/opt/bazel"))
        );
    }
}

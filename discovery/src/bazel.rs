//! Live schema discovery by asking Bazel.
//!
//! Runs `bazel help flags-as-proto` from the workspace root, decodes the
//! base64 `FlagCollection` it prints and validates the result. Bazel is
//! located through the config override, then `bazelisk` and `bazel` on
//! `PATH`.

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;

use aspect_flags_core::validate_descriptors;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info};
use wait_timeout::ChildExt;

use crate::config::CliConfig;
use crate::error::{DiscoveryError, Result};
use crate::source::{FlagSchemaSource, NotFoundReason, SchemaDiscovery};
use crate::wire::decode_flag_collection;
use crate::workspace::locate_workspace_root_from_cwd;

/// Arguments that make Bazel print its flag schema.
pub const FLAGS_AS_PROTO_ARGS: &[&str] = &["help", "flags-as-proto"];

/// Executables tried on `PATH`, in order.
pub const BAZEL_CANDIDATES: &[&str] = &["bazelisk", "bazel"];

/// Lines of stderr kept in a failure report.
const STDERR_TAIL_LINES: usize = 20;

/// Locates the Bazel binary for a workspace.
///
/// The config override wins even if the file does not exist yet; spawning it
/// will then report the tool as missing.
pub fn resolve_bazel_binary(config: &CliConfig, workspace_root: &Path) -> Option<PathBuf> {
    if let Some(binary) = config.bazel_binary(workspace_root) {
        return Some(binary);
    }
    BAZEL_CANDIDATES
        .iter()
        .find_map(|candidate| which::which(candidate).ok())
}

/// Schema source backed by a real Bazel invocation.
#[derive(Debug, Clone)]
pub struct BazelSchemaSource {
    workspace_root: Option<PathBuf>,
    binary: Option<PathBuf>,
    timeout: Duration,
}

impl BazelSchemaSource {
    /// Source for an explicit workspace root (or none).
    pub fn new(workspace_root: Option<PathBuf>, config: &CliConfig) -> Self {
        let binary = workspace_root
            .as_deref()
            .and_then(|root| resolve_bazel_binary(config, root));
        Self {
            workspace_root,
            binary,
            timeout: Duration::from_secs(config.bazel.probe_timeout_secs),
        }
    }

    /// Source for the workspace containing the current directory.
    pub fn from_cwd(config: &CliConfig) -> Self {
        Self::new(locate_workspace_root_from_cwd(), config)
    }

    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }

    pub fn binary(&self) -> Option<&Path> {
        self.binary.as_deref()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FlagSchemaSource for BazelSchemaSource {
    fn discover_flag_schema(&self) -> Result<SchemaDiscovery> {
        let Some(root) = self.workspace_root.as_deref() else {
            debug!("Not inside a bazel workspace, skipping flag discovery");
            return Ok(SchemaDiscovery::NotFound(NotFoundReason::NoWorkspace));
        };
        let Some(binary) = self.binary.as_deref() else {
            debug!(workspace = %root.display(), "No bazel binary found, skipping flag discovery");
            return Ok(SchemaDiscovery::NotFound(NotFoundReason::NoBazelBinary));
        };

        let Some(stdout) = run_flags_as_proto(binary, root, self.timeout)? else {
            return Ok(SchemaDiscovery::NotFound(NotFoundReason::NoBazelBinary));
        };
        let mut descriptors = decode_schema_output(&stdout)?;
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        info!(flags = descriptors.len(), binary = %binary.display(), "Discovered bazel flags");
        Ok(SchemaDiscovery::Found(descriptors))
    }
}

/// Decodes the text printed by `bazel help flags-as-proto`.
///
/// # Errors
///
/// [`DiscoveryError::Base64`], [`DiscoveryError::Wire`] or
/// [`DiscoveryError::InvalidSchema`].
pub fn decode_schema_output(stdout: &[u8]) -> Result<Vec<aspect_flags_core::FlagDescriptor>> {
    let compact: Vec<u8> = stdout
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(compact)?;
    let descriptors = decode_flag_collection(&bytes)?;
    let errors = validate_descriptors(&descriptors);
    if !errors.is_empty() {
        return Err(DiscoveryError::InvalidSchema(errors));
    }
    Ok(descriptors)
}

/// Runs the schema query and returns stdout, or `None` if the binary is missing.
fn run_flags_as_proto(binary: &Path, root: &Path, timeout: Duration) -> Result<Option<Vec<u8>>> {
    debug!(binary = %binary.display(), args = ?FLAGS_AS_PROTO_ARGS, "Probing bazel flag schema");

    let mut child = match Command::new(binary)
        .args(FLAGS_AS_PROTO_ARGS)
        .current_dir(root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(binary = %binary.display(), "Bazel binary does not exist");
            return Ok(None);
        }
        Err(source) => {
            return Err(DiscoveryError::Spawn {
                binary: binary.to_path_buf(),
                source,
            });
        }
    };

    // Drain both pipes in the background; the schema is large enough to fill
    // a pipe buffer before bazel exits.
    let stdout_thread = child.stdout.take().map(drain);
    let stderr_thread = child.stderr.take().map(drain);

    let status = match child.wait_timeout(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            debug!(timeout_secs = timeout.as_secs(), "Bazel flag probe timed out, killing process");
            let _ = child.kill();
            let _ = child.wait();
            return Err(DiscoveryError::TimedOut {
                seconds: timeout.as_secs(),
            });
        }
        Err(source) => {
            let _ = child.kill();
            let _ = child.wait();
            return Err(DiscoveryError::Wait {
                binary: binary.to_path_buf(),
                source,
            });
        }
    };

    let stdout = join_drain(stdout_thread)?;
    let stderr = join_drain(stderr_thread)?;

    if !status.success() {
        return Err(DiscoveryError::Failed {
            code: status.code(),
            stderr: stderr_tail(&stderr),
        });
    }
    Ok(Some(stdout))
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

fn join_drain(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> Result<Vec<u8>> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(result) => Ok(result?),
            Err(_) => Err(DiscoveryError::Io(std::io::Error::other(
                "pipe reader thread panicked",
            ))),
        },
        None => Ok(Vec::new()),
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}

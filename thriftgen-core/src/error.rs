//! Error types for the compile pipeline.
//!
//! Every variant here is fatal and aborts the run before any schema is
//! compiled. A schema that fails to compile is not an error: it is recorded
//! in its [`InvocationResult`](crate::invoke::InvocationResult) and the run
//! carries on with the rest of the work list.
//!
//! Exit codes:
//! - 2: configuration or version-gate failure (bad requirement, wrong compiler version)
//! - 1: tool error (compiler missing, I/O failure)

use camino::Utf8PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThriftgenError {
    /// The configured compiler could not be found on `PATH`.
    #[error("executable `{name}` not found on PATH")]
    ExecutableNotFound { name: String },

    /// `<exe> -version` ran but exited non-zero.
    #[error("`{executable} -version` exited with code {code}: {output}")]
    VersionCommand {
        executable: Utf8PathBuf,
        code: i32,
        output: String,
    },

    /// The version query printed nothing that looks like `X.Y.Z`.
    #[error("no version number found in compiler output: {output:?}")]
    VersionParse { output: String },

    /// The compiler's version does not satisfy the configured requirement.
    #[error("unsupported compiler version {found}, required {required}")]
    UnsupportedVersion {
        found: semver::Version,
        required: String,
    },

    #[error("invalid version requirement {expr:?}: {reason}")]
    InvalidRequirement { expr: String, reason: String },

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ThriftgenError {
    /// Returns true for failures caused by the project's configuration or the
    /// installed compiler's version rather than by the environment.
    pub fn is_gate_failure(&self) -> bool {
        matches!(
            self,
            ThriftgenError::VersionCommand { .. }
                | ThriftgenError::VersionParse { .. }
                | ThriftgenError::UnsupportedVersion { .. }
                | ThriftgenError::InvalidRequirement { .. }
        )
    }

    /// Returns the recommended exit code for this error.
    pub fn exit_code(&self) -> u8 {
        if self.is_gate_failure() { 2 } else { 1 }
    }
}

//! Port traits abstracting all I/O away from the pipeline.

use camino::{Utf8Path, Utf8PathBuf};
use std::time::SystemTime;

/// Captured result of one external process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    /// stdout followed by stderr.
    pub output: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an executable synchronously and captures its combined output.
///
/// An `Err` means the process could not be spawned at all; a process that ran
/// and failed is an `Ok` with a non-zero exit code.
pub trait ProcessRunner {
    fn run(&self, executable: &Utf8Path, args: &[String]) -> anyhow::Result<ProcessOutput>;
}

/// Artifact discovery in the (flat) output directory.
pub trait ArtifactFinder {
    /// Files directly inside `dir` whose name matches the glob `pattern`.
    fn find_files(&self, dir: &Utf8Path, pattern: &str) -> Vec<Utf8PathBuf>;

    fn modified(&self, path: &Utf8Path) -> anyhow::Result<SystemTime>;
}

/// Resolves the configured compiler name to a concrete path.
pub trait ExecutableLocator {
    fn locate(&self, name: &str) -> Option<Utf8PathBuf>;
}

/// File-system write operations.
pub trait WritePort {
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
    fn remove_file(&self, path: &Utf8Path) -> anyhow::Result<()>;
}

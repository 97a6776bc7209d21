//! Default filesystem/process-backed port implementations.

use crate::ports::{ArtifactFinder, ExecutableLocator, ProcessOutput, ProcessRunner, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::process::Command;
use std::time::SystemTime;
use tracing::debug;

/// Globs the output directory on disk.
#[derive(Debug, Clone, Default)]
pub struct FsArtifactFinder;

impl ArtifactFinder for FsArtifactFinder {
    fn find_files(&self, dir: &Utf8Path, pattern: &str) -> Vec<Utf8PathBuf> {
        let full = format!("{}/{}", glob::Pattern::escape(dir.as_str()), pattern);
        let entries = match glob(&full) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(pattern = %full, "invalid artifact pattern: {err}");
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| match entry {
                Ok(path) => Utf8PathBuf::from_path_buf(path).ok(),
                Err(err) => {
                    debug!("glob error: {err}");
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect()
    }

    fn modified(&self, path: &Utf8Path) -> anyhow::Result<SystemTime> {
        let meta = fs::metadata(path)?;
        meta.modified()
            .with_context(|| format!("read modification time of {}", path))
    }
}

/// In-memory artifact finder for embedding and testing.
///
/// Holds a flat map of file path to modification time; `find_files` only
/// matches direct children of the requested directory, like the fs finder.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactFinder {
    files: BTreeMap<Utf8PathBuf, SystemTime>,
}

impl InMemoryArtifactFinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>, modified: SystemTime) -> Self {
        self.files.insert(path.into(), modified);
        self
    }
}

impl ArtifactFinder for InMemoryArtifactFinder {
    fn find_files(&self, dir: &Utf8Path, pattern: &str) -> Vec<Utf8PathBuf> {
        let Ok(pattern) = glob::Pattern::new(pattern) else {
            return Vec::new();
        };
        self.files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter(|path| path.file_name().is_some_and(|name| pattern.matches(name)))
            .cloned()
            .collect()
    }

    fn modified(&self, path: &Utf8Path) -> anyhow::Result<SystemTime> {
        self.files
            .get(path)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("{} does not exist", path))
    }
}

/// Looks executables up on a `PATH`-style search list.
#[derive(Debug, Clone, Default)]
pub struct PathExecutableLocator {
    search_path: Option<OsString>,
}

impl PathExecutableLocator {
    /// Search the current process's `PATH`.
    pub fn from_env() -> Self {
        Self {
            search_path: std::env::var_os("PATH"),
        }
    }

    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
        }
    }
}

impl ExecutableLocator for PathExecutableLocator {
    fn locate(&self, name: &str) -> Option<Utf8PathBuf> {
        if name.is_empty() {
            return None;
        }

        // Anything with a separator is a path, not a name to search for.
        let as_path = Utf8Path::new(name);
        if as_path.components().count() > 1 {
            return is_executable(as_path).then(|| as_path.to_path_buf());
        }

        let search_path = self.search_path.as_ref()?;
        for dir in std::env::split_paths(search_path) {
            let Ok(dir) = Utf8PathBuf::from_path_buf(dir) else {
                continue;
            };
            for candidate in candidates(&dir, name) {
                if is_executable(&candidate) {
                    debug!(name, path = %candidate, "located executable");
                    return Some(candidate);
                }
            }
        }
        debug!(name, "executable not found on search path");
        None
    }
}

#[cfg(windows)]
fn candidates(dir: &Utf8Path, name: &str) -> Vec<Utf8PathBuf> {
    vec![dir.join(name), dir.join(format!("{name}.exe"))]
}

#[cfg(not(windows))]
fn candidates(dir: &Utf8Path, name: &str) -> Vec<Utf8PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Utf8Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Utf8Path) -> bool {
    path.is_file()
}

/// Runs processes with `std::process::Command`, blocking until exit.
#[derive(Debug, Clone, Default)]
pub struct SystemProcessRunner;

impl ProcessRunner for SystemProcessRunner {
    fn run(&self, executable: &Utf8Path, args: &[String]) -> anyhow::Result<ProcessOutput> {
        let output = Command::new(executable)
            .args(args)
            .output()
            .with_context(|| format!("spawn {}", executable))?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(ProcessOutput {
            exit_code: output.status.code(),
            output: text,
        })
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }

    fn remove_file(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::remove_file(path).with_context(|| format!("remove {}", path))
    }
}

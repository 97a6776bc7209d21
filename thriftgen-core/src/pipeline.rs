//! Compile, stale-listing and clean pipelines.
//!
//! These entry points are I/O-agnostic: every filesystem and process
//! operation goes through the port traits.

use crate::artifacts::{SchemaFile, resolve};
use crate::error::ThriftgenError;
use crate::invoke::{InvocationResult, build_args, invoke};
use crate::ports::{ArtifactFinder, ExecutableLocator, ProcessRunner, WritePort};
use crate::settings::CompileSettings;
use crate::staleness::is_stale;
use crate::version::{VersionRequirement, check_version};
use camino::Utf8PathBuf;
use std::collections::HashSet;
use tracing::{debug, info};

/// Outcome of `run_compile`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every schema was up to date; nothing was touched.
    Noop,
    /// The compiler ran once per stale schema.
    Ran(Vec<InvocationResult>),
}

impl RunOutcome {
    pub fn is_noop(&self) -> bool {
        matches!(self, RunOutcome::Noop)
    }

    pub fn results(&self) -> &[InvocationResult] {
        match self {
            RunOutcome::Noop => &[],
            RunOutcome::Ran(results) => results,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &InvocationResult> {
        self.results().iter().filter(|r| !r.succeeded())
    }
}

/// Configured schemas, first occurrence wins.
pub fn schema_files(settings: &CompileSettings) -> Vec<SchemaFile> {
    let mut seen = HashSet::new();
    settings
        .files
        .iter()
        .filter(|path| seen.insert(path.as_path()))
        .map(|path| SchemaFile::new(path.clone()))
        .collect()
}

/// The work list: schemas that need compiling in this run.
pub fn stale_files(settings: &CompileSettings, finder: &dyn ArtifactFinder) -> Vec<SchemaFile> {
    let schemas = schema_files(settings);
    if settings.force {
        debug!(count = schemas.len(), "force set, skipping staleness checks");
        return schemas;
    }
    schemas
        .into_iter()
        .filter(|schema| is_stale(schema, &settings.output_dir, &settings.naming, finder))
        .collect()
}

/// Run the compile pipeline.
///
/// Missing compiler and version-gate failures abort before anything is
/// written. Individual schema failures are reported and do not stop the run.
pub fn run_compile(
    settings: &CompileSettings,
    locator: &dyn ExecutableLocator,
    finder: &dyn ArtifactFinder,
    writer: &dyn WritePort,
    runner: &dyn ProcessRunner,
) -> Result<RunOutcome, ThriftgenError> {
    let executable =
        locator
            .locate(&settings.executable)
            .ok_or_else(|| ThriftgenError::ExecutableNotFound {
                name: settings.executable.clone(),
            })?;

    let work = stale_files(settings, finder);
    if work.is_empty() {
        info!("all schema files are up to date");
        return Ok(RunOutcome::Noop);
    }
    debug!(count = work.len(), "schema files to compile");

    if let Some(expr) = &settings.version_requirement {
        let requirement = VersionRequirement::parse(expr)?;
        check_version(&executable, &requirement, runner)?;
    }

    writer.create_dir_all(&settings.output_dir)?;
    let plan = build_args(
        &settings.output_dir,
        &settings.options,
        &settings.default_generator,
    );

    let results = work
        .iter()
        .map(|schema| invoke(&executable, &plan, schema, runner))
        .collect();
    Ok(RunOutcome::Ran(results))
}

/// Remove every generated artifact of the configured schemas.
///
/// Returns the removed paths in removal order.
pub fn run_clean(
    settings: &CompileSettings,
    finder: &dyn ArtifactFinder,
    writer: &dyn WritePort,
) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let mut removed = Vec::new();
    for schema in schema_files(settings) {
        for path in resolve(&schema, &settings.output_dir, &settings.naming, finder) {
            writer.remove_file(&path)?;
            info!(file = %path, "removed {}", path);
            removed.push(path);
        }
    }
    Ok(removed)
}

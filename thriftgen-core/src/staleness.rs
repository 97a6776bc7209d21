//! Deciding whether a schema's generated artifacts are out of date.

use crate::artifacts::{ArtifactNaming, SchemaFile, resolve};
use crate::ports::ArtifactFinder;
use camino::Utf8Path;
use tracing::debug;

/// Returns true when `schema` has to be recompiled.
///
/// A schema is stale when nothing has been generated for it yet, or when it
/// was modified strictly after the newest of its artifacts. Equal timestamps
/// count as up to date. A schema whose own mtime cannot be read is stale, so
/// the compiler gets to report the problem for that file.
pub fn is_stale(
    schema: &SchemaFile,
    output_dir: &Utf8Path,
    naming: &ArtifactNaming,
    finder: &dyn ArtifactFinder,
) -> bool {
    let artifacts = resolve(schema, output_dir, naming, finder);
    if artifacts.is_empty() {
        debug!(schema = %schema.path(), "no artifacts generated yet");
        return true;
    }

    let newest_artifact = artifacts
        .paths()
        .iter()
        .filter_map(|path| match finder.modified(path) {
            Ok(mtime) => Some(mtime),
            Err(err) => {
                debug!(artifact = %path, "skipping unreadable artifact: {err:#}");
                None
            }
        })
        .max();
    let Some(newest_artifact) = newest_artifact else {
        debug!(schema = %schema.path(), "no readable artifacts");
        return true;
    };

    let schema_mtime = match finder.modified(schema.path()) {
        Ok(mtime) => mtime,
        Err(err) => {
            debug!(schema = %schema.path(), "cannot read schema mtime: {err:#}");
            return true;
        }
    };

    let stale = schema_mtime > newest_artifact;
    debug!(schema = %schema.path(), stale, "compared modification times");
    stale
}

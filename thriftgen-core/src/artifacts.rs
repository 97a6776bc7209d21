//! Mapping a schema file to the generated files it is expected to produce.

use crate::ports::ArtifactFinder;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

/// One input schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaFile {
    path: Utf8PathBuf,
}

impl SchemaFile {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// File name with its extension stripped (`idl/user.thrift` -> `user`).
    pub fn basename(&self) -> &str {
        self.path.file_stem().unwrap_or_default()
    }
}

/// The compiler's output naming convention: every artifact is named
/// `<basename>_<suffix>.<extension>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
    pub suffixes: Vec<String>,
    pub extensions: Vec<String>,
}

impl Default for ArtifactNaming {
    fn default() -> Self {
        Self {
            suffixes: ["constants", "thrift", "types"]
                .into_iter()
                .map(String::from)
                .collect(),
            extensions: ["erl", "hrl"].into_iter().map(String::from).collect(),
        }
    }
}

impl ArtifactNaming {
    /// Glob patterns (relative to the output directory) for one schema.
    ///
    /// The basename is escaped so that `[`, `*` and `?` in schema names
    /// match literally.
    pub fn patterns_for(&self, schema: &SchemaFile) -> Vec<String> {
        let escaped = glob::Pattern::escape(schema.basename());
        let base = escaped.as_str();
        self.suffixes
            .iter()
            .flat_map(|suffix| {
                self.extensions
                    .iter()
                    .map(move |ext| format!("{base}_{suffix}.{ext}"))
            })
            .collect()
    }
}

/// Generated outputs found for one schema, sorted and without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactSet {
    paths: Vec<Utf8PathBuf>,
}

impl ArtifactSet {
    pub fn new(mut paths: Vec<Utf8PathBuf>) -> Self {
        paths.sort();
        paths.dedup();
        Self { paths }
    }

    pub fn paths(&self) -> &[Utf8PathBuf] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }
}

impl IntoIterator for ArtifactSet {
    type Item = Utf8PathBuf;
    type IntoIter = std::vec::IntoIter<Utf8PathBuf>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.into_iter()
    }
}

/// Find the artifacts already generated for `schema` inside `output_dir`.
pub fn resolve(
    schema: &SchemaFile,
    output_dir: &Utf8Path,
    naming: &ArtifactNaming,
    finder: &dyn ArtifactFinder,
) -> ArtifactSet {
    let found: Vec<Utf8PathBuf> = naming
        .patterns_for(schema)
        .iter()
        .flat_map(|pattern| finder.find_files(output_dir, pattern))
        .collect();

    let set = ArtifactSet::new(found);
    debug!(
        schema = %schema.path(),
        output_dir = %output_dir,
        artifacts = set.len(),
        "resolved artifacts"
    );
    set
}

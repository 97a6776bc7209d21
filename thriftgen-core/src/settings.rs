//! Clap-free settings for the compile pipeline.

use crate::artifacts::ArtifactNaming;
use camino::Utf8PathBuf;

/// Compiler looked up on `PATH` when nothing else is configured.
pub const DEFAULT_EXECUTABLE: &str = "thrift";

/// Directory the generated sources land in.
pub const DEFAULT_OUTPUT_DIR: &str = "src";

/// Value injected after `--gen` unless the caller passes their own generator.
pub const DEFAULT_GENERATOR: &str = "erl";

/// Settings for one compile run.
#[derive(Debug, Clone)]
pub struct CompileSettings {
    pub files: Vec<Utf8PathBuf>,
    pub output_dir: Utf8PathBuf,

    // Compiler
    pub executable: String,
    pub options: Vec<String>,
    pub default_generator: String,
    pub version_requirement: Option<String>,

    pub naming: ArtifactNaming,

    /// Treat every configured schema as stale.
    pub force: bool,
}

impl Default for CompileSettings {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            output_dir: Utf8PathBuf::from(DEFAULT_OUTPUT_DIR),
            executable: DEFAULT_EXECUTABLE.to_string(),
            options: Vec::new(),
            default_generator: DEFAULT_GENERATOR.to_string(),
            version_requirement: None,
            naming: ArtifactNaming::default(),
            force: false,
        }
    }
}

//! Configuration file loading for thriftgen.
//!
//! Discovers and loads `thriftgen.toml` from the project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use thriftgen_core::settings::{DEFAULT_EXECUTABLE, DEFAULT_GENERATOR, DEFAULT_OUTPUT_DIR};
use thriftgen_core::{ArtifactNaming, CompileSettings};
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "thriftgen.toml";

/// Top-level configuration from thriftgen.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThriftgenConfig {
    /// Compiler inputs and invocation.
    pub thrift: ThriftConfig,

    /// Output naming convention used for staleness checks and cleaning.
    pub naming: NamingConfig,
}

/// `[thrift]` section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThriftConfig {
    /// Schema files, relative to the project root.
    pub files: Vec<Utf8PathBuf>,

    /// Where generated sources are written (default: `src`).
    pub output_dir: Option<Utf8PathBuf>,

    /// Extra compiler flags, passed through in order.
    pub options: Vec<String>,

    /// Compiler name or path (default: `thrift`).
    pub executable: Option<String>,

    /// Required compiler version range, e.g. `~> 0.10`.
    pub version: Option<String>,

    /// Generator used when `options` has no `--gen` (default: `erl`).
    pub default_generator: Option<String>,
}

/// `[naming]` section of the config.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub suffixes: Vec<String>,
    pub extensions: Vec<String>,
}

impl Default for NamingConfig {
    fn default() -> Self {
        let naming = ArtifactNaming::default();
        Self {
            suffixes: naming.suffixes,
            extensions: naming.extensions,
        }
    }
}

/// Discover the thriftgen.toml config file.
///
/// Returns `None` if the project root has no config file.
pub fn discover_config(project_root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = project_root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a thriftgen.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<ThriftgenConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<ThriftgenConfig> {
    let config: ThriftgenConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from the project root, or return default if not found.
pub fn load_or_default(project_root: &Utf8Path) -> anyhow::Result<ThriftgenConfig> {
    match discover_config(project_root) {
        Some(path) => load_config(&path),
        None => Ok(ThriftgenConfig::default()),
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Replaces the configured schema list when non-empty.
    pub files: Vec<Utf8PathBuf>,
    pub output_dir: Option<Utf8PathBuf>,
    pub executable: Option<String>,
    pub version_requirement: Option<String>,
    /// Appended after the configured options.
    pub options: Vec<String>,
    pub force: bool,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: ThriftgenConfig,
}

impl ConfigMerger {
    /// Create a new merger from a loaded config.
    pub fn new(config: ThriftgenConfig) -> Self {
        Self { config }
    }

    /// Produce pipeline settings.
    ///
    /// Relative schema paths and the output directory are anchored at
    /// `project_root`; so is an executable given as a relative path (a bare
    /// name is left for the `PATH` lookup).
    pub fn merge(self, project_root: &Utf8Path, cli: &CliOverrides) -> CompileSettings {
        let thrift = self.config.thrift;

        let files = if cli.files.is_empty() {
            thrift.files
        } else {
            cli.files.clone()
        };
        let files = files
            .iter()
            .map(|file| anchor(project_root, file))
            .collect();

        let output_dir = cli
            .output_dir
            .clone()
            .or(thrift.output_dir)
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR));

        let executable = cli
            .executable
            .clone()
            .or(thrift.executable)
            .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string());
        let executable = if Utf8Path::new(&executable).components().count() > 1 {
            anchor(project_root, Utf8Path::new(&executable)).into_string()
        } else {
            executable
        };

        let mut options = thrift.options;
        options.extend(cli.options.iter().cloned());

        CompileSettings {
            files,
            output_dir: anchor(project_root, &output_dir),
            executable,
            options,
            default_generator: thrift
                .default_generator
                .unwrap_or_else(|| DEFAULT_GENERATOR.to_string()),
            version_requirement: cli.version_requirement.clone().or(thrift.version),
            naming: ArtifactNaming {
                suffixes: self.config.naming.suffixes,
                extensions: self.config.naming.extensions,
            },
            force: cli.force,
        }
    }
}

fn anchor(root: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() || root == "." {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[thrift]
files = ["thrift/user.thrift", "thrift/order.thrift"]
output_dir = "gen"
options = ["--gen", "erl:maps", "-strict"]
executable = "thrift-0.10"
version = "~> 0.10"
default_generator = "java"

[naming]
suffixes = ["types"]
extensions = ["java"]
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(config.thrift.files.len(), 2);
        assert_eq!(config.thrift.output_dir, Some(Utf8PathBuf::from("gen")));
        assert_eq!(config.thrift.options, vec!["--gen", "erl:maps", "-strict"]);
        assert_eq!(config.thrift.executable.as_deref(), Some("thrift-0.10"));
        assert_eq!(config.thrift.version.as_deref(), Some("~> 0.10"));
        assert_eq!(config.thrift.default_generator.as_deref(), Some("java"));
        assert_eq!(config.naming.suffixes, vec!["types"]);
        assert_eq!(config.naming.extensions, vec!["java"]);
    }

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert!(config.thrift.files.is_empty());
        assert!(config.thrift.version.is_none());
        assert_eq!(config.naming.suffixes, vec!["constants", "thrift", "types"]);
        assert_eq!(config.naming.extensions, vec!["erl", "hrl"]);
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        let err = parse_config("[thrift]\nfiles = \"user.thrift\"\n").expect_err("bad type");
        assert!(err.to_string().contains("invalid TOML"));
    }

    #[test]
    fn test_merge_defaults() {
        let settings = ConfigMerger::new(ThriftgenConfig::default())
            .merge(Utf8Path::new("."), &CliOverrides::default());
        assert!(settings.files.is_empty());
        assert_eq!(settings.output_dir, Utf8PathBuf::from("src"));
        assert_eq!(settings.executable, "thrift");
        assert_eq!(settings.default_generator, "erl");
        assert!(settings.options.is_empty());
        assert!(settings.version_requirement.is_none());
        assert!(!settings.force);
    }

    #[test]
    fn test_merge_anchors_relative_paths_at_project_root() {
        let config = parse_config(
            r#"
[thrift]
files = ["idl/user.thrift", "/abs/order.thrift"]
output_dir = "gen"
executable = "tools/thrift"
"#,
        )
        .unwrap();

        let settings =
            ConfigMerger::new(config).merge(Utf8Path::new("/proj"), &CliOverrides::default());
        assert_eq!(
            settings.files,
            vec![
                Utf8PathBuf::from("/proj/idl/user.thrift"),
                Utf8PathBuf::from("/abs/order.thrift"),
            ]
        );
        assert_eq!(settings.output_dir, Utf8PathBuf::from("/proj/gen"));
        assert_eq!(settings.executable, "/proj/tools/thrift");
    }

    #[test]
    fn test_merge_cli_overrides_config() {
        let config = parse_config(
            r#"
[thrift]
files = ["idl/user.thrift"]
output_dir = "gen"
options = ["-strict"]
executable = "thrift-0.9"
version = "~> 0.9"
"#,
        )
        .unwrap();
        let cli = CliOverrides {
            files: vec![Utf8PathBuf::from("idl/order.thrift")],
            output_dir: Some(Utf8PathBuf::from("out")),
            executable: Some("thrift".to_string()),
            version_requirement: Some("~> 0.10".to_string()),
            options: vec!["--gen".to_string(), "py".to_string()],
            force: true,
        };

        let settings = ConfigMerger::new(config).merge(Utf8Path::new("."), &cli);
        assert_eq!(settings.files, vec![Utf8PathBuf::from("idl/order.thrift")]);
        assert_eq!(settings.output_dir, Utf8PathBuf::from("out"));
        assert_eq!(settings.executable, "thrift");
        assert_eq!(settings.version_requirement.as_deref(), Some("~> 0.10"));
        assert_eq!(settings.options, vec!["-strict", "--gen", "py"]);
        assert!(settings.force);
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
    }

    #[test]
    fn test_load_or_default_returns_default_when_missing() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let cfg = load_or_default(&root).expect("load default");
        assert!(cfg.thrift.files.is_empty());
        assert!(cfg.thrift.output_dir.is_none());
    }

    #[test]
    fn test_load_config_reports_path_on_parse_error() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        std::fs::write(root.join(CONFIG_FILE_NAME), "[thrift\n").expect("write config");

        let err = load_or_default(&root).expect_err("broken toml");
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}

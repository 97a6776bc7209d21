use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use thriftgen_cli::config::{self, CliOverrides, ConfigMerger};
use thriftgen_core::adapters::{
    FsArtifactFinder, FsWritePort, PathExecutableLocator, SystemProcessRunner,
};
use thriftgen_core::pipeline::{run_clean, run_compile, stale_files};
use thriftgen_core::{CompileSettings, RunOutcome, ThriftgenError};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "thriftgen",
    version,
    about = "Regenerate Thrift sources whose schemas changed."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compile every stale schema.
    Compile(CompileArgs),
    /// List the schemas a compile would regenerate.
    Stale(StaleArgs),
    /// Remove generated files for the configured schemas.
    Clean(ProjectArgs),
}

#[derive(Debug, clap::Args)]
struct ProjectArgs {
    /// Project root containing thriftgen.toml (default: current directory).
    #[arg(long, default_value = ".")]
    project_root: Utf8PathBuf,

    /// Directory generated sources are written to (default: <project_root>/src).
    #[arg(long)]
    output_dir: Option<Utf8PathBuf>,

    /// Schema files; replaces the configured list when given.
    files: Vec<Utf8PathBuf>,
}

#[derive(Debug, Parser)]
struct CompileArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Recompile every schema regardless of timestamps.
    #[arg(long, default_value_t = false)]
    force: bool,

    /// Compiler name or path (default: thrift).
    #[arg(long)]
    executable: Option<String>,

    /// Required compiler version range, e.g. "~> 0.10".
    #[arg(long)]
    version_req: Option<String>,

    /// Extra compiler flag; repeat to pass several, e.g. --option=-strict.
    #[arg(long = "option", allow_hyphen_values = true)]
    options: Vec<String>,
}

#[derive(Debug, Parser)]
struct StaleArgs {
    #[command(flatten)]
    project: ProjectArgs,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            let code = e
                .downcast_ref::<ThriftgenError>()
                .map(ThriftgenError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compile(args) => cmd_compile(args),
        Command::Stale(args) => cmd_stale(args),
        Command::Clean(args) => cmd_clean(args),
    }
}

fn load_settings(
    project: &ProjectArgs,
    mut overrides: CliOverrides,
) -> anyhow::Result<CompileSettings> {
    let file_config =
        config::load_or_default(&project.project_root).context("load thriftgen.toml config")?;

    overrides.files = project.files.clone();
    overrides.output_dir = project.output_dir.clone();
    let settings = ConfigMerger::new(file_config).merge(&project.project_root, &overrides);

    debug!(
        "merged config: files={:?}, output_dir={}, executable={}, options={:?}, version={:?}",
        settings.files,
        settings.output_dir,
        settings.executable,
        settings.options,
        settings.version_requirement
    );
    Ok(settings)
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    let settings = load_settings(
        &args.project,
        CliOverrides {
            executable: args.executable,
            version_requirement: args.version_req,
            options: args.options,
            force: args.force,
            ..Default::default()
        },
    )?;

    let outcome = run_compile(
        &settings,
        &PathExecutableLocator::from_env(),
        &FsArtifactFinder,
        &FsWritePort,
        &SystemProcessRunner,
    )?;

    match &outcome {
        RunOutcome::Noop => println!("noop"),
        RunOutcome::Ran(results) => {
            let failed = outcome.failures().count();
            println!(
                "compiled {} of {} schema file(s)",
                results.len() - failed,
                results.len()
            );
        }
    }
    Ok(())
}

fn cmd_stale(args: StaleArgs) -> anyhow::Result<()> {
    let settings = load_settings(&args.project, CliOverrides::default())?;
    let stale = stale_files(&settings, &FsArtifactFinder);

    match args.format {
        OutputFormat::Text => {
            if stale.is_empty() {
                println!("all schema files are up to date");
            }
            for schema in &stale {
                println!("{}", schema.path());
            }
        }
        OutputFormat::Json => {
            let paths: Vec<&str> = stale.iter().map(|s| s.path().as_str()).collect();
            let doc = serde_json::json!({
                "output_dir": settings.output_dir,
                "stale": paths,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

fn cmd_clean(args: ProjectArgs) -> anyhow::Result<()> {
    let settings = load_settings(&args, CliOverrides::default())?;
    let removed = run_clean(&settings, &FsArtifactFinder, &FsWritePort)
        .with_context(|| format!("clean {}", settings.output_dir))?;

    for path in &removed {
        println!("removed {}", path);
    }
    Ok(())
}

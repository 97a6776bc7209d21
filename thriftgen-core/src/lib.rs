//! Embeddable core library for thriftgen.
//!
//! Decides which Thrift schemas need regenerating, gates on the compiler's
//! version and drives the compiler once per stale schema. Nothing here parses
//! command-line arguments or reads project configuration; callers hand in a
//! [`CompileSettings`](settings::CompileSettings).
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`ExecutableLocator`](ports::ExecutableLocator): find the compiler on `PATH`
//! - [`ArtifactFinder`](ports::ArtifactFinder): glob the output directory, read mtimes
//! - [`ProcessRunner`](ports::ProcessRunner): run the compiler and capture its output
//! - [`WritePort`](ports::WritePort): create the output directory, remove artifacts
//!
//! The [`adapters`] module provides default filesystem/process-backed implementations.
//!
//! # Entry points
//!
//! - [`run_compile`](pipeline::run_compile): regenerate every stale schema
//! - [`stale_files`](pipeline::stale_files): compute the work list only
//! - [`run_clean`](pipeline::run_clean): remove generated artifacts

pub mod adapters;
pub mod artifacts;
pub mod error;
pub mod invoke;
pub mod pipeline;
pub mod ports;
pub mod settings;
pub mod staleness;
pub mod version;

pub use artifacts::{ArtifactNaming, ArtifactSet, SchemaFile};
pub use error::ThriftgenError;
pub use invoke::{InvocationPlan, InvocationResult};
pub use pipeline::RunOutcome;
pub use settings::CompileSettings;
pub use version::VersionRequirement;

//! Argument assembly and per-schema compiler invocation.

use crate::artifacts::SchemaFile;
use crate::ports::ProcessRunner;
use camino::Utf8Path;
use tracing::{debug, error, info};

pub const OUT_FLAG: &str = "--out";
pub const GEN_FLAG: &str = "--gen";

/// Shared argument prefix for every compiler invocation in a run.
///
/// The schema path is not part of the plan; [`InvocationPlan::args_for`]
/// appends it per file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPlan {
    args: Vec<String>,
}

impl InvocationPlan {
    pub fn shared_args(&self) -> &[String] {
        &self.args
    }

    pub fn args_for(&self, schema: &SchemaFile) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(schema.path().to_string());
        args
    }
}

fn is_generator_flag(option: &str) -> bool {
    option == GEN_FLAG || option == "-gen" || option.starts_with("--gen=")
}

/// `--out <dir>`, then `--gen <default>` unless the caller chose a generator,
/// then the caller's options in their original order.
pub fn build_args(
    output_dir: &Utf8Path,
    user_options: &[String],
    default_generator: &str,
) -> InvocationPlan {
    let mut args = vec![OUT_FLAG.to_string(), output_dir.to_string()];
    if !user_options.iter().any(|o| is_generator_flag(o)) {
        args.push(GEN_FLAG.to_string());
        args.push(default_generator.to_string());
    }
    args.extend(user_options.iter().cloned());
    InvocationPlan { args }
}

/// Outcome of compiling one schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub schema: SchemaFile,
    /// `-1` when the compiler could not be spawned or was killed by a signal.
    pub exit_code: i32,
    pub output: String,
}

impl InvocationResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Run the compiler on one schema and report the outcome.
///
/// Failures are logged and returned, never propagated: one broken schema
/// must not stop the rest of the work list.
pub fn invoke(
    executable: &Utf8Path,
    plan: &InvocationPlan,
    schema: &SchemaFile,
    runner: &dyn ProcessRunner,
) -> InvocationResult {
    let args = plan.args_for(schema);
    debug!(executable = %executable, ?args, "invoking schema compiler");

    let (exit_code, output) = match runner.run(executable, &args) {
        Ok(out) => (out.exit_code.unwrap_or(-1), out.output),
        Err(err) => (-1, format!("{err:#}")),
    };
    let result = InvocationResult {
        schema: schema.clone(),
        exit_code,
        output,
    };

    if result.succeeded() {
        info!(file = %schema.path(), "compiled {}", schema.path());
    } else {
        error!(
            file = %schema.path(),
            exit_code,
            output = %result.output.trim(),
            "failed to compile {} (exit code {})",
            schema.path(),
            exit_code
        );
    }
    result
}

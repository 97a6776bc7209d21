//! Compiler version gate.
//!
//! Requirement expressions accept the comparators understood by the `semver`
//! crate plus a few extra forms commonly found in build configuration:
//!
//! - `~> 0.10` (pessimistic): `>= 0.10.0, < 1.0.0`
//! - `~> 0.10.2`: `>= 0.10.2, < 0.11.0`
//! - `== 1.2.3` and a bare `1.2.3`: exact match
//! - `!= 1.2.3`
//! - clauses joined with `and` (or `,`), alternatives joined with `or`

use crate::error::ThriftgenError;
use crate::ports::ProcessRunner;
use anyhow::Context;
use camino::Utf8Path;
use regex::Regex;
use semver::{Version, VersionReq};
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Flag that makes the compiler print its version and exit.
pub const VERSION_FLAG: &str = "-version";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\.\d+\.\d+\b").unwrap());

/// First `MAJOR.MINOR.PATCH` number in free-form tool output.
pub fn extract_version(text: &str) -> Option<Version> {
    let found = VERSION_RE.find(text)?;
    Version::parse(found.as_str()).ok()
}

#[derive(Debug, Clone)]
enum Clause {
    Req(VersionReq),
    NotEqual(Version),
}

impl Clause {
    fn matches(&self, version: &Version) -> bool {
        match self {
            Clause::Req(req) => req.matches(version),
            Clause::NotEqual(v) => v != version,
        }
    }
}

/// A parsed version range expression.
#[derive(Debug, Clone)]
pub struct VersionRequirement {
    source: String,
    alternatives: Vec<Vec<Clause>>,
}

impl VersionRequirement {
    pub fn parse(expr: &str) -> Result<Self, ThriftgenError> {
        let invalid = |reason: String| ThriftgenError::InvalidRequirement {
            expr: expr.to_string(),
            reason,
        };

        let normalized = expr.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            return Err(invalid("empty expression".to_string()));
        }

        let mut alternatives = Vec::new();
        for alternative in normalized.split(" or ") {
            let mut clauses = Vec::new();
            for clause in alternative
                .split(" and ")
                .flat_map(|part| part.split(','))
                .map(str::trim)
            {
                if clause.is_empty() {
                    return Err(invalid("empty clause".to_string()));
                }
                clauses.push(parse_clause(clause).map_err(invalid)?);
            }
            alternatives.push(clauses);
        }

        Ok(Self {
            source: expr.trim().to_string(),
            alternatives,
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives
            .iter()
            .any(|clauses| clauses.iter().all(|clause| clause.matches(version)))
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_clause(clause: &str) -> Result<Clause, String> {
    if let Some(rest) = clause.strip_prefix("~>") {
        return pessimistic(rest.trim()).map(Clause::Req);
    }
    if let Some(rest) = clause.strip_prefix("!=") {
        let version = Version::parse(rest.trim()).map_err(|e| format!("{rest:?}: {e}"))?;
        return Ok(Clause::NotEqual(version));
    }

    // semver reads a bare `1.2.3` as `^1.2.3`; build configs mean exact.
    let req = if let Some(rest) = clause.strip_prefix("==") {
        format!("={}", rest.trim())
    } else if clause.starts_with(|c: char| c.is_ascii_digit()) {
        format!("={clause}")
    } else {
        clause.to_string()
    };
    VersionReq::parse(&req)
        .map(Clause::Req)
        .map_err(|e| format!("{clause:?}: {e}"))
}

fn pessimistic(version: &str) -> Result<VersionReq, String> {
    let parts = version
        .split('.')
        .map(|part| part.parse::<u64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("`~> {version}`: {e}"))?;

    let range = match parts.as_slice() {
        [major, minor] => format!(">={major}.{minor}.0, <{}.0.0", major + 1),
        [major, minor, patch] => {
            format!(">={major}.{minor}.{patch}, <{major}.{}.0", minor + 1)
        }
        _ => return Err(format!("`~> {version}` needs MAJOR.MINOR or MAJOR.MINOR.PATCH")),
    };
    VersionReq::parse(&range).map_err(|e| format!("`~> {version}`: {e}"))
}

/// Ask the compiler for its version and check it against `requirement`.
pub fn check_version(
    executable: &Utf8Path,
    requirement: &VersionRequirement,
    runner: &dyn ProcessRunner,
) -> Result<Version, ThriftgenError> {
    let output = runner
        .run(executable, &[VERSION_FLAG.to_string()])
        .with_context(|| format!("run `{executable} {VERSION_FLAG}`"))?;

    if !output.success() {
        return Err(ThriftgenError::VersionCommand {
            executable: executable.to_path_buf(),
            code: output.exit_code.unwrap_or(-1),
            output: output.output.trim().to_string(),
        });
    }

    let Some(version) = extract_version(&output.output) else {
        return Err(ThriftgenError::VersionParse {
            output: output.output.trim().to_string(),
        });
    };
    debug!(%version, %requirement, "checking compiler version");

    if !requirement.matches(&version) {
        return Err(ThriftgenError::UnsupportedVersion {
            found: version,
            required: requirement.to_string(),
        });
    }

    info!(%version, "compiler version satisfies {requirement}");
    Ok(version)
}

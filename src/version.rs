/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core::version
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Read a checkout's version descriptor and normalize it into
    branch, release numbers, maturity, and release type.

  Security / Safety Notes:
    Descriptors are parsed as TOML data and never executed.

  Dependencies:
    serde + toml for parsing.

  Operational Scope:
    Called by the assembler once per resolved candidate.

  Revision History:
    2025-11-12 COD  Authored version descriptor parser.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Structured parsing with clear failure modes
    - Internal fields kept out of published records
============================================================*/

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SkipReason;

pub const MATURITY_ALPHA: u32 = 50;
pub const MATURITY_BETA: u32 = 100;
pub const MATURITY_RC: u32 = 150;
pub const MATURITY_STABLE: u32 = 200;

/// Scalar copied verbatim from a descriptor into the manifest.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Flag(bool),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Flag(value) => write!(f, "{value}"),
            Scalar::Text(value) => f.write_str(value),
        }
    }
}

/// Maturity as written in a descriptor: numeric level or symbolic name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Maturity {
    Level(u32),
    Named(String),
}

impl Maturity {
    pub fn level(&self) -> Option<u32> {
        match self {
            Maturity::Level(level) => Some(*level),
            Maturity::Named(name) => {
                let lowered = name.trim().to_ascii_lowercase();
                match lowered.strip_prefix("maturity_").unwrap_or(&lowered) {
                    "alpha" => Some(MATURITY_ALPHA),
                    "beta" => Some(MATURITY_BETA),
                    "rc" => Some(MATURITY_RC),
                    "stable" => Some(MATURITY_STABLE),
                    _ => None,
                }
            }
        }
    }
}

/// Raw contents of a version descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionDescriptor {
    pub version: Scalar,
    pub release: String,
    #[serde(default)]
    pub branch: Option<Scalar>,
    #[serde(default)]
    pub maturity: Option<Maturity>,
}

/// Normalized version metadata for one checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionRecord {
    pub version: Scalar,
    pub release: String,
    /// Always `major.minor`.
    pub branch: String,
    pub maturity: u32,
    #[serde(skip)]
    pub release_numbers: String,
    #[serde(skip)]
    pub is_release: bool,
}

impl VersionRecord {
    /// Branch with dots removed, as used in file names and URLs.
    pub fn branch_compact(&self) -> String {
        self.branch.replace('.', "")
    }
}

/// Leading `digits.digits` of a release string (`3.11` of `3.11.5+`).
pub fn branch_prefix(release: &str) -> Option<&str> {
    let major = release.len() - release.trim_start_matches(|ch: char| ch.is_ascii_digit()).len();
    let rest = release[major..].strip_prefix('.')?;
    let minor = rest.len() - rest.trim_start_matches(|ch: char| ch.is_ascii_digit()).len();
    (major > 0 && minor > 0).then(|| &release[..major + 1 + minor])
}

/// Reformat a compact branch token by placing a dot after its first
/// character: `311` becomes `3.11`. Tokens shorter than two characters
/// carry no usable branch.
pub fn expand_branch(compact: &str) -> Option<String> {
    let mut chars = compact.chars();
    let head = chars.next()?;
    let tail = chars.as_str();
    if tail.is_empty() {
        return None;
    }
    Some(format!("{head}.{tail}"))
}

/// Release string up to the first space (drops annotations like
/// `(Build: 20210517)`).
pub fn release_numbers(release: &str) -> Option<&str> {
    let token = release.split(' ').next().unwrap_or_default();
    (!token.is_empty()).then_some(token)
}

/// A release carries nothing but digits and dots.
pub fn is_release(release_numbers: &str) -> bool {
    release_numbers
        .chars()
        .all(|ch| ch.is_ascii_digit() || ch == '.')
}

/// Normalize raw descriptor fields into a version record.
pub fn normalize(raw: VersionDescriptor) -> Result<VersionRecord, SkipReason> {
    let explicit = raw
        .branch
        .as_ref()
        .map(|branch| branch.to_string())
        .and_then(|branch| expand_branch(branch.trim()));
    let branch = match explicit {
        Some(branch) => branch,
        None => branch_prefix(&raw.release)
            .map(str::to_string)
            .ok_or_else(|| {
                SkipReason::InvalidVersion(format!("no branch in release `{}`", raw.release))
            })?,
    };

    let numbers = release_numbers(&raw.release)
        .ok_or_else(|| {
            SkipReason::InvalidVersion(format!("no release numbers in `{}`", raw.release))
        })?
        .to_string();

    let maturity = match raw.maturity {
        None => MATURITY_STABLE,
        Some(maturity) => maturity.level().ok_or_else(|| {
            SkipReason::InvalidVersion(format!("unknown maturity {maturity:?}"))
        })?,
    };

    Ok(VersionRecord {
        version: raw.version,
        release: raw.release,
        branch,
        maturity,
        is_release: is_release(&numbers),
        release_numbers: numbers,
    })
}

pub fn parse_version_str(raw: &str) -> Result<VersionDescriptor, toml::de::Error> {
    toml::from_str(raw)
}

/// Load and normalize the version descriptor at `path`.
pub fn parse_version_file(path: &Path) -> Result<VersionRecord, SkipReason> {
    let raw = std::fs::read_to_string(path).map_err(|_| SkipReason::DescriptorMissing {
        path: path.to_path_buf(),
    })?;
    let descriptor = parse_version_str(&raw).map_err(|err| SkipReason::DescriptorUnparseable {
        path: path.to_path_buf(),
        reason: err.message().to_string(),
    })?;
    normalize(descriptor)
}

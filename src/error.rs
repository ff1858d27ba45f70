/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Separate fatal run failures from recoverable per-candidate
    skips so every component reports which of the two occurred.

  Security / Safety Notes:
    Error contexts expose filesystem paths only; descriptor
    contents are never echoed back.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    RelinfoError aborts the run from the binary entry point;
    SkipReason travels back to the caller, which logs it and
    continues with the next unit.

  Revision History:
    2025-11-12 COD  Split fatal errors from skip reasons.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for Rel-Info operations.
pub type Result<T> = std::result::Result<T, RelinfoError>;

/// Fatal conditions: the run aborts and no manifest is written.
#[derive(Debug, Error)]
pub enum RelinfoError {
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Precondition: {0}")]
    Precondition(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RelinfoError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            RelinfoError::Config(_) => ExitCode::from(20),
            RelinfoError::Precondition(_) => ExitCode::from(21),
            RelinfoError::Serialization(_) => ExitCode::from(31),
            RelinfoError::Filesystem(_) => ExitCode::from(40),
            RelinfoError::Io(_) => ExitCode::from(41),
        }
    }
}

/// Recoverable conditions: the affected unit is skipped and the run goes on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("Rule {family} has no dir information")]
    MissingTemplateDir { family: String },
    #[error("Rule {family} has an unusable dir template: {reason}")]
    InvalidTemplate { family: String, reason: String },
    #[error("Cannot read template directory {}", path.display())]
    ParentUnreadable { path: PathBuf },
    #[error("Non-matching entry {}", path.display())]
    NoMatch { path: PathBuf },
    #[error("Not a directory {}", path.display())]
    NotADirectory { path: PathBuf },
    #[error("No readable descriptor {}", path.display())]
    DescriptorMissing { path: PathBuf },
    #[error("Cannot parse descriptor {}: {reason}", path.display())]
    DescriptorUnparseable { path: PathBuf, reason: String },
    #[error("Cannot extract version information: {0}")]
    InvalidVersion(String),
    #[error("No {style} download template for {release}")]
    MissingDownloadTemplate {
        style: &'static str,
        release: String,
    },
}

impl SkipReason {
    /// Short log code used when the reason is reported.
    pub fn code(&self) -> &'static str {
        match self {
            SkipReason::MissingTemplateDir { .. } | SkipReason::InvalidTemplate { .. } => "RULE",
            SkipReason::ParentUnreadable { .. } => "TEMPLATE",
            SkipReason::NoMatch { .. } | SkipReason::NotADirectory { .. } => "ENTRY",
            SkipReason::DescriptorMissing { .. } | SkipReason::DescriptorUnparseable { .. } => {
                "DESCRIPTOR"
            }
            SkipReason::InvalidVersion(_) => "VERSION",
            SkipReason::MissingDownloadTemplate { .. } => "DOWNLOAD",
        }
    }
}

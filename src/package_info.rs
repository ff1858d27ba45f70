/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core::package_info
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Report presence, size, and checksum sidecars of packaged
    artifacts (zip, tgz, installers).

  Security / Safety Notes:
    Metadata lookups only; artifact contents are never read.

  Dependencies:
    chrono for modification timestamps.

  Operational Scope:
    Used by the assembler and the macOS catalog projection.

  Revision History:
    2025-11-12 COD  Reworked shared size metadata for artifacts.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Absence is data, not failure
    - Serializable structures for manifest output
============================================================*/

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Presence and checksum sidecars of one artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    #[serde(rename = "size")]
    pub size_bytes: Option<u64>,
    #[serde(rename = "md5")]
    pub has_md5: bool,
    #[serde(rename = "sha256")]
    pub has_sha256: bool,
}

/// Size-only view, used for artifacts that never get sidecars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeInfo {
    #[serde(rename = "size")]
    pub size_bytes: Option<u64>,
}

/// Inspect `path` and its `.md5` / `.sha256` sidecars.
pub fn inspect_package(path: &Path) -> PackageInfo {
    PackageInfo {
        size_bytes: file_size(path),
        has_md5: sidecar(path, "md5").exists(),
        has_sha256: sidecar(path, "sha256").exists(),
    }
}

pub fn inspect_size(path: &Path) -> SizeInfo {
    SizeInfo {
        size_bytes: file_size(path),
    }
}

pub fn file_size(path: &Path) -> Option<u64> {
    std::fs::metadata(path)
        .ok()
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
}

/// Modification time in Unix seconds.
pub fn modified_at(path: &Path) -> Option<i64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified).timestamp())
}

/// `<path>.<extension>`, appended rather than replacing any extension.
pub fn sidecar(path: &Path, extension: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core::descriptor
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Read the release and weekly index descriptors stored next
    to packaged artifacts.

  Security / Safety Notes:
    TOML data only; values are passed through verbatim.

  Dependencies:
    serde + toml.

  Operational Scope:
    Consulted by the assembler for every package directory.

  Revision History:
    2025-11-12 COD  Authored index descriptor reader.
============================================================*/

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SkipReason;

/// Which of the two index descriptors a package directory carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    /// Tagged release packages.
    Release,
    /// Rolling weekly packages, not yet released.
    Weekly,
}

impl DescriptorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DescriptorKind::Release => "release",
            DescriptorKind::Weekly => "weekly",
        }
    }
}

/// Contents of `release_index_info` / `norelease_index_info`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DescriptorInfo {
    pub version: String,
    pub branch: String,
    pub githash: String,
}

/// Load a descriptor; a missing file is `Ok(None)`.
pub fn parse_info_file(path: &Path) -> Result<Option<DescriptorInfo>, SkipReason> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path).map_err(|err| SkipReason::DescriptorUnparseable {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    toml::from_str(&raw)
        .map(Some)
        .map_err(|err: toml::de::Error| SkipReason::DescriptorUnparseable {
            path: path.to_path_buf(),
            reason: err.message().to_string(),
        })
}

/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core::manifest
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Construct the Rel-Info manifest from assembled releases and
    the macOS package catalog, and persist it for the download
    site.

  Security / Safety Notes:
    Manifest data is written to operator-controlled paths; the
    target is replaced atomically so readers never observe a
    partial document.

  Dependencies:
    serde + serde_json for output, toml for the catalog, libc
    for permission checks, chrono for the run timestamp.

  Operational Scope:
    Final pipeline stage, invoked once per run.

  Revision History:
    2025-11-12 COD  Adapted manifest builder for release data.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Preconditions verified before any scan begins
    - No partial manifest on failure
    - Deterministic ordering for reproducible manifests
============================================================*/

use std::ffi::CString;
use std::fs;
use std::io::Write;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::assembler::{collect_releases, ReleaseRecord};
use crate::config::RelinfoConfig;
use crate::error::{RelinfoError, Result};
use crate::logger::Logger;
use crate::package_info::file_size;
use crate::version::Scalar;

/// Wrapper representing the full manifest document.
#[derive(Debug, Serialize)]
pub struct ManifestDocument {
    /// Unix seconds at generation time.
    pub timestamp: i64,
    pub releases: Vec<ReleaseRecord>,
    pub macospackages: Vec<MacPackageRecord>,
}

/// One entry of the macOS catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub git: String,
    pub desc: String,
    pub mamp: String,
    pub age: Scalar,
}

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    versions: Vec<CatalogEntry>,
}

/// Catalog entry as published, with the package size looked up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacPackageRecord {
    pub name: String,
    pub git: String,
    pub desc: String,
    pub mamp: String,
    pub age: Scalar,
    #[serde(rename = "size")]
    pub size_bytes: Option<u64>,
}

/// Fail fast on conditions that would prevent writing the manifest.
pub fn check_preconditions(config: &RelinfoConfig, output: &Path) -> Result<()> {
    let dir = output_dir(output);
    if !dir.is_dir() || !access(&dir, libc::W_OK) {
        return Err(RelinfoError::Precondition(format!(
            "Directory {} must exist and be writeable",
            dir.display()
        )));
    }
    if output.exists() && !access(output, libc::W_OK) {
        return Err(RelinfoError::Precondition(format!(
            "File {} must be writeable",
            output.display()
        )));
    }
    let catalog = config.macos.catalog_path();
    if catalog.exists() && !access(&catalog, libc::R_OK) {
        return Err(RelinfoError::Precondition(format!(
            "File {} must be readable",
            catalog.display()
        )));
    }
    Ok(())
}

fn output_dir(output: &Path) -> PathBuf {
    match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn access(path: &Path, mode: libc::c_int) -> bool {
    let Ok(raw) = CString::new(path.as_os_str().as_bytes()) else {
        return false;
    };
    // SAFETY: `raw` is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(raw.as_ptr(), mode) == 0 }
}

/// Load the macOS catalog; a missing catalog yields no entries.
pub fn load_catalog(path: &Path, logger: &Logger) -> Result<Vec<CatalogEntry>> {
    if !path.exists() {
        logger.warn(
            "MACOS",
            format!("No macOS catalog at {}; publishing none", path.display()),
        );
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path).map_err(|err| {
        RelinfoError::Filesystem(format!("Failed to read {}: {err}", path.display()))
    })?;
    let catalog: Catalog = toml::from_str(&raw).map_err(|err| {
        RelinfoError::Config(format!("{}: {}", path.display(), err.message()))
    })?;
    Ok(catalog.versions)
}

/// Project catalog entries, looking each package up under `packages_dir`.
pub fn mac_packages(entries: Vec<CatalogEntry>, packages_dir: &Path) -> Vec<MacPackageRecord> {
    entries
        .into_iter()
        .map(|entry| MacPackageRecord {
            size_bytes: file_size(&packages_dir.join(&entry.mamp)),
            name: entry.name,
            git: entry.git,
            desc: entry.desc,
            mamp: entry.mamp,
            age: entry.age,
        })
        .collect()
}

/// Run the pipeline and wrap its output into a manifest document.
pub fn build_manifest(
    config: &RelinfoConfig,
    families: &[String],
    logger: &Logger,
) -> Result<ManifestDocument> {
    let timestamp = Utc::now().timestamp();
    let selected = config.select_families(families);
    if selected.is_empty() {
        logger.warn("RULE", "No template families selected");
    }
    let releases = collect_releases(config, &selected, logger);
    logger.info("RELEASES", format!("Assembled {} releases", releases.len()));

    let catalog = load_catalog(&config.macos.catalog_path(), logger)?;
    let macospackages = mac_packages(catalog, &config.macos.packages_dir);

    Ok(ManifestDocument {
        timestamp,
        releases,
        macospackages,
    })
}

/// Persist the manifest, replacing any previous one atomically.
pub fn write_manifest(document: &ManifestDocument, path: &Path, pretty: bool) -> Result<()> {
    let body = if pretty {
        serde_json::to_vec_pretty(document)
    } else {
        serde_json::to_vec(document)
    }
    .map_err(|err| RelinfoError::Serialization(format!("Failed to encode manifest: {err}")))?;

    let mut staging = path.as_os_str().to_os_string();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);
    let result = fs::File::create(&staging)
        .and_then(|mut file| {
            file.write_all(&body)?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&staging, path));
    if let Err(err) = result {
        let _ = fs::remove_file(&staging);
        return Err(RelinfoError::Filesystem(format!(
            "Failed to write manifest {}: {err}",
            path.display()
        )));
    }
    Ok(())
}

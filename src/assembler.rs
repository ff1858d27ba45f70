/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core::assembler
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Merge a checkout's version metadata with its packaged
    artifacts into one publishable release record.

  Security / Safety Notes:
    Read-only filesystem lookups under configured roots.

  Dependencies:
    serde for record serialization.

  Operational Scope:
    Drives the resolver, descriptor parsers, and artifact
    inspector for every configured template family.

  Revision History:
    2025-11-12 COD  Authored release record assembly.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Per-record state only; nothing carries across candidates
    - Explicit skip reasons for every discarded candidate
============================================================*/

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{RelinfoConfig, TemplateFamily, BRANCH_PLACEHOLDER, VERSION_PLACEHOLDER};
use crate::descriptor::{parse_info_file, DescriptorInfo, DescriptorKind};
use crate::error::SkipReason;
use crate::logger::Logger;
use crate::package_info::{inspect_package, inspect_size, modified_at, PackageInfo, SizeInfo};
use crate::resolver::{resolve_candidates, Candidate};
use crate::version::{parse_version_file, VersionRecord};

/// Descriptor sub-record with its zip and tgz artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexInfo {
    #[serde(flatten)]
    pub descriptor: DescriptorInfo,
    pub date: Option<i64>,
    pub zip: PackageInfo,
    pub tgz: PackageInfo,
}

/// One entry of the manifest's `releases` list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseRecord {
    #[serde(flatten)]
    pub version: VersionRecord,
    pub date: Option<i64>,
    pub url: String,
    pub download: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub norelease_index_info: Option<IndexInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_index_info: Option<IndexInfo>,
    pub windows: SizeInfo,
}

/// Collect release records for the given families, in order.
pub fn collect_releases(
    config: &RelinfoConfig,
    families: &[&TemplateFamily],
    logger: &Logger,
) -> Vec<ReleaseRecord> {
    let mut releases = Vec::new();
    for family in families {
        logger.info(
            "RULE",
            format!("Processing rule: {} => {}", family.name, family.dir),
        );
        let candidates =
            match resolve_candidates(family, &config.descriptors.version_file, logger) {
                Ok(candidates) => candidates,
                Err(reason) => {
                    logger.skip(&reason);
                    continue;
                }
            };
        for candidate in candidates {
            match assemble_release(config, family, &candidate, logger) {
                Ok(record) => {
                    logger.debug(
                        "RELEASE",
                        format!(
                            "{} → {} ({})",
                            candidate.directory.display(),
                            record.version.release,
                            record.download
                        ),
                    );
                    releases.push(record);
                }
                Err(reason) => logger.skip(&reason),
            }
        }
    }
    releases
}

/// Build the release record for one candidate directory.
pub fn assemble_release(
    config: &RelinfoConfig,
    family: &TemplateFamily,
    candidate: &Candidate,
    logger: &Logger,
) -> Result<ReleaseRecord, SkipReason> {
    let version = parse_version_file(&candidate.descriptor)?;
    let compact = version.branch_compact();
    if let Some(token) = candidate.token.as_deref() {
        if token != compact {
            logger.warn(
                "BRANCH",
                format!(
                    "{} reports branch {} but lives in {}",
                    candidate.descriptor.display(),
                    version.branch,
                    candidate.entry
                ),
            );
        }
    }

    let download = download_url(family, &version)?;
    let package_dir = PathBuf::from(family.packagedir.replace(BRANCH_PLACEHOLDER, &compact));

    let weekly = load_descriptor(config, &package_dir, DescriptorKind::Weekly, logger);
    let release = load_descriptor(config, &package_dir, DescriptorKind::Release, logger);
    let trunk = is_trunk(config, weekly.as_ref(), release.as_ref());

    let latest_name = artifact_stem(&config.product, "latest", &compact, trunk);
    let norelease_index_info =
        weekly.map(|descriptor| index_info(&package_dir, &latest_name, descriptor));
    let release_index_info = release.map(|descriptor| {
        let stem = format!("{}-{}", config.product, descriptor.version);
        index_info(&package_dir, &stem, descriptor)
    });

    // Released zip wins when both kinds exist.
    let date = release_index_info
        .as_ref()
        .or(norelease_index_info.as_ref())
        .and_then(|info| info.date);

    let windows = inspect_size(&windows_installer_path(config, &package_dir, &compact, trunk));

    Ok(ReleaseRecord {
        version,
        date,
        url: config.releases_url.clone(),
        download,
        norelease_index_info,
        release_index_info,
        windows,
    })
}

/// Substitute branch and version placeholders into the family's URL.
pub fn download_url(family: &TemplateFamily, version: &VersionRecord) -> Result<String, SkipReason> {
    let template = family.download_template(version.is_release).ok_or_else(|| {
        SkipReason::MissingDownloadTemplate {
            style: if version.is_release { "release" } else { "weekly" },
            release: version.release_numbers.clone(),
        }
    })?;
    Ok(template
        .replace(BRANCH_PLACEHOLDER, &version.branch_compact())
        .replace(VERSION_PLACEHOLDER, &version.release_numbers))
}

/// `<product>-<label>`, with `-<compact>` appended off trunk.
pub fn artifact_stem(product: &str, label: &str, compact: &str, trunk: bool) -> String {
    if trunk {
        format!("{product}-{label}")
    } else {
        format!("{product}-{label}-{compact}")
    }
}

/// Trunk packages carry no branch suffix. The weekly descriptor decides,
/// then the release one; with neither present the record is a branch.
pub fn is_trunk(
    config: &RelinfoConfig,
    weekly: Option<&DescriptorInfo>,
    release: Option<&DescriptorInfo>,
) -> bool {
    weekly
        .or(release)
        .is_some_and(|descriptor| descriptor.branch == config.trunk_branch)
}

fn windows_installer_path(
    config: &RelinfoConfig,
    package_dir: &Path,
    compact: &str,
    trunk: bool,
) -> PathBuf {
    let base = package_dir.parent().unwrap_or(package_dir);
    let name = if trunk {
        format!("{}.zip", config.windows.prefix)
    } else {
        format!("{}-{compact}.zip", config.windows.prefix)
    };
    base.join(&config.windows.dir).join(name)
}

fn load_descriptor(
    config: &RelinfoConfig,
    package_dir: &Path,
    kind: DescriptorKind,
    logger: &Logger,
) -> Option<DescriptorInfo> {
    let name = match kind {
        DescriptorKind::Release => &config.descriptors.release_info,
        DescriptorKind::Weekly => &config.descriptors.norelease_info,
    };
    match parse_info_file(&package_dir.join(name)) {
        Ok(info) => info,
        Err(reason) => {
            logger.warn(
                "DESCRIPTOR",
                format!("Ignoring {} descriptor: {reason}", kind.as_str()),
            );
            None
        }
    }
}

fn index_info(package_dir: &Path, stem: &str, descriptor: DescriptorInfo) -> IndexInfo {
    let zip = package_dir.join(format!("{stem}.zip"));
    let tgz = package_dir.join(format!("{stem}.tgz"));
    IndexInfo {
        descriptor,
        date: modified_at(&zip),
        zip: inspect_package(&zip),
        tgz: inspect_package(&tgz),
    }
}

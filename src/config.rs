/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load the run configuration: template families, download
    URL templates, descriptor names, and output locations.

  Security / Safety Notes:
    Configuration is parsed as TOML data; unknown keys are
    rejected so typos surface before any scan begins.

  Dependencies:
    serde + toml for parsing, dirs for the default location.

  Operational Scope:
    Loaded once by the entry point and passed by reference into
    every pipeline stage.

  Revision History:
    2025-11-12 COD  Authored Rel-Info configuration layer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit defaults mirroring the production download site
    - Configurable execution via CLI and config file
============================================================*/

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{RelinfoError, Result};

/// Placeholder standing for the compact branch (`311`) in templates.
pub const BRANCH_PLACEHOLDER: &str = "XY";
/// Placeholder standing for the full release numbers (`3.11.5`) in URLs.
pub const VERSION_PLACEHOLDER: &str = "X.Y.Z";

const CONFIG_DIR: &str = "relinfo";
const CONFIG_FILE: &str = "config.toml";

/// One family of releases sharing directory and URL conventions.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TemplateFamily {
    pub name: String,
    /// Source checkout template; may contain [`BRANCH_PLACEHOLDER`].
    #[serde(default)]
    pub dir: String,
    /// Directory holding packaged artifacts for a branch.
    pub packagedir: String,
    #[serde(default)]
    pub downloadweekly: Option<String>,
    #[serde(default)]
    pub downloadrelease: Option<String>,
}

impl TemplateFamily {
    /// Download template for the requested style, ignoring empty entries.
    pub fn download_template(&self, is_release: bool) -> Option<&str> {
        let template = if is_release {
            self.downloadrelease.as_deref()
        } else {
            self.downloadweekly.as_deref()
        };
        template.filter(|value| !value.trim().is_empty())
    }
}

/// Well-known descriptor file names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptorNames {
    pub version_file: String,
    pub release_info: String,
    pub norelease_info: String,
}

impl Default for DescriptorNames {
    fn default() -> Self {
        Self {
            version_file: "version.toml".into(),
            release_info: "release_index_info.toml".into(),
            norelease_info: "norelease_index_info.toml".into(),
        }
    }
}

/// Windows installer location, relative to the parent of a package dir.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowsConfig {
    pub dir: String,
    pub prefix: String,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            dir: "windows".into(),
            prefix: "MoodleWindowsInstaller-latest".into(),
        }
    }
}

/// macOS package catalog location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacosConfig {
    pub packages_dir: PathBuf,
    /// Catalog file; relative paths resolve against `packages_dir`.
    pub catalog: PathBuf,
}

impl Default for MacosConfig {
    fn default() -> Self {
        Self {
            packages_dir: PathBuf::from("/var/www/vhosts/download.moodle.org/html/macosx"),
            catalog: PathBuf::from("maccfg.toml"),
        }
    }
}

impl MacosConfig {
    pub fn catalog_path(&self) -> PathBuf {
        self.packages_dir.join(&self.catalog)
    }
}

/// Top-level Rel-Info configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelinfoConfig {
    pub output_path: PathBuf,
    pub releases_url: String,
    pub product: String,
    pub trunk_branch: String,
    pub log_dir: Option<PathBuf>,
    pub descriptors: DescriptorNames,
    pub windows: WindowsConfig,
    pub macos: MacosConfig,
    pub families: Vec<TemplateFamily>,
}

impl Default for RelinfoConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("/tmp/packages.json"),
            releases_url: "https://download.moodle.org".into(),
            product: "moodle".into(),
            trunk_branch: "master".into(),
            log_dir: None,
            descriptors: DescriptorNames::default(),
            windows: WindowsConfig::default(),
            macos: MacosConfig::default(),
            families: default_families(),
        }
    }
}

fn default_families() -> Vec<TemplateFamily> {
    vec![
        TemplateFamily {
            name: "default".into(),
            dir: "/var/www/vhosts/download.moodle.org/data/stableXY/moodle".into(),
            packagedir: "/var/www/vhosts/download.moodle.org/html-extra/stableXY".into(),
            downloadweekly: Some(
                "https://download.moodle.org/download.php/direct/stableXY/moodle-latest-XY.zip"
                    .into(),
            ),
            downloadrelease: Some(
                "https://download.moodle.org/download.php/direct/stableXY/moodle-X.Y.Z.zip".into(),
            ),
        },
        TemplateFamily {
            name: "master".into(),
            dir: "/var/www/vhosts/download.moodle.org/data/head/moodle".into(),
            packagedir: "/var/www/vhosts/download.moodle.org/html-extra/moodle".into(),
            downloadweekly: Some(
                "https://download.moodle.org/download.php/direct/moodle/moodle-latest.zip".into(),
            ),
            downloadrelease: None,
        },
    ]
}

impl RelinfoConfig {
    /// Load from an explicit path, or from the default location when it
    /// exists, falling back to built-in defaults.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::load(explicit),
            None => match default_config_path() {
                Some(candidate) if candidate.is_file() => Self::load(&candidate),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            RelinfoError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml(&raw)
            .map_err(|err| RelinfoError::Config(format!("{}: {err}", path.display())))
    }

    pub fn from_toml(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_path.clone()
    }

    /// Directory for session logs; defaults under the user's state dir.
    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir {
            return dir.clone();
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join(CONFIG_DIR)
            .join("logs")
    }

    /// Families restricted to the requested names, keeping config order.
    pub fn select_families(&self, requested: &[String]) -> Vec<&TemplateFamily> {
        self.families
            .iter()
            .filter(|family| requested.is_empty() || requested.contains(&family.name))
            .collect()
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

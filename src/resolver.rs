/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core::resolver
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Turn a directory template such as `/data/stableXY/moodle`
    into the concrete checkout directories present on disk.

  Security / Safety Notes:
    Read-only directory listing; literal template text is regex
    escaped so path characters never act as pattern syntax.

  Dependencies:
    regex for candidate name matching.

  Operational Scope:
    First pipeline stage; feeds candidates to the assembler.

  Revision History:
    2025-11-12 COD  Authored template resolver.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Deterministic ordering for reproducible manifests
    - Structured skip reasons instead of silent filtering
============================================================*/

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config::{TemplateFamily, BRANCH_PLACEHOLDER};
use crate::error::{RelinfoError, Result, SkipReason};
use crate::logger::Logger;

/// A template split around its branch placeholder.
#[derive(Debug, Clone)]
pub struct DirectoryTemplate {
    parent: PathBuf,
    suffix: String,
    pattern: Regex,
}

impl DirectoryTemplate {
    /// Split `template` into parent dir, base name pattern, and suffix.
    ///
    /// `/data/stableXY/moodle` yields parent `/data`, pattern
    /// `stable(\d{2,4})$` and suffix `/moodle`. Without a placeholder the
    /// last path component must match literally.
    pub fn parse(template: &str) -> Result<Self> {
        let (base, suffix) = match template.rfind(BRANCH_PLACEHOLDER) {
            Some(idx) => template.split_at(idx + BRANCH_PLACEHOLDER.len()),
            None => (template, ""),
        };
        let base_path = Path::new(base);
        let parent = base_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let base_name = base_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                RelinfoError::Config(format!("Template {template} has no base name"))
            })?;

        let escaped: Vec<String> = base_name
            .split(BRANCH_PLACEHOLDER)
            .map(|part| regex::escape(part))
            .collect();
        let expression = format!("{}$", escaped.join(r"(\d{2,4})"));
        let pattern = Regex::new(&expression).map_err(|err| {
            RelinfoError::Config(format!("Template {template} yields invalid pattern: {err}"))
        })?;

        Ok(Self {
            parent,
            suffix: suffix.to_string(),
            pattern,
        })
    }

    pub fn parent(&self) -> &Path {
        &self.parent
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Match a directory entry name; the outer option tells whether it
    /// matched, the inner one carries the numeric token when present.
    pub fn match_name(&self, name: &str) -> Option<Option<String>> {
        self.pattern
            .captures(name)
            .map(|caps| caps.get(1).map(|token| token.as_str().to_string()))
    }

    /// Directory checked out for `entry`, suffix included.
    pub fn candidate_dir(&self, entry: &str) -> PathBuf {
        let relative = format!("{entry}{}", self.suffix);
        self.parent.join(relative.trim_start_matches('/'))
    }
}

/// A checkout directory that passed every resolver filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub entry: String,
    /// Matched 2-4 digit branch token (`311`), absent for literal templates.
    pub token: Option<String>,
    pub directory: PathBuf,
    pub descriptor: PathBuf,
}

/// Enumerate candidates for one family.
///
/// The outer error means the whole template is skipped; per-entry skips are
/// logged and filtered out.
pub fn resolve_candidates(
    family: &TemplateFamily,
    descriptor_name: &str,
    logger: &Logger,
) -> std::result::Result<Vec<Candidate>, SkipReason> {
    if family.dir.trim().is_empty() {
        return Err(SkipReason::MissingTemplateDir {
            family: family.name.clone(),
        });
    }
    let template =
        DirectoryTemplate::parse(&family.dir).map_err(|err| SkipReason::InvalidTemplate {
            family: family.name.clone(),
            reason: err.to_string(),
        })?;

    let unreadable = || SkipReason::ParentUnreadable {
        path: template.parent().to_path_buf(),
    };
    let mut names: Vec<String> = fs::read_dir(template.parent())
        .map_err(|_| unreadable())?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut candidates = Vec::new();
    for name in names {
        match inspect_entry(&template, &name, descriptor_name) {
            Ok(Some(candidate)) => {
                logger.info(
                    "CANDIDATE",
                    format!("Found candidate directory {}", candidate.directory.display()),
                );
                candidates.push(candidate);
            }
            Ok(None) => {}
            Err(reason) => logger.skip(&reason),
        }
    }
    Ok(candidates)
}

/// Apply the per-entry filters. Hidden entries yield `Ok(None)` silently.
pub fn inspect_entry(
    template: &DirectoryTemplate,
    name: &str,
    descriptor_name: &str,
) -> std::result::Result<Option<Candidate>, SkipReason> {
    if name.starts_with('.') {
        return Ok(None);
    }
    let entry_path = template.parent().join(name);
    let token = template
        .match_name(name)
        .ok_or_else(|| SkipReason::NoMatch {
            path: entry_path.clone(),
        })?;
    if !entry_path.is_dir() {
        return Err(SkipReason::NotADirectory { path: entry_path });
    }

    let directory = template.candidate_dir(name);
    let descriptor = directory.join(descriptor_name);
    if !is_readable_file(&descriptor) {
        return Err(SkipReason::DescriptorMissing { path: descriptor });
    }

    Ok(Some(Candidate {
        entry: name.to_string(),
        token,
        directory,
        descriptor,
    }))
}

fn is_readable_file(path: &Path) -> bool {
    path.is_file() && fs::File::open(path).is_ok()
}

/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core::logger
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1
  ------------------------------------------------------------
  Purpose:
    Provide structured, append-only logging for manifest runs,
    including one diagnostic line per skipped unit.

  Security / Safety Notes:
    Only paths and derived metadata are logged; descriptor
    bodies never reach the log.

  Dependencies:
    std::fs::File, std::sync::Mutex, sha2 for integrity hashing.

  Operational Scope:
    Shared by every pipeline stage; the binary entry point owns
    the instance and seals it with a digest on completion.

  Revision History:
    2025-11-12 COD  Adapted session logger for Rel-Info runs.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Append-only logging with UTC timestamps
    - Deterministic formatting for auditability
    - Graceful error propagation on I/O failures
============================================================*/

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use sha2::{Digest, Sha256};

use crate::error::{RelinfoError, Result, SkipReason};

/// Structured log level for Rel-Info events.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Warnings and errors reach stderr even without `--verbose`.
    fn always_visible(self) -> bool {
        matches!(self, LogLevel::Warn | LogLevel::Error)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render one log line in Synavera cadence.
pub fn format_entry(timestamp: &str, level: LogLevel, code: &str, message: &str) -> String {
    format!("{timestamp} [{level}] [{code}] {message}")
}

/// Logger writing to stderr and, when configured, to an append-only file.
pub struct Logger {
    sink: Option<Mutex<BufWriter<File>>>,
    path: Option<PathBuf>,
    verbose: bool,
}

impl Logger {
    /// Build a logger; the log directory is created on demand.
    pub fn new(path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let sink = match path.as_deref() {
            Some(file_path) => Some(Mutex::new(BufWriter::new(open_log(file_path)?))),
            None => None,
        };
        Ok(Self {
            sink,
            path,
            verbose,
        })
    }

    /// Logger with no file sink that only surfaces warnings and errors.
    pub fn stderr_only() -> Self {
        Self {
            sink: None,
            path: None,
            verbose: false,
        }
    }

    /// Open a file-backed logger, degrading to stderr when the sink cannot be
    /// opened. A broken log location never aborts a manifest run.
    pub fn open_or_stderr(path: PathBuf, verbose: bool) -> Self {
        match Self::new(Some(path), verbose) {
            Ok(logger) => logger,
            Err(err) => {
                let logger = Self {
                    sink: None,
                    path: None,
                    verbose,
                };
                logger.warn("LOGGER", format!("{err}; logging to stderr only"));
                logger
            }
        }
    }

    /// Emit a log entry with the given level, code, and message.
    pub fn log<S: AsRef<str>>(&self, level: LogLevel, code: &str, message: S) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let line = format_entry(&timestamp, level, code, message.as_ref());

        if self.verbose || level.always_visible() {
            eprintln!("{line}");
        }

        let Some(sink) = &self.sink else {
            return;
        };
        let Ok(mut writer) = sink.lock() else {
            return;
        };
        if writeln!(writer, "{line}").and_then(|_| writer.flush()).is_err() {
            eprintln!(
                "{}",
                format_entry(
                    &timestamp,
                    LogLevel::Error,
                    "LOGGER",
                    "Failed to write to log file"
                )
            );
        }
    }

    pub fn info<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Info, code, message);
    }

    pub fn warn<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Warn, code, message);
    }

    pub fn error<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Error, code, message);
    }

    pub fn debug<S: AsRef<str>>(&self, code: &str, message: S) {
        self.log(LogLevel::Debug, code, message);
    }

    /// Report a skipped unit. Entry-level mismatches are routine noise in a
    /// shared data directory and stay at debug level.
    pub fn skip(&self, reason: &SkipReason) {
        let level = match reason {
            SkipReason::NoMatch { .. } | SkipReason::NotADirectory { .. } => LogLevel::Debug,
            _ => LogLevel::Warn,
        };
        self.log(level, reason.code(), format!("Skipping: {reason}"));
    }

    /// Return the path backing this logger, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write a `<log>.hash` sidecar holding the SHA-256 of the session log.
    pub fn finalize(&self) -> Result<()> {
        let Some(path) = self.path() else {
            return Ok(());
        };
        let data = std::fs::read(path).map_err(|err| {
            RelinfoError::Filesystem(format!(
                "Failed to read log for hashing {}: {err}",
                path.display()
            ))
        })?;
        let digest = Sha256::digest(&data);

        let mut hash_os = path.as_os_str().to_os_string();
        hash_os.push(".hash");
        let hash_path = PathBuf::from(hash_os);
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        std::fs::write(&hash_path, format!("{digest:x}  {name}\n")).map_err(|err| {
            RelinfoError::Filesystem(format!(
                "Failed to write hash file {}: {err}",
                hash_path.display()
            ))
        })
    }

    /// Finalize the session log; a failed digest write is only a warning.
    pub fn seal(&self) {
        if let Err(err) = self.finalize() {
            self.warn("LOGGER", err.to_string());
        }
    }
}

fn open_log(file_path: &Path) -> Result<File> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| {
            RelinfoError::Filesystem(format!(
                "Failed to create log directory {}: {err}",
                parent.display()
            ))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(file_path)
        .map_err(|err| {
            RelinfoError::Filesystem(format!(
                "Failed to open log file {}: {err}",
                file_path.display()
            ))
        })
}

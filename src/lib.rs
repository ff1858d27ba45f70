/*============================================================
  Synavera Project: Rel-Info
  Module: relinfo_core
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Library surface of Rel-Info Core: discover release
    checkouts, correlate them with packaged artifacts, and
    build the download site's release manifest.

  Operational Scope:
    Consumed by the `relinfo` binary and integration tests.

  Revision History:
    2025-11-12 COD  Split library from binary entry point.
============================================================*/

pub mod assembler;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod logger;
pub mod manifest;
pub mod package_info;
pub mod resolver;
pub mod version;

pub use assembler::{collect_releases, ReleaseRecord};
pub use config::RelinfoConfig;
pub use error::{RelinfoError, Result, SkipReason};
pub use logger::Logger;
pub use manifest::{build_manifest, check_preconditions, write_manifest, ManifestDocument};

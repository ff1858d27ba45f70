//! End-to-end manifest runs over fixture trees.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use pretty_assertions::assert_eq;
use relinfo_core::config::{MacosConfig, RelinfoConfig, TemplateFamily};
use relinfo_core::{build_manifest, check_preconditions, write_manifest, Logger, RelinfoError};
use serde_json::Value;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn fixture_config(root: &Path) -> RelinfoConfig {
    RelinfoConfig {
        output_path: root.join("out").join("packages.json"),
        families: vec![
            TemplateFamily {
                name: "default".into(),
                dir: format!("{}/data/stableXY/moodle", root.display()),
                packagedir: format!("{}/extra/stableXY", root.display()),
                downloadweekly: Some("https://dl.example/stableXY/moodle-latest-XY.zip".into()),
                downloadrelease: Some("https://dl.example/stableXY/moodle-X.Y.Z.zip".into()),
            },
            TemplateFamily {
                name: "master".into(),
                dir: format!("{}/data/head/moodle", root.display()),
                packagedir: format!("{}/extra/moodle", root.display()),
                downloadweekly: Some("https://dl.example/moodle/moodle-latest.zip".into()),
                downloadrelease: None,
            },
        ],
        macos: MacosConfig {
            packages_dir: root.join("macosx"),
            catalog: "maccfg.toml".into(),
        },
        ..RelinfoConfig::default()
    }
}

fn stable_fixture() -> TempDir {
    let root = TempDir::new().unwrap();
    let base = root.path();
    write(
        &base.join("data/stable311/moodle/version.toml"),
        "version = 2021051705.00\nrelease = \"3.11.5 (Build: 20220117)\"\nbranch = \"311\"\n",
    );
    // No descriptor: skipped.
    fs::create_dir_all(base.join("data/stable310/moodle")).unwrap();
    write(&base.join("data/notes.txt"), "not a checkout");
    write(
        &base.join("extra/stable311/release_index_info.toml"),
        "version = \"3.11.5\"\nbranch = \"311\"\ngithash = \"9b2a7c\"\n",
    );
    write(&base.join("extra/stable311/moodle-3.11.5.zip"), "zipdata");
    write(&base.join("extra/stable311/moodle-3.11.5.zip.sha256"), "digest");
    fs::create_dir_all(base.join("out")).unwrap();
    root
}

#[test]
fn stable_release_is_assembled() {
    let root = stable_fixture();
    let config = fixture_config(root.path());
    let document = build_manifest(&config, &[], &Logger::stderr_only()).unwrap();

    assert_eq!(document.releases.len(), 1);
    let json = serde_json::to_value(&document).unwrap();
    let release = &json["releases"][0];
    assert_eq!(release["branch"], "3.11");
    assert_eq!(release["release"], "3.11.5 (Build: 20220117)");
    assert_eq!(release["maturity"], 200);
    assert_eq!(
        release["download"],
        "https://dl.example/stable311/moodle-3.11.5.zip"
    );
    assert_eq!(release["url"], "https://download.moodle.org");
    assert_eq!(release["release_index_info"]["githash"], "9b2a7c");
    assert_eq!(release["release_index_info"]["zip"]["sha256"], true);
    assert_eq!(release["release_index_info"]["zip"]["md5"], false);
    assert_eq!(release["release_index_info"]["zip"]["size"], 7);
    assert_eq!(release["release_index_info"]["tgz"]["size"], Value::Null);
    assert!(release["date"].is_i64());
    assert_eq!(release["date"], release["release_index_info"]["date"]);
    assert!(release.get("norelease_index_info").is_none());
    assert!(release.get("release_numbers").is_none());
    assert!(release.get("is_release").is_none());
    assert_eq!(release["windows"]["size"], Value::Null);
    assert_eq!(json["macospackages"], Value::Array(Vec::new()));
}

#[test]
fn branch_with_both_descriptors_prefers_release_date() {
    let root = TempDir::new().unwrap();
    let base = root.path();
    write(
        &base.join("data/stable311/moodle/version.toml"),
        "version = 2021051705.06\nrelease = \"3.11.5+ (Build: 20220204)\"\nbranch = \"311\"\n",
    );
    write(
        &base.join("extra/stable311/release_index_info.toml"),
        "version = \"3.11.5\"\nbranch = \"311\"\ngithash = \"9b2a7c\"\n",
    );
    write(
        &base.join("extra/stable311/norelease_index_info.toml"),
        "version = \"3.11.5+\"\nbranch = \"311\"\ngithash = \"c0ffee\"\n",
    );
    // Released archive absent on purpose; only the weekly one is on disk.
    write(&base.join("extra/stable311/moodle-latest-311.zip"), "weekly");
    write(&base.join("extra/windows/MoodleWindowsInstaller-latest-311.zip"), "wi");
    write(&base.join("extra/windows/MoodleWindowsInstaller-latest.zip"), "trunk");

    let config = fixture_config(base);
    let document = build_manifest(&config, &[], &Logger::stderr_only()).unwrap();
    assert_eq!(document.releases.len(), 1);

    let json = serde_json::to_value(&document.releases[0]).unwrap();
    assert_eq!(
        json["download"],
        "https://dl.example/stable311/moodle-latest-311.zip"
    );
    assert_eq!(json["norelease_index_info"]["zip"]["size"], 6);
    assert!(json["norelease_index_info"]["date"].is_i64());
    assert_eq!(json["release_index_info"]["githash"], "9b2a7c");
    assert_eq!(json["release_index_info"]["zip"]["size"], Value::Null);
    assert_eq!(json["release_index_info"]["date"], Value::Null);
    assert_eq!(json["date"], Value::Null);
    assert_eq!(json["windows"]["size"], 2);
}

#[test]
fn trunk_weekly_build_has_no_branch_suffix() {
    let root = TempDir::new().unwrap();
    let base = root.path();
    write(
        &base.join("data/head/moodle/version.toml"),
        "version = 2023100900\nrelease = \"4.4dev (Build: 20231009)\"\nmaturity = \"alpha\"\n",
    );
    write(
        &base.join("extra/moodle/norelease_index_info.toml"),
        "version = \"4.4dev\"\nbranch = \"master\"\ngithash = \"f00d\"\n",
    );
    write(&base.join("extra/moodle/moodle-latest.zip"), "abc");
    write(&base.join("extra/moodle/moodle-latest.tgz"), "abcd");
    write(&base.join("extra/moodle/moodle-latest.tgz.md5"), "x");
    write(&base.join("extra/windows/MoodleWindowsInstaller-latest.zip"), "12345");

    let config = fixture_config(base);
    let document = build_manifest(&config, &[], &Logger::stderr_only()).unwrap();
    assert_eq!(document.releases.len(), 1);

    let json = serde_json::to_value(&document.releases[0]).unwrap();
    assert_eq!(json["branch"], "4.4");
    assert_eq!(json["maturity"], 50);
    assert_eq!(json["download"], "https://dl.example/moodle/moodle-latest.zip");
    assert_eq!(json["norelease_index_info"]["branch"], "master");
    assert_eq!(json["norelease_index_info"]["zip"]["size"], 3);
    assert_eq!(json["norelease_index_info"]["tgz"]["size"], 4);
    assert_eq!(json["norelease_index_info"]["tgz"]["md5"], true);
    assert_eq!(json["windows"]["size"], 5);
    assert_eq!(json["date"], json["norelease_index_info"]["date"]);
}

#[test]
fn trunk_release_without_release_template_is_skipped() {
    let root = TempDir::new().unwrap();
    let base = root.path();
    write(
        &base.join("data/head/moodle/version.toml"),
        "version = 2024042200\nrelease = \"4.4 (Build: 20240422)\"\n",
    );
    let config = fixture_config(base);
    let document = build_manifest(&config, &[], &Logger::stderr_only()).unwrap();
    assert!(document.releases.is_empty());
}

#[test]
fn family_filter_limits_scan() {
    let root = stable_fixture();
    let config = fixture_config(root.path());
    let document =
        build_manifest(&config, &["master".to_string()], &Logger::stderr_only()).unwrap();
    assert!(document.releases.is_empty());
}

#[test]
fn unchanged_tree_yields_identical_manifests() {
    let root = stable_fixture();
    write(
        &root.path().join("data/stable400/moodle/version.toml"),
        "version = 2022041900\nrelease = \"4.0+ (Build: 20220601)\"\nbranch = \"400\"\n",
    );
    let config = fixture_config(root.path());
    let output = config.manifest_path();

    let mut first = build_manifest(&config, &[], &Logger::stderr_only()).unwrap();
    first.timestamp = 0;
    write_manifest(&first, &output, false).unwrap();
    let first_bytes = fs::read(&output).unwrap();

    let mut second = build_manifest(&config, &[], &Logger::stderr_only()).unwrap();
    second.timestamp = 0;
    write_manifest(&second, &output, false).unwrap();

    assert_eq!(second.releases.len(), 2);
    assert_eq!(first_bytes, fs::read(&output).unwrap());
}

#[test]
fn missing_output_directory_aborts_before_writing() {
    let root = stable_fixture();
    let mut config = fixture_config(root.path());
    config.output_path = root.path().join("missing").join("packages.json");

    let err = check_preconditions(&config, &config.manifest_path()).unwrap_err();
    assert!(matches!(err, RelinfoError::Precondition(_)));
    assert_ne!(err.exit_code(), std::process::ExitCode::SUCCESS);
    assert!(!root.path().join("missing").exists());
}

#[test]
fn mac_catalog_is_projected() {
    let root = stable_fixture();
    write(
        &root.path().join("macosx/maccfg.toml"),
        "[[versions]]\nname = \"Moodle 3.11\"\ngit = \"MOODLE_311_STABLE\"\ndesc = \"Stable\"\nmamp = \"Moodle4Mac-311.dmg\"\nage = 1\n",
    );
    write(&root.path().join("macosx/Moodle4Mac-311.dmg"), "dmg");

    let config = fixture_config(root.path());
    let document = build_manifest(&config, &[], &Logger::stderr_only()).unwrap();
    let json = serde_json::to_value(&document).unwrap();
    assert_eq!(json["macospackages"][0]["name"], "Moodle 3.11");
    assert_eq!(json["macospackages"][0]["age"], 1);
    assert_eq!(json["macospackages"][0]["size"], 3);
}

fn running_as_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

fn set_mode(path: &Path, mode: u32) {
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
}

#[test]
fn read_only_output_directory_is_fatal() {
    if running_as_root() {
        return;
    }
    let root = stable_fixture();
    let config = fixture_config(root.path());
    let out = root.path().join("out");
    set_mode(&out, 0o500);

    let result = check_preconditions(&config, &config.manifest_path());
    set_mode(&out, 0o755);
    assert!(matches!(result, Err(RelinfoError::Precondition(_))));
    assert!(!config.manifest_path().exists());
}

#[test]
fn read_only_existing_manifest_is_fatal() {
    if running_as_root() {
        return;
    }
    let root = stable_fixture();
    let config = fixture_config(root.path());
    let output = config.manifest_path();
    fs::write(&output, "previous manifest").unwrap();
    set_mode(&output, 0o400);

    let result = check_preconditions(&config, &output);
    assert!(matches!(result, Err(RelinfoError::Precondition(_))));
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous manifest");
}

#[test]
fn unreadable_mac_catalog_is_fatal() {
    if running_as_root() {
        return;
    }
    let root = stable_fixture();
    let config = fixture_config(root.path());
    let catalog = config.macos.catalog_path();
    write(&catalog, "[[versions]]\n");
    set_mode(&catalog, 0o000);

    let result = check_preconditions(&config, &config.manifest_path());
    set_mode(&catalog, 0o644);
    assert!(matches!(result, Err(RelinfoError::Precondition(_))));
    assert!(!config.manifest_path().exists());
}

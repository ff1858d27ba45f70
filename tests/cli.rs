//! Runs the `relinfo` binary against fixture trees.

use std::fs;
use std::path::Path;
use std::process::Command;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn fixture() -> TempDir {
    let root = TempDir::new().unwrap();
    let base = root.path();
    write(
        &base.join("data/stable311/moodle/version.toml"),
        "version = 2021051705.00\nrelease = \"3.11.5 (Build: 20220117)\"\nbranch = \"311\"\n",
    );
    fs::create_dir_all(base.join("out")).unwrap();
    let config = format!(
        r#"output_path = "{base}/out/packages.json"

[macos]
packages_dir = "{base}/macosx"

[[families]]
name = "default"
dir = "{base}/data/stableXY/moodle"
packagedir = "{base}/extra/stableXY"
downloadrelease = "https://dl.example/stableXY/moodle-X.Y.Z.zip"
"#,
        base = base.display()
    );
    write(&base.join("config.toml"), &config);
    root
}

#[test]
fn unusable_log_location_still_writes_manifest() {
    let root = fixture();
    let base = root.path();
    // A regular file where the log directory would have to be created.
    write(&base.join("blocker"), "not a directory");

    let output = Command::new(env!("CARGO_BIN_EXE_relinfo"))
        .arg("--config")
        .arg(base.join("config.toml"))
        .arg("--log")
        .arg(base.join("blocker").join("run.log"))
        .output()
        .unwrap();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {stderr}");
    assert!(stderr.contains("[LOGGER]"), "stderr: {stderr}");

    let manifest: serde_json::Value =
        serde_json::from_slice(&fs::read(base.join("out/packages.json")).unwrap()).unwrap();
    assert_eq!(manifest["releases"][0]["branch"], "3.11");
}

#[test]
fn missing_output_directory_exits_non_zero() {
    let root = fixture();
    let base = root.path();

    let output = Command::new(env!("CARGO_BIN_EXE_relinfo"))
        .arg("--config")
        .arg(base.join("config.toml"))
        .arg("--log")
        .arg(base.join("logs").join("run.log"))
        .arg("--output")
        .arg(base.join("absent").join("packages.json"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(21));
    assert!(!base.join("absent").exists());
}

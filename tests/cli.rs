use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const STATS: &str = r#"{
  "hash": "9a8b7c",
  "outputPath": "/build/dist",
  "chunks": [
    {"id": 0, "names": ["vendor"], "parents": [], "files": ["vendor.js", "vendor.js.map"]},
    {"id": 1, "names": ["main"], "parents": [0], "files": ["main.js", "main.css"]}
  ],
  "assets": [
    {"name": "vendor.js"},
    {"name": "vendor.js.map"},
    {"name": "main.js"},
    {"name": "main.css"}
  ]
}"#;

fn emit_build(root: &Path) {
  let dist = root.join("dist");
  fs::create_dir_all(&dist).unwrap();
  fs::write(dist.join("vendor.js"), "__webpack_require__.p = \"\";").unwrap();
  fs::write(dist.join("vendor.js.map"), "{}").unwrap();
  fs::write(dist.join("main.js"), "__webpack_require__.p = \"\";").unwrap();
  fs::write(dist.join("main.css"), "body{}").unwrap();
  fs::write(root.join("stats.json"), STATS).unwrap();
}

#[test]
fn writes_manifest_patches_scripts_and_emits_boot_bundle() {
  let temp = tempdir().unwrap();
  emit_build(temp.path());

  Command::cargo_bin("dynamic-public-path")
    .unwrap()
    .current_dir(temp.path())
    .args([
      "--stats",
      "stats.json",
      "--output-path",
      "dist",
      "--global",
      "DynamicApp",
      "--library",
      "MainApp",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("manifest:"))
    .stdout(predicate::str::contains("patched: 2 script(s), 0 without placeholder"));

  let dist = temp.path().join("dist");
  let manifest: serde_json::Value =
    serde_json::from_str(&fs::read_to_string(dist.join("assets-graph.json")).unwrap()).unwrap();
  assert_eq!(
    manifest,
    serde_json::json!({
      "hash": "9a8b7c",
      "path": "/build/dist",
      "assets": {
        "vendor": {"js": ["vendor.js"]},
        "main": {"js": ["vendor.js", "main.js"], "css": ["main.css"]}
      }
    })
  );

  let main = fs::read_to_string(dist.join("main.js")).unwrap();
  assert_eq!(
    main,
    "__webpack_require__.p = DynamicApp.default.__options.publicPath;"
  );
  assert_eq!(fs::read_to_string(dist.join("vendor.js.map")).unwrap(), "{}");

  let boot = fs::read_to_string(dist.join("boot.js")).unwrap();
  assert!(boot.contains("var libModuleName = \"MainApp\";"));
}

#[test]
fn options_file_supplies_defaults_and_flags_override_it() {
  let temp = tempdir().unwrap();
  emit_build(temp.path());
  fs::write(
    temp.path().join("dynamic-public-path.json"),
    r#"{"outputPath": "dist", "global": "FromFile", "bootfilename": "loader.js"}"#,
  )
  .unwrap();

  Command::cargo_bin("dynamic-public-path")
    .unwrap()
    .current_dir(temp.path())
    .args(["--stats", "stats.json", "--global", "FromFlag", "--quiet"])
    .assert()
    .success();

  let dist = temp.path().join("dist");
  assert!(dist.join("loader.js").exists());
  let main = fs::read_to_string(dist.join("main.js")).unwrap();
  assert!(main.contains("FromFlag.default.__options.publicPath"));
}

#[test]
fn missing_global_fails_before_touching_output() {
  let temp = tempdir().unwrap();
  emit_build(temp.path());

  Command::cargo_bin("dynamic-public-path")
    .unwrap()
    .current_dir(temp.path())
    .args(["--stats", "stats.json", "--output-path", "dist"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing global option"));

  assert!(!temp.path().join("dist/assets-graph.json").exists());
  assert_eq!(
    fs::read_to_string(temp.path().join("dist/main.js")).unwrap(),
    "__webpack_require__.p = \"\";"
  );
}

#[test]
fn unreadable_stats_exit_non_zero() {
  let temp = tempdir().unwrap();
  fs::create_dir_all(temp.path().join("dist")).unwrap();

  Command::cargo_bin("dynamic-public-path")
    .unwrap()
    .current_dir(temp.path())
    .args(["--stats", "missing.json", "--output-path", "dist", "--global", "App"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("missing.json"));
}

use assert_cmd::prelude::*;
use assert_fs::TempDir;
use assert_fs::fixture::*;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

const MANIFEST: &str = r#"
ignore:
  - "*.tmp"
collections:
  daily:
    items:
      - "{{home}}/data/*.txt"
      - "{{home}}/data/*.tmp"
    target: "{{home}}/backups"
    compress: gz
  broken:
    items: ["{{home}}/data/*"]
    compress: gz
"#;

fn setup() -> Result<TempDir, Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    temp.child("data/a.txt").write_str("alpha")?;
    temp.child("data/b.txt").write_str("beta")?;
    temp.child("data/c.tmp").write_str("scratch")?;
    temp.child("manifest.yml").write_str(MANIFEST)?;
    Ok(temp)
}

fn colbak(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("colbak"));
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn archives(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => vec![],
    }
}

#[test]
fn run_creates_archive() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup()?;

    colbak(temp.path())
        .arg("--manifest")
        .arg(temp.child("manifest.yml").path())
        .arg("daily")
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing collection daily"))
        .stdout(predicate::str::contains("2 files resolved, 2 added, 1 ignored."))
        .stdout(predicate::str::contains("Done"));

    let created = archives(&temp.path().join("backups/daily"));
    assert_eq!(created.len(), 1);
    let name = created[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("daily-"));
    assert!(name.ends_with(".tar.gz"));
    Ok(())
}

#[test]
fn default_manifest_in_home() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup()?;
    temp.child(".colbak.yml").write_str(MANIFEST)?;

    colbak(temp.path())
        .arg("-q")
        .arg("daily")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert_eq!(archives(&temp.path().join("backups/daily")).len(), 1);
    Ok(())
}

#[test]
fn verbose_and_debug_output() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup()?;

    colbak(temp.path())
        .arg("--manifest")
        .arg(temp.child("manifest.yml").path())
        .arg("--verbose")
        .arg("--debug")
        .arg("daily")
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive file is"))
        .stdout(predicate::str::contains("Adding"))
        .stdout(predicate::str::contains("a.txt"))
        .stdout(predicate::str::contains("Ignoring"))
        .stdout(predicate::str::contains("Archived").not());
    Ok(())
}

#[test]
fn manifest_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;

    colbak(temp.path())
        .arg("--manifest")
        .arg(temp.child("missing.yml").path())
        .arg("daily")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Manifest file does not exist"));
    Ok(())
}

#[test]
fn malformed_manifest() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    temp.child("bad.yml").write_str("collections: [unclosed")?;

    colbak(temp.path())
        .arg("--manifest")
        .arg(temp.child("bad.yml").path())
        .arg("daily")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid manifest"));
    Ok(())
}

#[test]
fn unknown_collection_aborts_before_any_archive() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup()?;

    colbak(temp.path())
        .arg("--manifest")
        .arg(temp.child("manifest.yml").path())
        .arg("daily")
        .arg("weekly")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown collection weekly"));
    assert!(archives(&temp.path().join("backups/daily")).is_empty());
    Ok(())
}

#[test]
fn invalid_collection() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup()?;

    colbak(temp.path())
        .arg("--manifest")
        .arg(temp.child("manifest.yml").path())
        .arg("broken")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("collection broken has no target"));
    Ok(())
}

#[test]
fn collection_argument_is_required() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    colbak(temp.path()).assert().failure().code(2);
    Ok(())
}

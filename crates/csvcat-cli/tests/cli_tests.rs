// CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn csvcat() -> Command {
    Command::cargo_bin("csvcat").unwrap()
}

fn create_plates(dir: &TempDir) -> std::io::Result<()> {
    let root = dir.path().join("in");
    fs::create_dir_all(root.join("a"))?;
    fs::create_dir_all(root.join("b"))?;
    fs::write(root.join("a/plate1.csv"), "id,val\n1,10\n2,20\n")?;
    fs::write(root.join("b/plate1.csv"), "id,val\n3,30\n")?;
    fs::write(root.join("b/wells.csv"), "well\nA01\n")?;
    fs::create_dir_all(dir.path().join("out"))?;
    Ok(())
}

#[test]
fn test_concat_writes_outputs() {
    let dir = TempDir::new().unwrap();
    create_plates(&dir).unwrap();

    csvcat()
        .args(["concat", "--input"])
        .arg(dir.path().join("in"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("into 2 outputs"))
        .stderr(predicate::str::contains("Processing plate1.csv"));

    let merged = fs::read_to_string(dir.path().join("out/plate1_concat.csv")).unwrap();
    assert_eq!(merged, "id,val\n1,10\n2,20\n3,30\n");
    assert!(dir.path().join("out/wells_concat.csv").exists());
}

#[test]
fn test_concat_json_report() {
    let dir = TempDir::new().unwrap();
    create_plates(&dir).unwrap();

    let output = csvcat()
        .args(["concat", "--json", "--input"])
        .arg(dir.path().join("in"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["files_scanned"], 3);
    assert_eq!(report["artifacts"].as_array().unwrap().len(), 2);
}

#[test]
fn test_concat_missing_input_fails() {
    let dir = TempDir::new().unwrap();

    csvcat()
        .args(["concat", "--input"])
        .arg(dir.path().join("absent"))
        .arg("--output")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_scan_lists_groups() {
    let dir = TempDir::new().unwrap();
    create_plates(&dir).unwrap();

    csvcat()
        .args(["scan", "--members", "--input"])
        .arg(dir.path().join("in"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 files in 2 groups"))
        .stdout(predicate::str::contains("plate1.csv (2 files) -> plate1_concat.csv"));
}

#[test]
fn test_scan_lists_earlier_outputs() {
    let dir = TempDir::new().unwrap();
    create_plates(&dir).unwrap();
    fs::write(dir.path().join("in/plate1_concat.csv"), "id,val\n1,10\n").unwrap();

    csvcat()
        .args(["scan", "--input"])
        .arg(dir.path().join("in"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 4 files in 3 groups"))
        .stdout(predicate::str::contains("plate1_concat.csv (1 files)"));
}

#[test]
fn test_estimate() {
    csvcat()
        .args(["estimate", "--images-per-batch", "30", "--minutes-per-image", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Walltime 30*4 = 120 min"));

    csvcat()
        .args(["estimate", "--cpus", "11"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cpus_per_node must be between 1 and 10"));
}

#[test]
fn test_init_config_then_use_it() {
    let dir = TempDir::new().unwrap();
    create_plates(&dir).unwrap();
    let config = dir.path().join("csvcat.json");

    csvcat()
        .args(["init-config", "--output"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    csvcat()
        .args(["concat", "--index", "--config"])
        .arg(&config)
        .arg("--input")
        .arg(dir.path().join("in"))
        .arg("--output")
        .arg(dir.path().join("out"))
        .assert()
        .success();

    let merged = fs::read_to_string(dir.path().join("out/plate1_concat.csv")).unwrap();
    assert!(merged.starts_with(",id,val\n0,1,10\n"));
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Integration tests for the cablemap CLI commands

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Run cablemap with the given arguments against a scratch data directory
fn cablemap(data_dir: &TempDir, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("cablemap").expect("binary builds");
    cmd.env("CABLEMAP_DATA_DIR", data_dir.path()).args(args);
    cmd
}

#[test]
fn test_device_lifecycle() {
    let data_dir = TempDir::new().unwrap();

    cablemap(&data_dir, &["device", "add", "CORE-SW", "--device-type", "Switch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1"));

    cablemap(&data_dir, &["device", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CORE-SW"))
        // casefolding applies on entry
        .stdout(predicate::str::contains("switch"));

    cablemap(&data_dir, &["device", "rm", "1"]).assert().success();

    cablemap(&data_dir, &["device", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CORE-SW").not());
}

#[test]
fn test_connection_requires_a_destination() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["device", "add", "SW1"]).assert().success();

    cablemap(&data_dir, &["conn", "add", "--from", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("destination"));

    cablemap(
        &data_dir,
        &["conn", "add", "--from", "1", "--external", "ISP", "--conn-type", "wan"],
    )
    .assert()
    .success()
    .stdout(predicate::str::contains("conn:"));
}

#[test]
fn test_conn_add_rejects_ambiguous_destination() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["device", "add", "SW1"]).assert().success();
    cablemap(&data_dir, &["device", "add", "SW2"]).assert().success();

    cablemap(
        &data_dir,
        &["conn", "add", "--from", "1", "--to", "2", "--external", "Z1"],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("viaLabel"));
}

#[test]
fn test_device_rm_refuses_referenced_device_without_cascade() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["device", "add", "SW1"]).assert().success();
    cablemap(&data_dir, &["device", "add", "SW2"]).assert().success();
    cablemap(&data_dir, &["conn", "add", "--from", "1", "--to", "2"])
        .assert()
        .success();

    cablemap(&data_dir, &["device", "rm", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("referenced"));

    cablemap(&data_dir, &["device", "rm", "2", "--cascade"])
        .assert()
        .success();

    cablemap(&data_dir, &["conn", "list"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No connections"));
}

#[test]
fn test_validate_flags_dangling_connection() {
    let data_dir = TempDir::new().unwrap();
    // seed a broken document directly; load never refuses data-level problems
    std::fs::create_dir_all(data_dir.path()).unwrap();
    std::fs::write(
        data_dir.path().join("network.json"),
        r#"{"devices": [{"id": 1, "name": "SW1", "type": "switch",
                          "status": "active", "location": "Lab",
                          "addresses": [{"ip": "10.0.0.1", "network": "lan", "vlan": ""}],
                          "ports": []}],
            "connections": [{"id": "bad", "from": 1, "to": null,
                             "externalDest": "", "type": "lan",
                             "status": "active"}]}"#,
    )
    .unwrap();

    cablemap(&data_dir, &["validate"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("critical"))
        .stdout(predicate::str::contains("bad"));
}

#[test]
fn test_validate_json_report_shape() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["validate", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"critical\""))
        .stdout(predicate::str::contains("\"warning\""))
        .stdout(predicate::str::contains("\"deprecated\""));
}

#[test]
fn test_endpoints_groups_external_connections() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["device", "add", "SW1"]).assert().success();
    cablemap(&data_dir, &["device", "add", "SW2"]).assert().success();
    for from in ["1", "2"] {
        cablemap(
            &data_dir,
            &["conn", "add", "--from", from, "--external", "Z4", "--wall-jack"],
        )
        .assert()
        .success();
    }

    cablemap(&data_dir, &["endpoints"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Z4"))
        .stdout(predicate::str::contains("2 connection(s)"));
}

#[test]
fn test_export_then_import_round_trip() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["device", "add", "SW1", "--device-type", "switch", "--location", "Lab"])
        .assert()
        .success();
    cablemap(&data_dir, &["conn", "add", "--from", "1", "--external", "ISP", "--conn-type", "wan"])
        .assert()
        .success();

    let export_path = data_dir.path().join("out.json");
    cablemap(
        &data_dir,
        &["export", "--format", "json", "--output", export_path.to_str().unwrap()],
    )
    .assert()
    .success();

    let exported = std::fs::read_to_string(&export_path).unwrap();
    assert!(exported.contains("__checksum"));
    assert!(exported.contains("SHA-256"));

    // import into a fresh store; warnings are expected for the sparse device
    let other_dir = TempDir::new().unwrap();
    cablemap(
        &other_dir,
        &["import", export_path.to_str().unwrap(), "--force"],
    )
    .assert()
    .success();

    cablemap(&other_dir, &["device", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SW1"));
}

#[test]
fn test_import_rejects_tampered_file() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["device", "add", "SW1"]).assert().success();

    let export_path = data_dir.path().join("out.json");
    cablemap(
        &data_dir,
        &["export", "--format", "json", "--output", export_path.to_str().unwrap()],
    )
    .assert()
    .success();

    // flip a byte of content after export
    let tampered = std::fs::read_to_string(&export_path)
        .unwrap()
        .replace("SW1", "HAX");
    std::fs::write(&export_path, tampered).unwrap();

    cablemap(
        &data_dir,
        &["import", export_path.to_str().unwrap(), "--force"],
    )
    .assert()
    .failure()
    .stderr(predicate::str::contains("Checksum mismatch"));
}

#[test]
fn test_export_dot_draws_the_topology() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["device", "add", "SW1"]).assert().success();
    cablemap(&data_dir, &["device", "add", "SW2"]).assert().success();
    cablemap(&data_dir, &["conn", "add", "--from", "1", "--to", "2"])
        .assert()
        .success();

    cablemap(&data_dir, &["export", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::contains("digraph network"))
        .stdout(predicate::str::contains("device:1"))
        .stdout(predicate::str::contains("->"));
}

#[test]
fn test_location_and_site_management() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["location", "add-site", "HQ", "--default"])
        .assert()
        .success();
    cablemap(&data_dir, &["location", "add", "SR", "--name", "Server Room"])
        .assert()
        .success();

    cablemap(&data_dir, &["location", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("HQ"))
        .stdout(predicate::str::contains("Server Room"));

    // duplicate codes are refused
    cablemap(&data_dir, &["location", "add", "SR", "--name", "Other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_backup_file_appears_on_second_write() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["device", "add", "SW1"]).assert().success();
    assert!(!data_dir.path().join("network.json.bak").exists());

    cablemap(&data_dir, &["device", "add", "SW2"]).assert().success();
    assert!(data_dir.path().join("network.json.bak").exists());
}

#[test]
fn test_completions_generate_for_bash() {
    let data_dir = TempDir::new().unwrap();
    cablemap(&data_dir, &["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cablemap"));
}

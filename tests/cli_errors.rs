#![cfg(feature = "cli")]

use predicates::prelude::*;

fn sample_input() -> serde_json::Value {
    serde_json::json!({
        "par1": 2300.0,
        "par2": 2000.0,
        "par1_type": "alkalinity",
        "par2_type": "dic",
        "totals": {
            "tb": 416.0,
            "tpo4": 1.0,
            "tsi": 5.0,
            "tso4": 28240.0,
            "tf": 68.0
        },
        "k_constants": {
            "k0": 0.02839,
            "k1": 1.42e-6,
            "k2": 1.12e-9,
            "kb": 2.53e-9,
            "kw": 6.0e-14,
            "kp1": 0.0244,
            "kp2": 1.08e-6,
            "kp3": 1.62e-9,
            "ksi": 4.1e-10,
            "kso4": 0.102,
            "kf": 2.4e-3
        }
    })
}

#[test]
fn cli_fails_without_any_input() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("carbonate_rs");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing input data"));
}

#[test]
fn cli_works_without_options_with_inputs_json() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("carbonate_rs");
    cmd.arg("--json")
        .arg("--inputs-json")
        .arg(sample_input().to_string());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"ph\""))
        .stdout(predicate::str::contains("8.03"));
}

#[test]
fn cli_reads_document_with_options_from_stdin() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("carbonate_rs");

    let mut doc = sample_input();
    doc["options"] = serde_json::json!({ "alkalinity_model": "scale_corrected" });

    cmd.arg("--json")
        .arg("--components")
        .arg("--input")
        .arg("-")
        .write_stdin(doc.to_string());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"components\""))
        .stdout(predicate::str::contains("\"borate\""));
}

#[test]
fn cli_prints_text_report_by_default() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("carbonate_rs");
    cmd.arg("--inputs-json").arg(sample_input().to_string());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pH: 8.03"))
        .stdout(predicate::str::contains("DIC: 2000.00 umol/kg"));
}

#[test]
fn cli_warns_on_impossible_pair_and_still_succeeds() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("carbonate_rs");
    let mut doc = sample_input();
    doc["par1"] = serde_json::json!(100.0);
    doc["par2"] = serde_json::json!(4000.0);
    doc["par1_type"] = serde_json::json!("dic");
    doc["par2_type"] = serde_json::json!("fco2");
    cmd.arg("--json").arg("--inputs-json").arg(doc.to_string());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("null"))
        .stderr(predicate::str::contains("impossibly high"));
}

#[test]
fn cli_rejects_same_kind_pair() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("carbonate_rs");
    let mut doc = sample_input();
    doc["par2_type"] = serde_json::json!("alkalinity");
    cmd.arg("--inputs-json").arg(doc.to_string());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported input pair"));
}

#[test]
fn cli_reports_length_mismatch() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("carbonate_rs");
    let mut doc = sample_input();
    doc["par1"] = serde_json::json!([2300.0, 2250.0, 2200.0]);
    doc["par2"] = serde_json::json!([2000.0, 1950.0]);
    cmd.arg("--inputs-json").arg(doc.to_string());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Length mismatch for 'par2'"));
}

#[test]
fn cli_reports_invalid_json_for_inputs_json() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("carbonate_rs");
    cmd.arg("--inputs-json").arg("{not valid json}");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON for --inputs-json"));
}

#[test]
fn cli_reports_invalid_json_for_options_json() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("carbonate_rs");
    cmd.arg("--inputs-json")
        .arg(sample_input().to_string())
        .arg("--options-json")
        .arg("{\"alkalinity_model\": \"nope\"}");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON for --options-json"));
}

#[test]
fn cli_reports_invalid_json_in_file() {
    use std::fs::File;
    use std::io::Write as _;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let file_path = dir.path().join("bad.json");
    let mut f = File::create(&file_path).unwrap();
    writeln!(f, "this is not json").unwrap();

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("carbonate_rs");
    cmd.arg("--input").arg(file_path);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid JSON in input document"));
}

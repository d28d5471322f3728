//! End-to-end tests of the hpxconf binary.

use super::test_utils::{fixture_root, write_tree};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Run hpxconf in an isolated environment against the fixture configs.
fn hpxconf(temp: &TempDir, args: &[&str]) -> Output {
    let workspace = temp.path().join("ws");
    let config_home = temp.path().join("config");
    std::fs::create_dir_all(&workspace).unwrap();
    std::fs::create_dir_all(&config_home).unwrap();

    let bin = env!("CARGO_BIN_EXE_hpxconf");
    Command::new(bin)
        .env("XDG_CONFIG_HOME", config_home.as_os_str())
        .env("HOME", temp.path().as_os_str())
        .env_remove("HPXCONF_LOG")
        .env_remove("HPXCONF_CONFIG_DIR")
        .env_remove("HPXCONF_OUTPUT_FORMAT")
        .arg("--workspace")
        .arg(&workspace)
        .arg("--config-dir")
        .arg(fixture_root())
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_resolve_prints_yaml() {
    let temp = TempDir::new().unwrap();
    let output = hpxconf(&temp, &["resolve", "data/era5_hpx32_8var_coupled"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));

    let text = stdout(&output);
    let parsed: serde_yaml::Value = serde_yaml::from_str(&text).unwrap();
    assert_eq!(parsed["cube_dim"], serde_yaml::Value::from(32));
    assert_eq!(parsed["input_variables"][1], serde_yaml::Value::from("tau300-700"));
    assert!(parsed["output_variables"].is_null());
}

#[test]
fn test_resolve_json_with_overrides() {
    let temp = TempDir::new().unwrap();
    let output = hpxconf(
        &temp,
        &[
            "resolve",
            "data/era5_hpx32_8var_coupled",
            "nside=64",
            "++experiment=smoke",
            "--format",
            "json",
        ],
    );
    assert!(output.status.success(), "stderr={}", stderr(&output));

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["cube_dim"], 64);
    assert_eq!(parsed["experiment"], "smoke");
}

#[test]
fn test_resolve_raw_keeps_expressions() {
    let temp = TempDir::new().unwrap();
    let output = hpxconf(
        &temp,
        &["resolve", "data/era5_hpx32_8var_coupled", "--raw", "--format", "flat"],
    );
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).lines().any(|l| l == "cube_dim=${data.nside}"));
}

#[test]
fn test_get_single_value() {
    let temp = TempDir::new().unwrap();
    let output = hpxconf(&temp, &["get", "data/era5_hpx32_8var_coupled", "data.cube_dim"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "32");

    let output = hpxconf(&temp, &["get", "data/era5_hpx32_sst_coupled", "input_variables"]);
    assert_eq!(stdout(&output).trim(), "- sst");
}

#[test]
fn test_get_with_package_qualified_override() {
    let temp = TempDir::new().unwrap();
    let output = hpxconf(
        &temp,
        &["get", "data/era5_hpx32_8var_coupled", "cube_dim", "data.nside=64"],
    );
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "64");
}

#[test]
fn test_get_missing_key_fails() {
    let temp = TempDir::new().unwrap();
    let output = hpxconf(&temp, &["get", "data/era5_hpx32_8var_coupled", "no_such_key"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("no_such_key"));
}

#[test]
fn test_missing_document_fails_with_hint() {
    let temp = TempDir::new().unwrap();
    let output = hpxconf(&temp, &["resolve", "data/era5_hpx64"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("data/era5_hpx64"), "stderr={}", err);
    assert!(err.contains("hpxconf list"), "stderr={}", err);
}

#[test]
fn test_list_json() {
    let temp = TempDir::new().unwrap();
    let output = hpxconf(&temp, &["list", "data/module", "--format", "json"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let names: Vec<&str> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "data/module/atmos_ConstantCoupling",
            "data/module/ocean_TrailingAverageCoupling"
        ]
    );
}

#[test]
fn test_list_table() {
    let temp = TempDir::new().unwrap();
    let output = hpxconf(&temp, &["list"]);
    assert!(output.status.success(), "stderr={}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("era5_hpx32_8var_coupled"));
    assert!(text.contains("data/scaling"));
}

#[test]
fn test_check_named_documents() {
    let temp = TempDir::new().unwrap();
    let output = hpxconf(
        &temp,
        &[
            "check",
            "config",
            "data/era5_hpx32_8var_coupled",
            "data/era5_hpx32_sst_coupled",
        ],
    );
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert!(stdout(&output).contains("3 checked, 0 failed"));
}

#[test]
fn test_check_reports_unresolvable_documents() {
    // Module documents only resolve when mounted under a dataset.
    let temp = TempDir::new().unwrap();
    let output = hpxconf(&temp, &["check", "--group", "data/module"]);
    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.contains("2 checked, 2 failed"), "stdout={}", text);
    assert!(text.contains("data.src_directory"));
}

#[test]
fn test_workspace_settings_select_config_dir() {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("ws");
    write_tree(
        &workspace,
        &[
            ("hpxconf.toml", "config_dir = \"configs\"\noutput_format = \"flat\"\n"),
            ("configs/data/tiny.yaml", "nside: 8\ncube_dim: ${data.nside}\n"),
        ],
    );

    let output = Command::new(env!("CARGO_BIN_EXE_hpxconf"))
        .env("XDG_CONFIG_HOME", temp.path().join("config").as_os_str())
        .env("HOME", temp.path().as_os_str())
        .env_remove("HPXCONF_CONFIG_DIR")
        .env_remove("HPXCONF_OUTPUT_FORMAT")
        .current_dir(Path::new(&workspace))
        .args(["resolve", "data/tiny"])
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr={}", stderr(&output));
    assert_eq!(stdout(&output).trim(), "nside=8\ncube_dim=8");
}

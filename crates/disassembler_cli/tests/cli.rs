use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::Value;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_path(name: &str) -> String {
    workspace_root()
        .join("tests/fixtures")
        .join(name)
        .to_string_lossy()
        .to_string()
}

fn run_cli(args: &[&str]) -> Output {
    let data = fixture_path("robot_data.json");
    let plugins = fixture_path("plugins");
    Command::new(env!("CARGO_BIN_EXE_automatron-disassembler"))
        .env_remove("AUTOMATRON_REQUIRED_PLUGIN")
        .args(["--plugin-dir", &plugins, &data])
        .args(args)
        .output()
        .expect("failed to run automatron-disassembler CLI")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(ToOwned::to_owned)
        .collect()
}

#[test]
fn resolve_prints_matched_loose_item() {
    let output = run_cli(&["resolve", "01000801"]);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["01000A00 Assaultron Torso - Rusty"]);
}

#[test]
fn resolve_unknown_mod_prints_none() {
    let output = run_cli(&["resolve", "0x01000803", "--index", "1"]);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["none"]);

    let output = run_cli(&["resolve", "01000803", "--json"]);
    assert!(output.status.success());
    let json: Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert!(json.is_null());
}

#[test]
fn resolve_all_json_walks_index_tables() {
    let output = run_cli(&[
        "resolve-all",
        "01000802",
        "none",
        "01000802",
        "01000802",
        "--json",
    ]);
    assert!(output.status.success());

    let json: Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    let ids: Vec<&str> = json
        .as_array()
        .expect("result should be an array")
        .iter()
        .map(|item| item["form_id"].as_str().expect("form_id should be a string"))
        .collect();
    assert_eq!(ids, vec!["01000A00", "02000012", "01000A01"]);
}

#[test]
fn table_json_reports_load() {
    let output = run_cli(&["table", "--json"]);
    assert!(output.status.success());

    let json: Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON");
    assert_eq!(json["report"]["required_plugin_loaded"], true);
    assert_eq!(json["report"]["matched"], 1);
    assert_eq!(json["default"]["0200005A"]["name"], "Custom Arm Plating");
    assert_eq!(json["index2"]["01000802"]["form_id"], "01000A01");
    assert_eq!(json["native"]["01000804"]["form_id"], "01000A01");
}

#[test]
fn missing_required_plugin_yields_empty_tables() {
    let output = run_cli(&["--required-plugin", "Nope.esm", "table"]);
    assert!(output.status.success());

    let lines = stdout_lines(&output);
    assert!(lines.contains(&"required_plugin_loaded=false".to_string()));
    assert!(lines.contains(&"[default] 0 entries (0 from overrides)".to_string()));
}

#[test]
fn script_mode_answers_each_call() {
    let data = fixture_path("robot_data.json");
    let plugins = fixture_path("plugins");
    let mut child = Command::new(env!("CARGO_BIN_EXE_automatron-disassembler"))
        .env("RUST_LOG", "info")
        .args(["--plugin-dir", &plugins, &data, "script"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn automatron-disassembler CLI");

    {
        let stdin = child.stdin.as_mut().expect("stdin should be piped");
        stdin
            .write_all(
                concat!(
                    "{\"function\":\"GetRobotLooseMod\",\"mod\":\"01000802\",\"attach_index\":1}\n",
                    "{\"function\":\"GetRobotLooseMod\",\"mod\":null}\n",
                    "{\"function\":\"GetRobotLooseMods\",\"mods\":[\"0200005A\",null,\"01000803\"]}\n",
                    "not json\n",
                )
                .as_bytes(),
            )
            .expect("failed to write script calls");
    }
    let output = child.wait_with_output().expect("failed to wait for CLI");
    assert!(output.status.success());

    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 4);
    let first: Value = serde_json::from_str(&lines[0]).expect("line should be JSON");
    assert_eq!(first["form_id"], "02000012");
    assert_eq!(lines[1], "null");
    let third: Value = serde_json::from_str(&lines[2]).expect("line should be JSON");
    assert_eq!(third.as_array().map(Vec::len), Some(1));
    assert_eq!(third[0]["name"], "Custom Arm Plating");
    assert_eq!(lines[3], "null");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Automatron Disassembler v1"));
    assert!(stderr.contains("Registered AutomatronDisassembler.GetRobotLooseMods"));
}

#[test]
fn unreadable_data_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_automatron-disassembler"))
        .args(["/definitely/not/here.json", "table"])
        .output()
        .expect("failed to run automatron-disassembler CLI");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error reading"));
}

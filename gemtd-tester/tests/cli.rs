use std::path::PathBuf;
use std::process::Command;

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "gemtd-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn tester() -> Command {
    Command::new(env!("CARGO_BIN_EXE_gemtd-tester"))
}

#[test]
fn cli_print_settings_writes_defaults() {
    let output_path = temp_path("settings");
    let status = tester()
        .args(["--print-settings", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json settings");
    assert_eq!(value["starting_money"], 220);
    assert_eq!(value["basic_enemy_health"], 102);
}

#[test]
fn cli_sweep_writes_json_report_and_exit_code_follows_verdict() {
    let output_path = temp_path("report");
    let status = tester()
        .args([
            "--waves",
            "2",
            "--simulations",
            "5",
            "--seed",
            "7",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    let content = std::fs::read_to_string(&output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    let verdict = value["analysis"]["verdict"].as_str().expect("verdict");
    let passing = matches!(verdict, "OPTIMAL" | "ACCEPTABLE");
    assert_eq!(status.code(), Some(if passing { 0 } else { 1 }));
    assert_eq!(value["tiers"].as_array().map(Vec::len), Some(11));
}

#[test]
fn cli_csv_report_goes_to_stdout() {
    let output = tester()
        .args(["--waves", "1", "--simulations", "3", "--report", "csv"])
        .output()
        .expect("run cli");
    assert!(matches!(output.status.code(), Some(0 | 1)));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut lines = stdout.lines();
    assert!(lines.next().is_some_and(|header| header.starts_with("skill,")));
    assert_eq!(lines.count(), 11);
}

#[test]
fn cli_rejects_invalid_settings_before_running() {
    let settings_path = temp_path("invalid-settings");
    std::fs::write(&settings_path, r#"{"basic_tower_fire_rate": -2.0}"#).expect("write settings");
    let output = tester()
        .args(["--report", "json", "--settings"])
        .arg(&settings_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fire_rate"), "stderr: {stderr}");
}

#[test]
fn cli_scans_game_sources() {
    let dir = temp_path("sources");
    std::fs::create_dir_all(&dir).expect("create dir");
    std::fs::write(dir.join("game.js"), "this.money = 150;\nconst diminishingFactor = 1;")
        .expect("write game.js");
    let output = tester()
        .arg("--print-settings")
        .arg("--source-dir")
        .arg(&dir)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json settings");
    assert_eq!(value["starting_money"], 150);
    assert_eq!(value["has_diminishing_returns"], true);
    assert_eq!(value["basic_tower_damage"], 22.0);
}

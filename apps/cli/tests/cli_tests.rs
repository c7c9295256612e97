//! CLI 冒烟测试

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn cli() -> Command {
    Command::cargo_bin("rover-cli").unwrap()
}

#[test]
fn test_eval_clear_path() {
    let output = cli()
        .args(["eval", "--angle", "0", "--left", "140", "--center", "140", "--right", "140"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let angle: f64 = String::from_utf8(output).unwrap().trim().parse().unwrap();
    assert!(angle.abs() <= 0.3);
}

#[test]
fn test_eval_negative_angle_and_explain() {
    cli()
        .args([
            "eval", "--angle", "-1", "--left", "0", "--center", "0", "--right", "0", "--explain",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("farleft & near & near & near -> farleft"));
}

#[test]
fn test_eval_rejects_out_of_range_angle() {
    cli()
        .args(["eval", "--angle", "1.5", "--left", "10", "--center", "10", "--right", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("angle"));
}

#[test]
fn test_rules_lists_full_table() {
    cli()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| out.lines().count() == 135))
        .stdout(predicate::str::contains("center & far & far & far -> center"));
}

#[test]
fn test_rules_filter_by_angle() {
    cli()
        .args(["rules", "--angle", "midright"])
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| {
            out.lines().count() == 27 && out.lines().all(|l| l.contains("midright &"))
        }));
}

#[test]
fn test_replay_reports_rows_and_stops_at_invalid() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("readings.csv");
    fs::write(
        &path,
        "angleIn,left,center,right,angleOut,interval\n\
         0.0,140,140,140,0.0,0.05\n\
         0.1,30,60,120,0.4,0.05\n\
         0.0,-1,60,120,0.4,0.05\n",
    )
    .unwrap();

    cli()
        .arg("replay")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::starts_with("row,angle_in"))
        .stdout(predicate::str::contains("\n2,0.1000"))
        .stderr(predicate::str::contains("3"));
}

#[test]
fn test_replay_labelled() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("car.csv");
    fs::write(
        &path,
        "id,angle,left,center,right,rule\n1,0.0,140,140,140,clear\n2,0.0,140,20,140,blocked\n",
    )
    .unwrap();

    cli()
        .args(["replay", "--labelled"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("1,0.0000,140.0000,140.0000,140.0000,clear,"))
        .stdout(predicate::str::contains("blocked"));
}

#[test]
fn test_config_set_get_roundtrip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("avoidance.toml");

    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "set", "trend.near_threshold_cm", "60"])
        .assert()
        .success();
    assert!(path.exists());

    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "get", "trend.near_threshold_cm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("60"));

    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "set", "trend.window", "0"])
        .assert()
        .failure();
}

#[test]
fn test_config_check_default() {
    let dir = tempdir().unwrap();
    cli()
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .args(["config", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("文件不存在"));
}

#[test]
fn test_simulate_approach_stops() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("avoidance.toml");
    fs::write(
        &config,
        "[control]\ntick_ms = 10\n\n\
         [channels.front]\ntrigger_pin = 18\necho_pin = 24\npoll_delay_ms = 2\n\n\
         [channels.front_left]\ntrigger_pin = 17\necho_pin = 27\npoll_delay_ms = 2\n\n\
         [channels.front_right]\ntrigger_pin = 22\necho_pin = 23\npoll_delay_ms = 2\n",
    )
    .unwrap();
    let record = dir.path().join("readings.csv");

    cli()
        .arg("--config")
        .arg(&config)
        .args(["simulate", "--scenario", "approach", "--ticks", "80", "--record"])
        .arg(&record)
        .assert()
        .success()
        .stdout(predicate::str::contains(",forward,"))
        .stdout(predicate::str::contains(",stop,"));

    let recorded = fs::read_to_string(&record).unwrap();
    assert!(recorded.starts_with("timestamp_us,channel,raw_cm,smoothed_cm,timed_out"));
    assert!(recorded.contains("front_left"));
}

#[test]
fn test_sonar_simulated_channel() {
    let dir = tempdir().unwrap();
    cli()
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .args(["sonar", "front-left", "--count", "3", "--distance", "75"])
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| {
            let rows: Vec<_> = out.lines().skip(1).collect();
            rows.len() == 3 && rows.iter().all(|r| r.contains(",front_left,75.00,"))
        }));
}

#[test]
fn test_sonar_unknown_channel() {
    cli().args(["sonar", "rear"]).assert().failure();
}

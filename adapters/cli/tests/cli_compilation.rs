use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "yatd"])
        .status()
        .expect("failed to invoke cargo check for yatd CLI binary");

    assert!(status.success(), "cargo check --bin yatd should succeed");
}

#[test]
fn bundled_scenario_runs_to_completion() {
    let scenario = concat!(env!("CARGO_MANIFEST_DIR"), "/../../scenarios/default.toml");
    let output = Command::new(env!("CARGO_BIN_EXE_yatd"))
        .args(["--scenario", scenario, "--dt-ms", "20", "--auto-waves"])
        .env("RUST_LOG", "warn")
        .output()
        .expect("failed to run yatd");

    assert!(output.status.success(), "yatd exits cleanly");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Yet Another Tower Defense"));
    assert!(stdout.contains("Won") || stdout.contains("Lost"));
}

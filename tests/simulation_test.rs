use std::process::{Command, Output};

fn run_headless(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_metro_sim"))
        .args(args)
        .env("RUST_LOG", "warn,metro_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that the simulation runs in headless mode without crashing
#[test]
fn test_headless_simulation_runs() {
    let output = run_headless(&["--ticks", "300"]);

    // Check that the simulation exited successfully
    assert!(
        output.status.success(),
        "Simulation failed to run in headless mode. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);

    // Verify simulation complete message is present
    assert!(
        stderr.contains("SIMULATION COMPLETE"),
        "Simulation did not complete properly. stderr: {}",
        stderr
    );
}

/// Test that simulation statistics are logged
#[test]
fn test_simulation_statistics_logged() {
    let output = run_headless(&["--ticks", "300", "--seed", "5"]);

    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);

    // Check for key statistics in the output
    for line in [
        "Elapsed time:",
        "Total passengers spawned:",
        "Total passengers delivered:",
        "Total passengers lost:",
        "Total stations:",
        "Score:",
        "Delivery rate:",
    ] {
        assert!(stderr.contains(line), "Missing '{}' statistic. stderr: {}", line, stderr);
    }
}

/// Test that the initial line is built and the map is drawn
#[test]
fn test_initial_path_is_created() {
    let output = run_headless(&["--ticks", "120", "--delta", "50"]);

    assert!(output.status.success(), "Simulation failed to run");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stderr.contains("opened with 3 stops (loop)"), "stderr: {}", stderr);
    assert!(stdout.contains("=== Metro Simulation Summary ==="));
    assert!(stdout.contains("Paths: 1, Metros: 1"));
    assert!(stdout.contains("=== Final State ==="));
}

/// Test that the final observation can be printed as JSON
#[test]
fn test_json_observation_output() {
    let output = run_headless(&["--ticks", "60", "--json"]);

    assert!(output.status.success(), "Simulation failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout.lines().last().expect("No output");
    let value: serde_json::Value = serde_json::from_str(last).expect("Last line is not JSON");

    assert_eq!(value["stations"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["paths"].as_array().map(Vec::len), Some(1));
}

/// Test that bad arguments are refused
#[test]
fn test_invalid_speed_is_rejected() {
    let output = run_headless(&["--ticks", "10", "--speed", "3"]);

    assert!(!output.status.success());
}

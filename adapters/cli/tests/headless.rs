use std::{fs, path::Path, process::Command};

use dino_evolve_system_evolution::load_checkpoint;

const SMALL_RUN: &str = r#"
[evolution]
population_size = 4
hidden_neurons = 2
elitism = 1

[generation]
max_ticks = 200
"#;

fn dino_evolve(args: &[&str], settings: &Path) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_dino-evolve"))
        .arg("--config")
        .arg(settings)
        .args(args)
        .env("RUST_LOG", "dino_evolve=warn")
        .output()
        .expect("failed to launch dino-evolve")
}

#[test]
fn headless_training_writes_a_replayable_checkpoint() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = dir.path().join("dino.toml");
    let best = dir.path().join("best.json");
    fs::write(&settings, SMALL_RUN).expect("write settings");

    let best_arg = best.to_str().expect("utf-8 temp path");
    let output = dino_evolve(
        &["--headless", "--generations", "2", "--seed", "5", "--save-best", best_arg],
        &settings,
    );
    assert!(
        output.status.success(),
        "training failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let checkpoint = load_checkpoint(&best).expect("checkpoint is valid");
    assert_eq!(checkpoint.generation, 2);

    let output = dino_evolve(
        &["--headless", "--generations", "1", "--replay", best_arg],
        &settings,
    );
    assert!(
        output.status.success(),
        "replay failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn invalid_settings_are_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let settings = dir.path().join("broken.toml");
    fs::write(&settings, "[world]\njump_power = -1.0\n").expect("write settings");

    let output = dino_evolve(&["--headless", "--generations", "1"], &settings);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("world.jump_power"), "{stderr}");
}

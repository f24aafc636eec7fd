use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

const CONFIG: &str = "\
NUM_POPS: 3
SAMPLE_SIZES: [10, 12, 14]
INPUT_PREFIX: demo
MODEL_PARAMS:
  mutation_rate_dist: {type: logunif, min: 1.0e-9, max: 1.0e-7}
  effective_pop_size_dist: {type: unif, min: 100, max: 100000}
  migration_dist: {type: logunif, min: 1.0e-5, max: 1.0e-2}
  time_dist: {type: unif, min: 100, max: 10000}
NUM_RANDOM_MODELS: 3
SEED: 42
";

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("input.yml");
    std::fs::write(&path, CONFIG).unwrap();
    path
}

fn coalminer() -> Command {
    Command::cargo_bin("coalminer").unwrap()
}

#[test]
fn test_init_writes_template() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("coalminer.yml");

    coalminer()
        .arg("init")
        .arg("--output")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration written to"));
    assert!(std::fs::read_to_string(&path).unwrap().contains("NUM_POPS: 2"));

    coalminer()
        .arg("init")
        .arg("--output")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_run_generates_replicates() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path());
    std::fs::write(temp.path().join("demo_MAFpop0.obs"), "sfs\n").unwrap();
    let output = temp.path().join("models");

    coalminer()
        .arg("run")
        .arg(&config)
        .arg("--output-dir")
        .arg(&output)
        .arg("--input-dir")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Random Seed: 42"))
        .stdout(predicate::str::contains("Completed: 3"));

    for i in 1..=3 {
        let dir = output.join(format!("random_model_{i}"));
        assert!(dir.join("demo.tpl").is_file());
        assert!(dir.join("demo.est").is_file());
        assert!(dir.join("demo_MAFpop0.obs").is_file());
    }
}

#[test]
fn test_run_is_reproducible_across_thread_counts() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path());

    let mut outputs = Vec::new();
    for threads in ["1", "3"] {
        let output = temp.path().join(format!("out_{threads}"));
        coalminer()
            .arg("--threads")
            .arg(threads)
            .arg("run")
            .arg(&config)
            .arg("--output-dir")
            .arg(&output)
            .arg("--replicates")
            .arg("2")
            .assert()
            .success();
        outputs.push(
            std::fs::read_to_string(output.join("random_model_2").join("demo.tpl")).unwrap(),
        );
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn test_run_rejects_missing_obs_files() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("input.yml");
    std::fs::write(
        &path,
        format!("{CONFIG}OBS_FILES: [/nonexistent/one.obs, /nonexistent/two.obs]\n"),
    )
    .unwrap();

    coalminer()
        .arg("run")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("/nonexistent/one.obs"))
        .stderr(predicate::str::contains("/nonexistent/two.obs"));
}

#[test]
fn test_topology_params_and_check_pipeline() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path());
    let tpl = temp.path().join("model.tpl");
    let est = temp.path().join("model.est");

    coalminer()
        .arg("topology")
        .arg("--num-pops")
        .arg("3")
        .arg("--sample-sizes")
        .arg("10,10,10")
        .arg("--output")
        .arg(&tpl)
        .arg("--seed")
        .arg("7")
        .arg("--family")
        .arg("PULSE")
        .assert()
        .success()
        .stdout(predicate::str::contains("Migration: PULSE (3 matrices)"));

    coalminer()
        .arg("params")
        .arg(&tpl)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&est)
        .assert()
        .success();
    assert!(std::fs::read_to_string(&est)
        .unwrap()
        .starts_with("// Priors and rules file\n"));

    coalminer()
        .arg("check")
        .arg(&tpl)
        .arg(&est)
        .assert()
        .success()
        .stdout(predicate::str::contains("Model pair is consistent"));
}

#[test]
fn test_check_reports_undeclared_variables() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path());
    let tpl = temp.path().join("model.tpl");
    let est = temp.path().join("model.est");

    coalminer()
        .args(["topology", "--num-pops", "2", "--sample-sizes", "10,10", "--ghost", "false"])
        .arg("--output")
        .arg(&tpl)
        .assert()
        .success();
    coalminer()
        .arg("params")
        .arg(&tpl)
        .arg("--config")
        .arg(&config)
        .arg("--output")
        .arg(&est)
        .assert()
        .success();

    let text = std::fs::read_to_string(&est).unwrap();
    let damaged: String = text
        .lines()
        .filter(|l| !l.contains("N_POP1$ unif"))
        .map(|l| format!("{l}\n"))
        .collect();
    std::fs::write(&est, damaged).unwrap();

    coalminer()
        .arg("check")
        .arg(&tpl)
        .arg(&est)
        .assert()
        .failure()
        .stdout(predicate::str::contains("N_POP1$ is never declared"));
}

#[test]
fn test_topology_rejects_mismatched_sample_sizes() {
    let temp = tempdir().unwrap();
    coalminer()
        .args(["topology", "--num-pops", "3", "--sample-sizes", "10,10"])
        .arg("--output")
        .arg(temp.path().join("bad.tpl"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("sample sizes"));
}

#[test]
fn test_unknown_family_is_rejected() {
    coalminer()
        .args(["topology", "-p", "2", "-s", "5,5", "-o", "x.tpl", "--family", "SOMETIMES"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown migration family"));
}

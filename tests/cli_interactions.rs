//! CLI behaviour of the `latency-stats` binary

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "BIND_ADDRESS",
    "PORT",
    "TELEMETRY_FILE",
    "WORKER_THREADS",
    "LOG_LEVEL",
    "LOG_FORMAT",
    "ENABLE_COLOR",
];

/// Command running inside an isolated working directory with a clean environment
fn create_test_cmd(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("latency-stats").unwrap();
    cmd.current_dir(workdir.path());
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd.arg("--no-color");
    cmd
}

fn write_dataset(workdir: &TempDir, name: &str, contents: &str) {
    let mut file = std::fs::File::create(workdir.path().join(name)).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
}

#[test]
fn test_help_lists_options() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--data-file"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--check-data"))
        .stdout(predicate::str::contains("--env-help"));
}

#[test]
fn test_version() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_check_data_with_default_file() {
    let workdir = TempDir::new().unwrap();
    write_dataset(
        &workdir,
        "q-vercel-latency.json",
        r#"[{"region":"us-east","latency_ms":100,"uptime_pct":99.9},
            {"region":"eu-west","latency_ms":140,"uptime_pct":99.2},
            {"region":"us-east","latency_ms":200,"uptime_pct":99.5}]"#,
    );

    create_test_cmd(&workdir)
        .args(["--check-data", "--log-level", "error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: 3"))
        .stdout(predicate::str::contains("Regions (2): us-east, eu-west"));
}

#[test]
fn test_check_data_with_explicit_file() {
    let workdir = TempDir::new().unwrap();
    write_dataset(&workdir, "custom.json", r#"[{"region":"apac","latency_ms":1,"uptime_pct":99}]"#);

    create_test_cmd(&workdir)
        .args(["--check-data", "--log-level", "error", "--data-file", "custom.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: 1"));
}

#[test]
fn test_check_data_missing_file_fails() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .args(["--check-data", "--log-level", "fatal"])
        .assert()
        .code(6)
        .stdout(predicate::str::contains("[WARNING] Telemetry file 'q-vercel-latency.json' does not exist"))
        .stderr(predicate::str::contains("Data unavailable"));
}

#[test]
fn test_check_data_prints_config_warnings() {
    let workdir = TempDir::new().unwrap();
    write_dataset(&workdir, "q-vercel-latency.json", r#"[{"region":"apac","latency_ms":1,"uptime_pct":99}]"#);

    create_test_cmd(&workdir)
        .args(["--check-data", "--log-level", "error", "--bind", "0.0.0.0", "--port", "80"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[INFO] Listening on all interfaces"))
        .stdout(predicate::str::contains("[WARNING] Port 80 is privileged"))
        .stdout(predicate::str::contains("Records: 1"));
}

#[test]
fn test_env_help_lists_variables() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .env("LOG_LEVEL", "shouting")
        .arg("--env-help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Supported Environment Variables:"))
        .stdout(predicate::str::contains("TELEMETRY_FILE"))
        .stdout(predicate::str::contains("WORKER_THREADS"));
}

#[test]
fn test_check_data_malformed_file_fails() {
    let workdir = TempDir::new().unwrap();
    write_dataset(&workdir, "q-vercel-latency.json", "{ this is not json");

    create_test_cmd(&workdir)
        .args(["--check-data"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Error loading data file"));
}

#[test]
fn test_invalid_configuration_exit_code() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .args(["--workers", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("CONFIG"));

    create_test_cmd(&workdir)
        .args(["--bind", "not-an-address"])
        .assert()
        .code(1);
}

#[test]
fn test_invalid_env_configuration() {
    let workdir = TempDir::new().unwrap();
    create_test_cmd(&workdir)
        .env("LOG_LEVEL", "shouting")
        .arg("--check-data")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("LOG_LEVEL"));
}

#[test]
fn test_env_file_is_loaded() {
    let workdir = TempDir::new().unwrap();
    write_dataset(&workdir, "from-dotenv.json", r#"[{"region":"emea","latency_ms":5,"uptime_pct":99}]"#);
    std::fs::write(workdir.path().join(".env"), "TELEMETRY_FILE=from-dotenv.json\n").unwrap();

    create_test_cmd(&workdir)
        .args(["--check-data", "--log-level", "error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from-dotenv.json"));
}

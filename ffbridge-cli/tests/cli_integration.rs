use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn ffbridge_cmd() -> Command {
    Command::cargo_bin("ffbridge").expect("Failed to find ffbridge binary")
}

#[test]
fn test_help_lists_subcommands() {
    ffbridge_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("supports"))
        .stdout(contains("probe"))
        .stdout(contains("convert"));
}

#[test]
fn test_convert_non_existent_input() -> Result<(), Box<dyn Error>> {
    let output_dir = tempdir()?;
    let output = output_dir.path().join("out.mp3");

    ffbridge_cmd()
        .arg("convert")
        .arg("surely/this/does/not/exist/input.wav")
        .arg(&output)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Invalid input path"));

    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_probe_non_existent_input() {
    ffbridge_cmd()
        .args(["probe", "surely/this/does/not/exist/input.flac", "--streams"])
        .assert()
        .failure()
        .stderr(contains("Invalid input path"));
}

#[test]
fn test_convert_rejects_unknown_format() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("input.wav");
    std::fs::write(&input, "dummy content")?;

    ffbridge_cmd()
        .arg("convert")
        .arg(&input)
        .arg(dir.path().join("out.bin"))
        .assert()
        .failure()
        .stderr(contains("pass --format"));
    Ok(())
}

#[test]
fn test_missing_config_file_fails() {
    ffbridge_cmd()
        .args(["--config", "surely/this/does/not/exist.toml", "supports", "-show_streams"])
        .assert()
        .failure()
        .stderr(contains("Failed to load settings"));
}

#[test]
fn test_supports_requires_an_option() {
    ffbridge_cmd().arg("supports").assert().failure();
}

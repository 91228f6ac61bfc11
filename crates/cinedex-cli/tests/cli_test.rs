#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use assert_cmd::cargo_bin_cmd;
use predicates::prelude::predicate;

#[test]
fn test_help_lists_subcommands() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("movies"))
        .stdout(predicate::str::contains("tv"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_movies_list_help() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.args(["movies", "list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--genres"))
        .stdout(predicate::str::contains("--sort-by"))
        .stdout(predicate::str::contains("--region"));
}

#[test]
fn test_tv_search_missing_query() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.args(["tv", "search"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--query"));
}

#[test]
fn test_movies_details_missing_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.args(["movies", "details"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--id"));
}

#[test]
fn test_movies_details_rejects_non_numeric_id() {
    // Arrange & Act & Assert
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.args(["movies", "details", "--id", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_movies_search_blank_query() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.args(["movies", "search", "--query", "  ", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--query must not be blank"));
}

#[test]
fn test_config_init_writes_defaults() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();

    // Act
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.args(["config", "init", "--dir"])
        .arg(dir.path())
        .assert()
        .success();

    // Assert
    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("base_url = \"https://api.themoviedb.org/3/\""));
    assert!(written.contains("token_env = \"TMDB_READ_ACCESS_TOKEN\""));
    assert!(written.contains("delay_ms = 300"));
}

#[test]
fn test_config_init_refuses_overwrite() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[retry]\ncount = 5\n").unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.args(["config", "init", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    let kept = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(kept.contains("count = 5"));
}

#[test]
fn test_config_init_force_overwrites() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[retry]\ncount = 5\n").unwrap();

    // Act
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.args(["config", "init", "--force", "--dir"])
        .arg(dir.path())
        .assert()
        .success();

    // Assert
    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("count = 0"));
}

#[test]
fn test_config_show_reports_effective_values() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[api]\nlanguage = \"ja-JP\"\n").unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.args(["config", "show", "--dir"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("language = \"ja-JP\""))
        .stdout(predicate::str::contains("timeout_ms = 15000"));
}

#[test]
fn test_invalid_config_fails() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[api\n").unwrap();

    // Act & Assert
    let mut cmd = cargo_bin_cmd!("cinedex");
    cmd.args(["movies", "popular", "--dir"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
}

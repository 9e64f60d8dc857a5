use std::io::Write;

use quickstart_core::config::AppConfig;
use quickstart_core::QuickstartError;

#[test]
fn test_load_full_config_from_file() {
    let toml_content = r#"
[runtime]
status_command = ["podman", "info"]

[quickstart]
init_command = ["skyvern", "init", "--openai-api-key", "sk-test"]
no_postgres_flag = "--no-db"
browser_install_command = ["npx", "playwright", "install", "chromium"]
services_command = ["skyvern", "run", "all"]
server_only_command = ["skyvern", "run", "server"]

[contributors]
pre_commit = "/home/dev/.local/bin/pre-commit"
python = "python3.11"
git = "git"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.runtime.status_command, vec!["podman", "info"]);
    assert_eq!(config.quickstart.init_command.len(), 4);
    assert_eq!(config.quickstart.no_postgres_flag, "--no-db");
    assert_eq!(config.quickstart.browser_install_command[0], "npx");
    assert_eq!(config.contributors.pre_commit, "/home/dev/.local/bin/pre-commit");
    assert_eq!(config.contributors.python, "python3.11");
}

#[test]
fn test_env_var_expansion_in_config() {
    std::env::set_var("QUICKSTART_TEST_RUNTIME", "nerdctl");

    let toml_content = r#"
[runtime]
status_command = ["${QUICKSTART_TEST_RUNTIME}", "info"]
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(config.runtime.status_command, vec!["nerdctl", "info"]);

    std::env::remove_var("QUICKSTART_TEST_RUNTIME");
}

#[test]
fn test_empty_file_uses_defaults() {
    let tmp = tempfile::NamedTempFile::new().expect("create temp file");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.runtime.status_command, vec!["docker", "info"]);
    assert_eq!(config.quickstart.init_command, vec!["skyvern", "init"]);
    assert_eq!(config.quickstart.no_postgres_flag, "--no-postgres");
    assert_eq!(config.quickstart.server_only_command, vec!["skyvern", "run", "server"]);
    assert_eq!(config.contributors.git, "git");
}

#[test]
fn test_malformed_toml_is_rejected() {
    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(b"[runtime\nstatus_command = 3").expect("write toml");

    let err = AppConfig::load(tmp.path()).unwrap_err();
    assert!(matches!(err, QuickstartError::Toml(_)));
}

#[test]
fn test_blank_program_is_rejected() {
    let toml_content = r#"
[contributors]
pre_commit = "  "
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let err = AppConfig::load(tmp.path()).unwrap_err();
    assert!(err.to_string().contains("contributors.pre_commit"));
}

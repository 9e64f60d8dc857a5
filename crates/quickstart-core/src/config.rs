use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuickstartError, Result};

/// Top-level quickstart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default)]
    pub quickstart: QuickstartConfig,
    #[serde(default)]
    pub contributors: ContributorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Exits zero iff the container runtime is up.
    #[serde(default = "default_status_command")]
    pub status_command: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            status_command: default_status_command(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickstartConfig {
    #[serde(default = "default_init_command")]
    pub init_command: Vec<String>,
    /// Appended to `init_command` when the database is skipped.
    #[serde(default = "default_no_postgres_flag")]
    pub no_postgres_flag: String,
    #[serde(default = "default_browser_install_command")]
    pub browser_install_command: Vec<String>,
    #[serde(default = "default_services_command")]
    pub services_command: Vec<String>,
    #[serde(default = "default_server_only_command")]
    pub server_only_command: Vec<String>,
}

impl Default for QuickstartConfig {
    fn default() -> Self {
        Self {
            init_command: default_init_command(),
            no_postgres_flag: default_no_postgres_flag(),
            browser_install_command: default_browser_install_command(),
            services_command: default_services_command(),
            server_only_command: default_server_only_command(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorsConfig {
    #[serde(default = "default_pre_commit")]
    pub pre_commit: String,
    /// Interpreter whose pip installs pre-commit.
    #[serde(default = "default_python")]
    pub python: String,
    #[serde(default = "default_git")]
    pub git: String,
}

impl Default for ContributorsConfig {
    fn default() -> Self {
        Self {
            pre_commit: default_pre_commit(),
            python: default_python(),
            git: default_git(),
        }
    }
}

fn default_status_command() -> Vec<String> {
    argv(&["docker", "info"])
}
fn default_init_command() -> Vec<String> {
    argv(&["skyvern", "init"])
}
fn default_no_postgres_flag() -> String {
    "--no-postgres".to_string()
}
fn default_browser_install_command() -> Vec<String> {
    argv(&["playwright", "install", "chromium"])
}
fn default_services_command() -> Vec<String> {
    argv(&["skyvern", "run", "all"])
}
fn default_server_only_command() -> Vec<String> {
    argv(&["skyvern", "run", "server"])
}
fn default_pre_commit() -> String {
    "pre-commit".to_string()
}
fn default_python() -> String {
    "python3".to_string()
}
fn default_git() -> String {
    "git".to_string()
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl AppConfig {
    /// Read and validate a TOML config file. `${NAME}` references are
    /// replaced from the environment before parsing.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                QuickstartError::ConfigNotFound(path.display().to_string())
            }
            _ => QuickstartError::Io(e),
        })?;

        let config: Self = toml::from_str(&expand_env_vars(&raw))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists. A missing file falls back to defaults
    /// unless the caller asked for that file explicitly.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self> {
        if path.exists() || explicit {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        let commands = [
            ("runtime.status_command", &self.runtime.status_command),
            ("quickstart.init_command", &self.quickstart.init_command),
            (
                "quickstart.browser_install_command",
                &self.quickstart.browser_install_command,
            ),
            ("quickstart.services_command", &self.quickstart.services_command),
            (
                "quickstart.server_only_command",
                &self.quickstart.server_only_command,
            ),
        ];
        for (key, command) in commands {
            if command.first().map_or(true, |p| p.trim().is_empty()) {
                return Err(QuickstartError::Config(format!("{key} must not be empty")));
            }
        }

        let programs = [
            ("contributors.pre_commit", &self.contributors.pre_commit),
            ("contributors.python", &self.contributors.python),
            ("contributors.git", &self.contributors.git),
        ];
        for (key, program) in programs {
            if program.trim().is_empty() {
                return Err(QuickstartError::Config(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }
}

/// Replace each `${NAME}` with the value of `NAME`. Unset variables and an
/// unterminated `${` are left as written.
fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let reference = &rest[start..];
        let Some(close) = reference.find('}') else {
            rest = reference;
            break;
        };
        match std::env::var(&reference[2..close]) {
            Ok(value) => out.push_str(&value),
            Err(_) => out.push_str(&reference[..=close]),
        }
        rest = &reference[close + 1..];
    }

    out.push_str(rest);
    out
}

use std::sync::Arc;

use serde::Serialize;

use quickstart_core::config::AppConfig;
use quickstart_core::traits::CommandRunner;
use quickstart_runner::EnvironmentProbe;

#[derive(Debug, Serialize)]
struct CheckResult {
    label: String,
    ok: bool,
    detail: String,
}

pub async fn run_doctor(
    config: &AppConfig,
    runner: Arc<dyn CommandRunner>,
    json: bool,
) -> anyhow::Result<()> {
    let probe = EnvironmentProbe::new(runner, config.runtime.status_command.clone());

    let mut checks = vec![check_runtime(config, &probe).await];
    for (label, tool) in tools(config) {
        checks.push(check_tool(&probe, label, &tool).await);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&checks)?);
        return Ok(());
    }

    let mut ok_count = 0;
    let mut fail_count = 0;

    for check in &checks {
        let icon = if check.ok { "[OK]" } else { "[!!]" };
        println!("  {} {}: {}", icon, check.label, check.detail);
        if check.ok {
            ok_count += 1;
        } else {
            fail_count += 1;
        }
    }

    println!();
    println!("  {} passed, {} issues found", ok_count, fail_count);
    Ok(())
}

/// Every external program the two flows may call, labelled, without repeats.
fn tools(config: &AppConfig) -> Vec<(&'static str, String)> {
    let candidates = [
        ("Application", config.quickstart.init_command.first().cloned()),
        ("Browser installer", config.quickstart.browser_install_command.first().cloned()),
        ("Services", config.quickstart.services_command.first().cloned()),
        ("Python", Some(config.contributors.python.clone())),
        ("Git", Some(config.contributors.git.clone())),
        ("pre-commit", Some(config.contributors.pre_commit.clone())),
    ];

    let mut seen = Vec::new();
    let mut out = Vec::new();
    for (label, tool) in candidates {
        let Some(tool) = tool else { continue };
        if seen.contains(&tool) {
            continue;
        }
        seen.push(tool.clone());
        out.push((label, tool));
    }
    out
}

async fn check_runtime(config: &AppConfig, probe: &EnvironmentProbe) -> CheckResult {
    let command = config.runtime.status_command.join(" ");
    if probe.is_container_runtime_ready().await {
        CheckResult {
            label: "Container runtime".into(),
            ok: true,
            detail: format!("`{command}` succeeded"),
        }
    } else {
        CheckResult {
            label: "Container runtime".into(),
            ok: false,
            detail: format!("`{command}` failed (is Docker installed and running?)"),
        }
    }
}

async fn check_tool(probe: &EnvironmentProbe, label: &str, tool: &str) -> CheckResult {
    if probe.is_tool_installed(tool).await {
        CheckResult {
            label: label.into(),
            ok: true,
            detail: format!("{tool} found"),
        }
    } else {
        CheckResult {
            label: label.into(),
            ok: false,
            detail: format!("{tool} not found or not runnable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tools_are_deduplicated() {
        let config = AppConfig::default();
        let names: Vec<_> = tools(&config).into_iter().map(|(_, t)| t).collect();
        // init and services share the `skyvern` binary
        assert_eq!(names, vec!["skyvern", "playwright", "python3", "git", "pre-commit"]);
    }

    #[tokio::test]
    async fn runtime_check_reports_command() {
        let runner = Arc::new(
            quickstart_test_utils::ScriptedRunner::new()
                .respond("docker info", quickstart_core::types::StepResult::ok()),
        );
        let config = AppConfig::default();
        let probe = EnvironmentProbe::new(runner, config.runtime.status_command.clone());
        let check = check_runtime(&config, &probe).await;
        assert!(check.ok);
        assert_eq!(check.detail, "`docker info` succeeded");
    }

    #[tokio::test]
    async fn missing_tool_is_an_issue() {
        let runner = Arc::new(quickstart_test_utils::ScriptedRunner::new());
        let probe = EnvironmentProbe::new(runner, vec![]);
        let check = check_tool(&probe, "Git", "git").await;
        assert!(!check.ok);
        assert_eq!(check.detail, "git not found or not runnable");
    }
}

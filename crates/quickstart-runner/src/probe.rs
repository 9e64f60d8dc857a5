use std::sync::Arc;

use tracing::debug;

use quickstart_core::traits::CommandRunner;

/// Yes/no readiness questions answered by running commands.
///
/// "Not found" and "errored" are the same answer: not ready.
#[derive(Clone)]
pub struct EnvironmentProbe {
    runner: Arc<dyn CommandRunner>,
    status_command: Vec<String>,
}

impl EnvironmentProbe {
    /// `status_command` exits zero iff the container runtime is up.
    pub fn new(runner: Arc<dyn CommandRunner>, status_command: Vec<String>) -> Self {
        Self {
            runner,
            status_command,
        }
    }

    pub async fn is_container_runtime_ready(&self) -> bool {
        let Some((program, args)) = self.status_command.split_first() else {
            return false;
        };
        let result = self.runner.run(program, args).await;
        debug!(program, ready = result.succeeded, "Container runtime probe");
        result.succeeded
    }

    pub async fn is_tool_installed(&self, tool: &str) -> bool {
        let args = ["--version".to_string()];
        let result = self.runner.run(tool, &args).await;
        debug!(tool, installed = result.succeeded, "Tool probe");
        result.succeeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickstart_core::types::StepResult;
    use quickstart_test_utils::ScriptedRunner;

    fn probe(runner: Arc<ScriptedRunner>) -> EnvironmentProbe {
        EnvironmentProbe::new(runner, vec!["docker".into(), "info".into()])
    }

    #[tokio::test]
    async fn runtime_ready_follows_status_command() {
        let runner = Arc::new(ScriptedRunner::new().respond("docker info", StepResult::ok()));
        assert!(probe(runner.clone()).is_container_runtime_ready().await);
        assert_eq!(runner.calls(), vec!["docker info"]);
    }

    #[tokio::test]
    async fn runtime_error_means_not_ready() {
        let runner = Arc::new(
            ScriptedRunner::new().respond("docker info", StepResult::failure("daemon not running")),
        );
        assert!(!probe(runner).is_container_runtime_ready().await);
    }

    #[tokio::test]
    async fn missing_tool_and_failing_tool_are_both_absent() {
        // Unscripted commands behave like a program that cannot be launched.
        let runner = Arc::new(
            ScriptedRunner::new().respond("pre-commit --version", StepResult::failure("exit 1")),
        );
        let probe = probe(runner.clone());
        assert!(!probe.is_tool_installed("pre-commit").await);
        assert!(!probe.is_tool_installed("playwright").await);
        assert_eq!(runner.calls(), vec!["pre-commit --version", "playwright --version"]);
    }

    #[tokio::test]
    async fn empty_status_command_is_not_ready() {
        let runner = Arc::new(ScriptedRunner::new());
        let probe = EnvironmentProbe::new(runner.clone(), vec![]);
        assert!(!probe.is_container_runtime_ready().await);
        assert!(runner.calls().is_empty());
    }
}

//! Collaborators backed by real commands.

use std::sync::Arc;

use futures::future::BoxFuture;

use quickstart_core::config::{AppConfig, ContributorsConfig, QuickstartConfig};
use quickstart_core::traits::{CommandRunner, ContributorActions, QuickstartActions};
use quickstart_core::types::StepResult;
use quickstart_runner::EnvironmentProbe;

const HOOKS_PATH_KEY: &str = "core.hooksPath";

fn run_argv(runner: &dyn CommandRunner, argv: Vec<String>) -> BoxFuture<'_, StepResult> {
    Box::pin(async move {
        match argv.split_first() {
            Some((program, args)) => runner.run(program, args).await,
            None => StepResult::failure("empty command"),
        }
    })
}

/// Like `run_argv`, but the command owns the terminal while it runs.
fn attach_argv(runner: &dyn CommandRunner, argv: Vec<String>) -> BoxFuture<'_, StepResult> {
    Box::pin(async move {
        match argv.split_first() {
            Some((program, args)) => runner.run_attached(program, args).await,
            None => StepResult::failure("empty command"),
        }
    })
}

fn argv(program: &str, args: &[&str]) -> Vec<String> {
    std::iter::once(program)
        .chain(args.iter().copied())
        .map(str::to_string)
        .collect()
}

/// Quickstart routines as configured external commands.
pub struct ProcessQuickstart {
    runner: Arc<dyn CommandRunner>,
    probe: EnvironmentProbe,
    config: QuickstartConfig,
}

impl ProcessQuickstart {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &AppConfig) -> Self {
        let probe = EnvironmentProbe::new(runner.clone(), config.runtime.status_command.clone());
        Self {
            runner,
            probe,
            config: config.quickstart.clone(),
        }
    }

    fn init_argv(&self, skip_database: bool) -> Vec<String> {
        let mut argv = self.config.init_command.clone();
        if skip_database {
            argv.push(self.config.no_postgres_flag.clone());
        }
        argv
    }

    fn services_argv(&self, server_only: bool) -> Vec<String> {
        if server_only {
            self.config.server_only_command.clone()
        } else {
            self.config.services_command.clone()
        }
    }
}

impl QuickstartActions for ProcessQuickstart {
    fn runtime_ready(&self) -> BoxFuture<'_, bool> {
        Box::pin(self.probe.is_container_runtime_ready())
    }

    fn initialize(&self, skip_database: bool) -> BoxFuture<'_, StepResult> {
        attach_argv(self.runner.as_ref(), self.init_argv(skip_database))
    }

    fn install_browser_engine(&self) -> BoxFuture<'_, StepResult> {
        run_argv(
            self.runner.as_ref(),
            self.config.browser_install_command.clone(),
        )
    }

    fn start_services(&self, server_only: bool) -> BoxFuture<'_, StepResult> {
        attach_argv(self.runner.as_ref(), self.services_argv(server_only))
    }
}

/// Contributor routines: pip, git, and pre-commit.
pub struct ProcessContributor {
    runner: Arc<dyn CommandRunner>,
    probe: EnvironmentProbe,
    config: ContributorsConfig,
}

impl ProcessContributor {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &AppConfig) -> Self {
        let probe = EnvironmentProbe::new(runner.clone(), config.runtime.status_command.clone());
        Self {
            runner,
            probe,
            config: config.contributors.clone(),
        }
    }

    fn git(&self, args: &[&str]) -> BoxFuture<'_, StepResult> {
        run_argv(self.runner.as_ref(), argv(&self.config.git, args))
    }

    fn pre_commit(&self, args: &[&str]) -> BoxFuture<'_, StepResult> {
        run_argv(self.runner.as_ref(), argv(&self.config.pre_commit, args))
    }
}

impl ContributorActions for ProcessContributor {
    fn pre_commit_installed(&self) -> BoxFuture<'_, bool> {
        Box::pin(self.probe.is_tool_installed(&self.config.pre_commit))
    }

    fn install_pre_commit_tool(&self) -> BoxFuture<'_, StepResult> {
        run_argv(
            self.runner.as_ref(),
            argv(&self.config.python, &["-m", "pip", "install", "pre-commit"]),
        )
    }

    fn query_hooks_path_override(&self) -> BoxFuture<'_, StepResult> {
        self.git(&["config", "--get-all", HOOKS_PATH_KEY])
    }

    fn clear_hooks_path_override(&self) -> BoxFuture<'_, StepResult> {
        self.git(&["config", "--unset-all", HOOKS_PATH_KEY])
    }

    fn install_hooks(&self) -> BoxFuture<'_, StepResult> {
        self.pre_commit(&["install"])
    }

    fn run_all_checks(&self) -> BoxFuture<'_, StepResult> {
        self.pre_commit(&["run", "--all-files"])
    }
}

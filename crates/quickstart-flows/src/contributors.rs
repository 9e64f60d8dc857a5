use std::sync::Arc;

use tracing::debug;

use quickstart_core::traits::ContributorActions;
use quickstart_core::types::{FlowOutcome, StepMessages};
use quickstart_runner::{Step, StepSequencer};

pub const CHECK_PRE_COMMIT_INSTALLED: &str = "CheckPreCommitInstalled";
pub const INSTALL_PRE_COMMIT: &str = "InstallPreCommit";
pub const DETECT_CONFLICTING_HOOKS_PATH: &str = "DetectConflictingHooksPath";
pub const CLEAR_CONFLICTING_HOOKS_PATH: &str = "ClearConflictingHooksPath";
pub const INSTALL_HOOKS: &str = "InstallHooks";
pub const RUN_ALL_CHECKS: &str = "RunAllChecks";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContributorOptions {
    /// Install hooks but don't run them across the tree.
    pub skip_run: bool,
}

/// Pre-commit tool and git hooks for a contributor checkout.
///
/// The two probes (`CheckPreCommitInstalled`, `DetectConflictingHooksPath`)
/// never fail the flow; each is the skip condition of the step after it.
pub struct ContributorSetupFlow {
    options: ContributorOptions,
    actions: Arc<dyn ContributorActions>,
}

impl ContributorSetupFlow {
    pub fn new(options: ContributorOptions, actions: Arc<dyn ContributorActions>) -> Self {
        Self { options, actions }
    }

    pub fn steps(&self) -> Vec<Step> {
        let probe = self.actions.clone();
        let actions = self.actions.clone();
        let install_pre_commit = Step::fatal(INSTALL_PRE_COMMIT, move || {
            let actions = actions.clone();
            async move {
                let result = actions.install_pre_commit_tool().await;
                let detail = format!(
                    "Failed to install pre-commit ({}). Please install manually: pip install pre-commit",
                    result.detail()
                );
                result.with_detail(detail)
            }
        })
        .skip_if(move || {
            let probe = probe.clone();
            async move {
                let installed = probe.pre_commit_installed().await;
                debug!(probe = CHECK_PRE_COMMIT_INSTALLED, installed, "Probe finished");
                installed
            }
        })
        .with_messages(
            StepMessages::default()
                .running("Installing pre-commit...")
                .succeeded("pre-commit installed!")
                .skipped("pre-commit is already installed"),
        );

        let probe = self.actions.clone();
        let actions = self.actions.clone();
        let clear_hooks_path = Step::fatal(CLEAR_CONFLICTING_HOOKS_PATH, move || {
            let actions = actions.clone();
            async move {
                let result = actions.clear_hooks_path_override().await;
                let detail = format!("Failed to fix git configuration: {}", result.detail());
                result.with_detail(detail)
            }
        })
        .skip_if(move || {
            let probe = probe.clone();
            async move {
                let configured = probe.query_hooks_path_override().await.succeeded;
                debug!(probe = DETECT_CONFLICTING_HOOKS_PATH, configured, "Probe finished");
                !configured
            }
        })
        .with_messages(
            StepMessages::default()
                .running("Removing conflicting git hooksPath configuration...")
                .succeeded("Git hooksPath configuration cleared!"),
        );

        let actions = self.actions.clone();
        let install_hooks = Step::fatal(INSTALL_HOOKS, move || {
            let actions = actions.clone();
            async move {
                let result = actions.install_hooks().await;
                let detail = format!("Failed to install pre-commit hooks: {}", result.detail());
                result.with_detail(detail)
            }
        })
        .with_messages(
            StepMessages::default()
                .running("Installing pre-commit hooks...")
                .succeeded("Pre-commit hooks installed!"),
        );

        let actions = self.actions.clone();
        let run_all_checks = Step::advisory(RUN_ALL_CHECKS, move || {
            let actions = actions.clone();
            async move { actions.run_all_checks().await }
        })
        .skip_when(self.options.skip_run)
        .with_messages(
            StepMessages::default()
                .running("Running pre-commit on all files...")
                .succeeded("All pre-commit checks passed!")
                .skipped("Skipping pre-commit run as requested.")
                .warned("Some pre-commit checks failed, but hooks are installed"),
        );

        vec![install_pre_commit, clear_hooks_path, install_hooks, run_all_checks]
    }

    pub async fn run(&self, sequencer: &StepSequencer) -> FlowOutcome {
        sequencer.run(&self.steps()).await
    }
}

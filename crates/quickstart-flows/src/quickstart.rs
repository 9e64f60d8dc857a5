use std::sync::Arc;

use quickstart_core::error::QuickstartError;
use quickstart_core::traits::QuickstartActions;
use quickstart_core::types::{FlowOutcome, StepMessages, StepResult};
use quickstart_runner::{Step, StepSequencer};

pub const CHECK_RUNTIME: &str = "CheckRuntime";
pub const INITIALIZE: &str = "Initialize";
pub const INSTALL_BROWSER_ENGINE: &str = "InstallBrowserEngine";
pub const START_SERVICES: &str = "StartServices";

/// Toggles for the quickstart command, fixed at flow construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuickstartOptions {
    /// Initialise without a local PostgreSQL container.
    pub no_postgres: bool,
    pub skip_browser_install: bool,
    /// Start only the API server, not the UI.
    pub server_only: bool,
}

/// Runtime check, initialisation, browser install, service start.
pub struct QuickstartFlow {
    options: QuickstartOptions,
    actions: Arc<dyn QuickstartActions>,
}

impl QuickstartFlow {
    pub fn new(options: QuickstartOptions, actions: Arc<dyn QuickstartActions>) -> Self {
        Self { options, actions }
    }

    pub fn steps(&self) -> Vec<Step> {
        let options = self.options;

        let actions = self.actions.clone();
        let check_runtime = Step::fatal(CHECK_RUNTIME, move || {
            let actions = actions.clone();
            async move {
                if actions.runtime_ready().await {
                    StepResult::ok()
                } else {
                    StepResult::failure(QuickstartError::RuntimeUnavailable.to_string())
                }
            }
        })
        .with_messages(
            StepMessages::default()
                .running("Checking Docker installation...")
                .succeeded("Docker is installed and running"),
        );

        let actions = self.actions.clone();
        let initialize = Step::fatal(INITIALIZE, move || {
            let actions = actions.clone();
            async move { actions.initialize(options.no_postgres).await }
        })
        .with_messages(
            StepMessages::default()
                .running("Initializing Skyvern...")
                .succeeded("Initialization complete.")
                .attached(),
        );

        let actions = self.actions.clone();
        let install_browser = Step::advisory(INSTALL_BROWSER_ENGINE, move || {
            let actions = actions.clone();
            async move { actions.install_browser_engine().await }
        })
        .skip_when(options.skip_browser_install)
        .with_messages(
            StepMessages::default()
                .running("Installing Chromium browser...")
                .succeeded("Chromium installation complete.")
                .skipped("Skipping Chromium installation as requested.")
                .warned("Failed to install Chromium"),
        );

        let actions = self.actions.clone();
        let start_services = Step::fatal(START_SERVICES, move || {
            let actions = actions.clone();
            async move { actions.start_services(options.server_only).await }
        })
        .with_messages(
            StepMessages::default()
                .running("Starting Skyvern services...")
                .succeeded("Services started.")
                .attached(),
        );

        vec![check_runtime, initialize, install_browser, start_services]
    }

    pub async fn run(&self, sequencer: &StepSequencer) -> FlowOutcome {
        sequencer.run(&self.steps()).await
    }
}

use futures::future::BoxFuture;

use crate::types::{StepMessages, StepResult, StepStatus};

/// Command runner — launches an external process and waits for it.
pub trait CommandRunner: Send + Sync + 'static {
    /// Run `program` with `args`, capturing output.
    ///
    /// A non-zero exit is reported as a failed result, never as an error.
    /// A launch failure (program not found, permission denied) is also a
    /// failed result, with `error_detail` describing it.
    fn run<'a>(&'a self, program: &'a str, args: &'a [String]) -> BoxFuture<'a, StepResult>;

    /// Run `program` with the terminal attached: the child inherits stdin,
    /// stdout, and stderr, and nothing is captured. For long-running or
    /// interactive commands whose output belongs to the user.
    fn run_attached<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> BoxFuture<'a, StepResult>;
}

/// Progress reporter — user-visible feedback around each step.
///
/// Implementations may draw a spinner between `begin` and `end`; the
/// display only reads what it is given and never feeds back into the flow.
///
/// `end` is called once for every step the sequencer reached, skipped ones
/// included. A step that was never reached because the flow was already
/// interrupted gets no call at all.
pub trait ProgressReporter: Send + Sync {
    /// The step's action is about to run.
    fn begin(&self, step: &str, messages: &StepMessages);

    /// The step reached its final status.
    fn end(&self, step: &str, status: &StepStatus, messages: &StepMessages);
}

/// External routines driven by the quickstart flow.
pub trait QuickstartActions: Send + Sync + 'static {
    /// Whether the container runtime is installed and responsive.
    fn runtime_ready(&self) -> BoxFuture<'_, bool>;

    /// Initialise the application, optionally without a local database.
    fn initialize(&self, skip_database: bool) -> BoxFuture<'_, StepResult>;

    /// Install the browser engine used for automation.
    fn install_browser_engine(&self) -> BoxFuture<'_, StepResult>;

    /// Start services. Returns once they are confirmed up, or have failed.
    fn start_services(&self, server_only: bool) -> BoxFuture<'_, StepResult>;
}

/// External routines driven by the contributor setup flow.
pub trait ContributorActions: Send + Sync + 'static {
    /// Whether the pre-commit tool is already available.
    fn pre_commit_installed(&self) -> BoxFuture<'_, bool>;

    fn install_pre_commit_tool(&self) -> BoxFuture<'_, StepResult>;

    /// Succeeds iff a `core.hooksPath` override is configured.
    fn query_hooks_path_override(&self) -> BoxFuture<'_, StepResult>;

    fn clear_hooks_path_override(&self) -> BoxFuture<'_, StepResult>;

    fn install_hooks(&self) -> BoxFuture<'_, StepResult>;

    /// Run every configured check across the whole tree.
    fn run_all_checks(&self) -> BoxFuture<'_, StepResult>;
}

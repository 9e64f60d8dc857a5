//! Spies and scripted collaborators shared by quickstart tests.

use std::collections::HashMap;
use std::sync::Mutex;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use quickstart_core::traits::{
    CommandRunner, ContributorActions, ProgressReporter, QuickstartActions,
};
use quickstart_core::types::{StepMessages, StepResult, StepStatus};

// ───────────────────────── Command runner ─────────────────────────

/// Command runner answering from a script keyed by `"program arg1 arg2"`.
/// Unscripted commands fail as if the program could not be launched.
/// Captured and attached runs answer from the same script.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, StepResult>,
    calls: Mutex<Vec<String>>,
    attached: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, command_line: &str, result: StepResult) -> Self {
        self.responses.insert(command_line.to_string(), result);
        self
    }

    /// Every command line run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// The command lines that were run with the terminal attached.
    pub fn attached(&self) -> Vec<String> {
        self.attached.lock().unwrap().clone()
    }

    fn answer(&self, program: &str, args: &[String]) -> (String, StepResult) {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.lock().unwrap().push(line.clone());
        let result = self
            .responses
            .get(&line)
            .cloned()
            .unwrap_or_else(|| StepResult::failure(format!("Failed to launch {program}: not found")));
        (line, result)
    }
}

impl CommandRunner for ScriptedRunner {
    fn run<'a>(&'a self, program: &'a str, args: &'a [String]) -> BoxFuture<'a, StepResult> {
        let (_, result) = self.answer(program, args);
        Box::pin(async move { result })
    }

    fn run_attached<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> BoxFuture<'a, StepResult> {
        let (line, result) = self.answer(program, args);
        self.attached.lock().unwrap().push(line);
        Box::pin(async move { result })
    }
}

// ───────────────────────── Reporter ─────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    Begin(String),
    End(String, StepStatus),
}

/// Reporter that records every event it receives.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<ReportEvent>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Steps whose action was started, in order.
    pub fn begun(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::Begin(step) => Some(step),
                ReportEvent::End(..) => None,
            })
            .collect()
    }

    /// Final status of every finished step, in order.
    pub fn statuses(&self) -> Vec<(String, StepStatus)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReportEvent::End(step, status) => Some((step, status)),
                ReportEvent::Begin(_) => None,
            })
            .collect()
    }

    pub fn status_of(&self, step: &str) -> Option<StepStatus> {
        self.statuses()
            .into_iter()
            .find(|(name, _)| name == step)
            .map(|(_, status)| status)
    }

    /// `(step, detail)` for every advisory failure.
    pub fn warnings(&self) -> Vec<(String, String)> {
        self.statuses()
            .into_iter()
            .filter_map(|(step, status)| match status {
                StepStatus::Warned(detail) => Some((step, detail)),
                _ => None,
            })
            .collect()
    }
}

impl ProgressReporter for RecordingReporter {
    fn begin(&self, step: &str, _messages: &StepMessages) {
        self.events
            .lock()
            .unwrap()
            .push(ReportEvent::Begin(step.to_string()));
    }

    fn end(&self, step: &str, status: &StepStatus, _messages: &StepMessages) {
        self.events
            .lock()
            .unwrap()
            .push(ReportEvent::End(step.to_string(), status.clone()));
    }
}

// ───────────────────────── Call log ─────────────────────────

/// Records collaborator calls and can simulate a user interrupt on one of
/// them: the token is cancelled and the call never completes.
#[derive(Default)]
struct CallLog {
    calls: Mutex<Vec<(&'static str, Option<bool>)>>,
    interrupt: Option<(&'static str, CancellationToken)>,
}

impl CallLog {
    fn answer<T: Send + 'static>(
        &self,
        method: &'static str,
        flag: Option<bool>,
        value: T,
    ) -> BoxFuture<'static, T> {
        self.calls.lock().unwrap().push((method, flag));
        let interrupt = self
            .interrupt
            .as_ref()
            .filter(|(target, _)| *target == method)
            .map(|(_, token)| token.clone());
        Box::pin(async move {
            if let Some(token) = interrupt {
                token.cancel();
                futures::future::pending::<()>().await;
            }
            value
        })
    }

    fn count(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| *name == method)
            .count()
    }

    fn flag(&self, method: &str) -> Option<bool> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(name, _)| *name == method)
            .and_then(|(_, flag)| *flag)
    }

    fn order(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(|(name, _)| *name).collect()
    }
}

// ───────────────────────── Quickstart spy ─────────────────────────

/// Quickstart collaborators with scripted answers. Defaults to a healthy
/// machine where everything succeeds.
pub struct SpyQuickstart {
    runtime_ready: bool,
    initialize: StepResult,
    browser: StepResult,
    services: StepResult,
    log: CallLog,
}

impl Default for SpyQuickstart {
    fn default() -> Self {
        Self {
            runtime_ready: true,
            initialize: StepResult::ok(),
            browser: StepResult::ok(),
            services: StepResult::ok(),
            log: CallLog::default(),
        }
    }
}

impl SpyQuickstart {
    pub fn healthy() -> Self {
        Self::default()
    }

    pub fn runtime_ready(mut self, ready: bool) -> Self {
        self.runtime_ready = ready;
        self
    }

    pub fn initialize(mut self, result: StepResult) -> Self {
        self.initialize = result;
        self
    }

    pub fn browser(mut self, result: StepResult) -> Self {
        self.browser = result;
        self
    }

    pub fn services(mut self, result: StepResult) -> Self {
        self.services = result;
        self
    }

    /// Cancel `token` and hang when `method` is called.
    pub fn interrupt_during(mut self, method: &'static str, token: CancellationToken) -> Self {
        self.log.interrupt = Some((method, token));
        self
    }

    pub fn count(&self, method: &str) -> usize {
        self.log.count(method)
    }

    /// The boolean argument of the latest call to `method`.
    pub fn flag(&self, method: &str) -> Option<bool> {
        self.log.flag(method)
    }

    pub fn order(&self) -> Vec<&'static str> {
        self.log.order()
    }
}

impl QuickstartActions for SpyQuickstart {
    fn runtime_ready(&self) -> BoxFuture<'_, bool> {
        self.log.answer("runtime_ready", None, self.runtime_ready)
    }

    fn initialize(&self, skip_database: bool) -> BoxFuture<'_, StepResult> {
        self.log
            .answer("initialize", Some(skip_database), self.initialize.clone())
    }

    fn install_browser_engine(&self) -> BoxFuture<'_, StepResult> {
        self.log
            .answer("install_browser_engine", None, self.browser.clone())
    }

    fn start_services(&self, server_only: bool) -> BoxFuture<'_, StepResult> {
        self.log
            .answer("start_services", Some(server_only), self.services.clone())
    }
}

// ───────────────────────── Contributor spy ─────────────────────────

/// Contributor collaborators with scripted answers. Defaults to a fresh
/// checkout: pre-commit missing, no hooks-path override, all installs work.
pub struct SpyContributor {
    pre_commit_installed: bool,
    hooks_path_override: bool,
    install_pre_commit: StepResult,
    clear_hooks_path: StepResult,
    install_hooks: StepResult,
    run_all_checks: StepResult,
    log: CallLog,
}

impl Default for SpyContributor {
    fn default() -> Self {
        Self {
            pre_commit_installed: false,
            hooks_path_override: false,
            install_pre_commit: StepResult::ok(),
            clear_hooks_path: StepResult::ok(),
            install_hooks: StepResult::ok(),
            run_all_checks: StepResult::ok(),
            log: CallLog::default(),
        }
    }
}

impl SpyContributor {
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn pre_commit_installed(mut self, installed: bool) -> Self {
        self.pre_commit_installed = installed;
        self
    }

    pub fn hooks_path_override(mut self, configured: bool) -> Self {
        self.hooks_path_override = configured;
        self
    }

    pub fn install_pre_commit(mut self, result: StepResult) -> Self {
        self.install_pre_commit = result;
        self
    }

    pub fn clear_hooks_path(mut self, result: StepResult) -> Self {
        self.clear_hooks_path = result;
        self
    }

    pub fn install_hooks(mut self, result: StepResult) -> Self {
        self.install_hooks = result;
        self
    }

    pub fn run_all_checks(mut self, result: StepResult) -> Self {
        self.run_all_checks = result;
        self
    }

    /// Cancel `token` and hang when `method` is called.
    pub fn interrupt_during(mut self, method: &'static str, token: CancellationToken) -> Self {
        self.log.interrupt = Some((method, token));
        self
    }

    pub fn count(&self, method: &str) -> usize {
        self.log.count(method)
    }

    pub fn order(&self) -> Vec<&'static str> {
        self.log.order()
    }
}

impl ContributorActions for SpyContributor {
    fn pre_commit_installed(&self) -> BoxFuture<'_, bool> {
        self.log
            .answer("pre_commit_installed", None, self.pre_commit_installed)
    }

    fn install_pre_commit_tool(&self) -> BoxFuture<'_, StepResult> {
        self.log
            .answer("install_pre_commit_tool", None, self.install_pre_commit.clone())
    }

    fn query_hooks_path_override(&self) -> BoxFuture<'_, StepResult> {
        let result = if self.hooks_path_override {
            StepResult::success(".githooks")
        } else {
            StepResult::failure("exit code 1")
        };
        self.log.answer("query_hooks_path_override", None, result)
    }

    fn clear_hooks_path_override(&self) -> BoxFuture<'_, StepResult> {
        self.log
            .answer("clear_hooks_path_override", None, self.clear_hooks_path.clone())
    }

    fn install_hooks(&self) -> BoxFuture<'_, StepResult> {
        self.log
            .answer("install_hooks", None, self.install_hooks.clone())
    }

    fn run_all_checks(&self) -> BoxFuture<'_, StepResult> {
        self.log
            .answer("run_all_checks", None, self.run_all_checks.clone())
    }
}

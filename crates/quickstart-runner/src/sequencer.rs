use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use quickstart_core::traits::ProgressReporter;
use quickstart_core::types::{FlowOutcome, StepMessages, StepPolicy, StepResult, StepStatus};

type StepAction = Box<dyn Fn() -> BoxFuture<'static, StepResult> + Send + Sync>;
type SkipPredicate = Box<dyn Fn() -> BoxFuture<'static, bool> + Send + Sync>;

/// One unit of orchestrated work.
pub struct Step {
    name: String,
    policy: StepPolicy,
    action: StepAction,
    skip_if: Option<SkipPredicate>,
    messages: StepMessages,
}

impl Step {
    pub fn new<F, Fut>(name: impl Into<String>, policy: StepPolicy, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StepResult> + Send + 'static,
    {
        Self {
            name: name.into(),
            policy,
            action: Box::new(move || action().boxed()),
            skip_if: None,
            messages: StepMessages::default(),
        }
    }

    pub fn fatal<F, Fut>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StepResult> + Send + 'static,
    {
        Self::new(name, StepPolicy::Fatal, action)
    }

    pub fn advisory<F, Fut>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StepResult> + Send + 'static,
    {
        Self::new(name, StepPolicy::Advisory, action)
    }

    /// Skip the step when `predicate` resolves true. Evaluated right before
    /// the action would run, so it sees the effects of earlier steps.
    pub fn skip_if<F, Fut>(mut self, predicate: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.skip_if = Some(Box::new(move || predicate().boxed()));
        self
    }

    /// Skip on a value already known at construction time.
    pub fn skip_when(self, skip: bool) -> Self {
        if skip {
            self.skip_if(|| async { true })
        } else {
            self
        }
    }

    pub fn with_messages(mut self, messages: StepMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> StepPolicy {
        self.policy
    }

    pub fn messages(&self) -> &StepMessages {
        &self.messages
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("policy", &self.policy)
            .field("conditional", &self.skip_if.is_some())
            .finish()
    }
}

/// Runs steps strictly in order under their failure policies.
///
/// Stops at the first fatal failure, warns past advisory ones, and yields
/// to `cancel` at any point: an interrupt wins over every policy.
pub struct StepSequencer {
    reporter: Arc<dyn ProgressReporter>,
    cancel: CancellationToken,
}

impl StepSequencer {
    pub fn new(reporter: Arc<dyn ProgressReporter>, cancel: CancellationToken) -> Self {
        Self { reporter, cancel }
    }

    pub async fn run(&self, steps: &[Step]) -> FlowOutcome {
        for step in steps {
            // Interrupted between steps: this one was never reached.
            if self.cancel.is_cancelled() {
                warn!(next = %step.name, "Interrupted");
                return FlowOutcome::Interrupted;
            }

            if let Some(ref predicate) = step.skip_if {
                let skip = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return self.interrupted(step),
                    skip = predicate() => skip,
                };
                if skip {
                    info!(step = %step.name, "Step skipped");
                    self.reporter.end(&step.name, &StepStatus::Skipped, &step.messages);
                    continue;
                }
            }

            info!(step = %step.name, policy = %step.policy, "Running step");
            self.reporter.begin(&step.name, &step.messages);

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return self.interrupted(step),
                result = (step.action)() => result,
            };

            if self.cancel.is_cancelled() {
                return self.interrupted(step);
            }

            if result.succeeded {
                info!(step = %step.name, "Step succeeded");
                self.reporter.end(&step.name, &StepStatus::Succeeded, &step.messages);
                continue;
            }

            let detail = result.detail().to_string();
            match step.policy {
                StepPolicy::Fatal => {
                    error!(step = %step.name, detail = %detail, "Step failed");
                    self.reporter
                        .end(&step.name, &StepStatus::Failed(detail.clone()), &step.messages);
                    return FlowOutcome::FailedFatal {
                        step: step.name.clone(),
                        detail,
                    };
                }
                StepPolicy::Advisory => {
                    warn!(step = %step.name, detail = %detail, "Advisory step failed, continuing");
                    self.reporter
                        .end(&step.name, &StepStatus::Warned(detail), &step.messages);
                }
            }
        }

        FlowOutcome::Completed
    }

    fn interrupted(&self, step: &Step) -> FlowOutcome {
        warn!(step = %step.name, "Interrupted");
        self.reporter
            .end(&step.name, &StepStatus::Interrupted, &step.messages);
        FlowOutcome::Interrupted
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use quickstart_test_utils::RecordingReporter;

    fn counted(
        calls: &Arc<AtomicUsize>,
        result: StepResult,
    ) -> impl Fn() -> futures::future::Ready<StepResult> + Send + Sync + 'static {
        let calls = calls.clone();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(result.clone())
        }
    }

    fn sequencer(reporter: &Arc<RecordingReporter>) -> StepSequencer {
        StepSequencer::new(reporter.clone(), CancellationToken::new())
    }

    #[tokio::test]
    async fn all_steps_succeed() {
        let reporter = Arc::new(RecordingReporter::new());
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let steps = vec![
            Step::fatal("First", counted(&first, StepResult::ok())),
            Step::advisory("Second", counted(&second, StepResult::ok())),
        ];

        let outcome = sequencer(&reporter).run(&steps).await;
        assert_eq!(outcome, FlowOutcome::Completed);
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(reporter.begun(), vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn fatal_failure_stops_flow() {
        let reporter = Arc::new(RecordingReporter::new());
        let later = Arc::new(AtomicUsize::new(0));
        let failing = Arc::new(AtomicUsize::new(0));
        let steps = vec![
            Step::fatal("Broken", counted(&failing, StepResult::failure("exit 1"))),
            Step::fatal("Later", counted(&later, StepResult::ok())),
            Step::advisory("EvenLater", counted(&later, StepResult::ok())),
        ];

        let outcome = sequencer(&reporter).run(&steps).await;
        assert_eq!(
            outcome,
            FlowOutcome::FailedFatal {
                step: "Broken".into(),
                detail: "exit 1".into()
            }
        );
        assert_eq!(failing.load(Ordering::SeqCst), 1);
        assert_eq!(later.load(Ordering::SeqCst), 0);
        assert_eq!(
            reporter.status_of("Broken"),
            Some(StepStatus::Failed("exit 1".into()))
        );
    }

    #[tokio::test]
    async fn advisory_failure_continues_with_warning() {
        let reporter = Arc::new(RecordingReporter::new());
        let next = Arc::new(AtomicUsize::new(0));
        let noop = Arc::new(AtomicUsize::new(0));
        let steps = vec![
            Step::advisory("Flaky", counted(&noop, StepResult::failure("timed out"))),
            Step::fatal("Next", counted(&next, StepResult::ok())),
        ];

        let outcome = sequencer(&reporter).run(&steps).await;
        assert_eq!(outcome, FlowOutcome::Completed);
        assert_eq!(next.load(Ordering::SeqCst), 1);
        assert_eq!(reporter.warnings(), vec![("Flaky".to_string(), "timed out".to_string())]);
    }

    #[tokio::test]
    async fn failure_without_detail_gets_placeholder() {
        let reporter = Arc::new(RecordingReporter::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let bare = StepResult {
            succeeded: false,
            ..Default::default()
        };
        let steps = vec![Step::fatal("Bare", counted(&calls, bare))];

        let outcome = sequencer(&reporter).run(&steps).await;
        assert_eq!(
            outcome,
            FlowOutcome::FailedFatal {
                step: "Bare".into(),
                detail: "no details available".into()
            }
        );
    }

    #[tokio::test]
    async fn skipped_step_never_runs_and_is_not_a_failure() {
        let reporter = Arc::new(RecordingReporter::new());
        let skipped = Arc::new(AtomicUsize::new(0));
        let after = Arc::new(AtomicUsize::new(0));
        let steps = vec![
            Step::fatal("Skipped", counted(&skipped, StepResult::failure("never")))
                .skip_when(true),
            Step::fatal("Conditional", counted(&skipped, StepResult::failure("never")))
                .skip_if(|| async { true }),
            Step::fatal("After", counted(&after, StepResult::ok())),
        ];

        let outcome = sequencer(&reporter).run(&steps).await;
        assert_eq!(outcome, FlowOutcome::Completed);
        assert_eq!(skipped.load(Ordering::SeqCst), 0);
        assert_eq!(after.load(Ordering::SeqCst), 1);
        assert_eq!(reporter.status_of("Skipped"), Some(StepStatus::Skipped));
        assert_eq!(reporter.status_of("Conditional"), Some(StepStatus::Skipped));
        assert_eq!(reporter.begun(), vec!["After"]);
    }

    #[tokio::test]
    async fn false_predicate_runs_step() {
        let reporter = Arc::new(RecordingReporter::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let steps = vec![
            Step::fatal("Runs", counted(&calls, StepResult::ok())).skip_if(|| async { false }),
            Step::fatal("AlsoRuns", counted(&calls, StepResult::ok())).skip_when(false),
        ];

        assert_eq!(sequencer(&reporter).run(&steps).await, FlowOutcome::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn interrupt_during_fatal_step() {
        let reporter = Arc::new(RecordingReporter::new());
        let cancel = CancellationToken::new();
        let after = Arc::new(AtomicUsize::new(0));

        let token = cancel.clone();
        let steps = vec![
            Step::fatal("LongRunning", move || {
                let token = token.clone();
                async move {
                    token.cancel();
                    futures::future::pending::<StepResult>().await
                }
            }),
            Step::fatal("After", counted(&after, StepResult::ok())),
        ];

        let outcome = StepSequencer::new(reporter.clone(), cancel).run(&steps).await;
        assert_eq!(outcome, FlowOutcome::Interrupted);
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(after.load(Ordering::SeqCst), 0);
        assert_eq!(reporter.status_of("LongRunning"), Some(StepStatus::Interrupted));
    }

    #[tokio::test]
    async fn interrupt_beats_advisory_continuation() {
        let reporter = Arc::new(RecordingReporter::new());
        let cancel = CancellationToken::new();
        let after = Arc::new(AtomicUsize::new(0));

        let token = cancel.clone();
        let steps = vec![
            Step::advisory("Checks", move || {
                let token = token.clone();
                async move {
                    token.cancel();
                    StepResult::failure("checks failed")
                }
            }),
            Step::fatal("After", counted(&after, StepResult::ok())),
        ];

        let outcome = StepSequencer::new(reporter.clone(), cancel).run(&steps).await;
        assert_eq!(outcome, FlowOutcome::Interrupted);
        assert_eq!(after.load(Ordering::SeqCst), 0);
        assert!(reporter.warnings().is_empty());
    }

    #[tokio::test]
    async fn interrupt_during_skip_predicate() {
        let reporter = Arc::new(RecordingReporter::new());
        let cancel = CancellationToken::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let token = cancel.clone();
        let steps = vec![Step::fatal("Guarded", counted(&calls, StepResult::ok())).skip_if(
            move || {
                let token = token.clone();
                async move {
                    token.cancel();
                    futures::future::pending::<bool>().await
                }
            },
        )];

        let outcome = StepSequencer::new(reporter.clone(), cancel).run(&steps).await;
        assert_eq!(outcome, FlowOutcome::Interrupted);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn already_cancelled_runs_nothing() {
        let reporter = Arc::new(RecordingReporter::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let calls = Arc::new(AtomicUsize::new(0));
        let steps = vec![Step::fatal("First", counted(&calls, StepResult::ok()))];

        let outcome = StepSequencer::new(reporter.clone(), cancel).run(&steps).await;
        assert_eq!(outcome, FlowOutcome::Interrupted);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(reporter.events().is_empty());
    }

    #[tokio::test]
    async fn unreached_step_is_not_reported() {
        let reporter = Arc::new(RecordingReporter::new());
        let cancel = CancellationToken::new();
        let after = Arc::new(AtomicUsize::new(0));

        // the skip decision completes, then the interrupt lands before the next step
        let token = cancel.clone();
        let steps = vec![
            Step::fatal("Skipped", counted(&after, StepResult::ok())).skip_if(move || {
                let token = token.clone();
                async move {
                    token.cancel();
                    true
                }
            }),
            Step::fatal("Unreached", counted(&after, StepResult::ok())),
        ];

        let outcome = StepSequencer::new(reporter.clone(), cancel).run(&steps).await;
        assert_eq!(outcome, FlowOutcome::Interrupted);
        assert_eq!(after.load(Ordering::SeqCst), 0);
        assert_eq!(reporter.status_of("Skipped"), Some(StepStatus::Skipped));
        assert_eq!(reporter.status_of("Unreached"), None);
    }

    #[tokio::test]
    async fn empty_flow_completes() {
        let reporter = Arc::new(RecordingReporter::new());
        assert_eq!(sequencer(&reporter).run(&[]).await, FlowOutcome::Completed);
    }
}

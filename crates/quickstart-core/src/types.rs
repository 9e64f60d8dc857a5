use std::fmt;

use crate::error::QuickstartError;

/// Outcome of one step action or one external command.
///
/// A failed external process is data, not an error: callers inspect
/// `succeeded` instead of unwinding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepResult {
    pub succeeded: bool,
    pub output: Option<String>,
    pub error_detail: Option<String>,
}

impl StepResult {
    pub fn success(output: impl Into<String>) -> Self {
        let output = output.into();
        Self {
            succeeded: true,
            output: (!output.is_empty()).then_some(output),
            error_detail: None,
        }
    }

    pub fn ok() -> Self {
        Self {
            succeeded: true,
            output: None,
            error_detail: None,
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            output: None,
            error_detail: Some(detail.into()),
        }
    }

    /// Replace the failure detail, keeping captured output.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        if !self.succeeded {
            self.error_detail = Some(detail.into());
        }
        self
    }

    pub fn detail(&self) -> &str {
        self.error_detail.as_deref().unwrap_or("no details available")
    }
}

/// What a failing step does to the rest of its flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Abort the flow.
    Fatal,
    /// Warn and continue.
    Advisory,
}

impl fmt::Display for StepPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepPolicy::Fatal => write!(f, "fatal"),
            StepPolicy::Advisory => write!(f, "advisory"),
        }
    }
}

/// Final status of a single step within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    Skipped,
    Warned(String),
    Failed(String),
    Interrupted,
}

/// How a step presents itself. Every message is optional; a reporter
/// prints nothing for a missing one.
#[derive(Debug, Clone, Default)]
pub struct StepMessages {
    /// Shown next to a spinner while the action runs.
    pub running: Option<String>,
    pub succeeded: Option<String>,
    pub skipped: Option<String>,
    /// Prefix for the warning printed when an advisory step fails.
    pub warned: Option<String>,
    /// The action's child process owns the terminal while it runs.
    pub attached: bool,
}

impl StepMessages {
    pub fn running(mut self, text: impl Into<String>) -> Self {
        self.running = Some(text.into());
        self
    }

    pub fn succeeded(mut self, text: impl Into<String>) -> Self {
        self.succeeded = Some(text.into());
        self
    }

    pub fn skipped(mut self, text: impl Into<String>) -> Self {
        self.skipped = Some(text.into());
        self
    }

    pub fn warned(mut self, text: impl Into<String>) -> Self {
        self.warned = Some(text.into());
        self
    }

    pub fn attached(mut self) -> Self {
        self.attached = true;
        self
    }
}

/// Terminal value of a flow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    FailedFatal { step: String, detail: String },
    Interrupted,
}

impl FlowOutcome {
    /// Process exit code. An interrupt is a clean early exit.
    pub fn exit_code(&self) -> u8 {
        match self {
            FlowOutcome::Completed | FlowOutcome::Interrupted => 0,
            FlowOutcome::FailedFatal { .. } => 1,
        }
    }

    /// The error describing an early end, if the flow did not complete.
    pub fn error(&self) -> Option<QuickstartError> {
        match self {
            FlowOutcome::Completed => None,
            FlowOutcome::FailedFatal { step, detail } => Some(QuickstartError::StepExecution {
                step: step.clone(),
                detail: detail.clone(),
            }),
            FlowOutcome::Interrupted => Some(QuickstartError::Interrupted),
        }
    }
}

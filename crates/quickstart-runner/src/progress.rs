use std::io::IsTerminal;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use quickstart_core::traits::ProgressReporter;
use quickstart_core::types::{StepMessages, StepStatus};

const SPINNER_TEMPLATE: &str = "{spinner:.blue} {msg}";
const TICK: Duration = Duration::from_millis(80);

/// Reporter that prints nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn begin(&self, _step: &str, _messages: &StepMessages) {}

    fn end(&self, _step: &str, _status: &StepStatus, _messages: &StepMessages) {}
}

/// Console reporter: a transient spinner on stderr while a step with a
/// `running` message is in flight, and one status line per finished step.
///
/// Steps marked `attached` hand the terminal to their child process, so
/// their running message is printed as a plain line instead.
pub struct TerminalReporter {
    spinner: Mutex<Option<ProgressBar>>,
    animate: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            animate: std::io::stderr().is_terminal(),
        }
    }

    fn start_spinner(&self, text: &str) {
        let style = ProgressStyle::with_template(SPINNER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new_spinner();
        bar.set_style(style);
        bar.set_message(text.to_string());
        bar.enable_steady_tick(TICK);

        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(previous) = slot.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }

    fn clear_spinner(&self) {
        let bar = self.spinner.lock().ok().and_then(|mut slot| slot.take());
        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    }

    fn spinning(&self) -> bool {
        self.spinner
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for TerminalReporter {
    fn begin(&self, _step: &str, messages: &StepMessages) {
        let Some(ref text) = messages.running else {
            return;
        };
        if messages.attached || !self.animate {
            self.clear_spinner();
            println!();
            println!("{text}");
            return;
        }
        self.start_spinner(text);
    }

    fn end(&self, step: &str, status: &StepStatus, messages: &StepMessages) {
        self.clear_spinner();
        if let Some(line) = status_line(step, status, messages) {
            println!("{line}");
        }
    }
}

/// The line printed when a step finishes, if any.
pub fn status_line(step: &str, status: &StepStatus, messages: &StepMessages) -> Option<String> {
    match status {
        StepStatus::Succeeded => messages.succeeded.as_ref().map(|m| format!("✅ {m}")),
        StepStatus::Skipped => messages.skipped.as_ref().map(|m| format!("⏭️  {m}")),
        StepStatus::Warned(detail) => Some(match messages.warned {
            Some(ref prefix) => format!("⚠️  Warning: {prefix}: {detail}"),
            None => format!("⚠️  Warning: {step} failed: {detail}"),
        }),
        // Fatal failures and interrupts are reported once, by the caller.
        StepStatus::Failed(_) | StepStatus::Interrupted => None,
    }
}

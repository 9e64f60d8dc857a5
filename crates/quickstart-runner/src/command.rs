use std::process::Stdio;

use futures::future::BoxFuture;
use tracing::debug;

use quickstart_core::error::QuickstartError;
use quickstart_core::traits::CommandRunner;
use quickstart_core::types::StepResult;

const MAX_CAPTURE: usize = 30000;

/// Runs commands as child processes of this one, either captured or with
/// the terminal attached.
///
/// Children are killed if the future driving them is dropped, which is how
/// an interrupt tears down a step that is still running.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run<'a>(&'a self, program: &'a str, args: &'a [String]) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            debug!(program, ?args, "Spawning process");

            let output = tokio::process::Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output()
                .await;

            match output {
                Ok(output) => {
                    let stdout = capture(&output.stdout);
                    let stderr = capture(&output.stderr);

                    if output.status.success() {
                        debug!(program, "Process exited successfully");
                        StepResult::success(stdout)
                    } else {
                        let code = output.status.code().unwrap_or(-1);
                        debug!(program, code, "Process exited non-zero");
                        let detail = if stderr.is_empty() {
                            format!("{program} exited with code {code}")
                        } else {
                            stderr
                        };
                        StepResult {
                            succeeded: false,
                            output: (!stdout.is_empty()).then_some(stdout),
                            error_detail: Some(detail),
                        }
                    }
                }
                Err(e) => launch_failure(program, e),
            }
        })
    }

    fn run_attached<'a>(
        &'a self,
        program: &'a str,
        args: &'a [String],
    ) -> BoxFuture<'a, StepResult> {
        Box::pin(async move {
            debug!(program, ?args, "Spawning attached process");

            let status = tokio::process::Command::new(program)
                .args(args)
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .kill_on_drop(true)
                .status()
                .await;

            match status {
                Ok(status) if status.success() => StepResult::ok(),
                Ok(status) => {
                    let code = status.code().unwrap_or(-1);
                    debug!(program, code, "Attached process exited non-zero");
                    StepResult::failure(format!("{program} exited with code {code}"))
                }
                Err(e) => launch_failure(program, e),
            }
        })
    }
}

fn launch_failure(program: &str, e: std::io::Error) -> StepResult {
    debug!(program, error = %e, "Process failed to launch");
    StepResult::failure(
        QuickstartError::Spawn {
            command: program.to_string(),
            message: e.to_string(),
        }
        .to_string(),
    )
}

fn capture(bytes: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(bytes).trim().to_string();
    if text.len() > MAX_CAPTURE {
        let mut cut = MAX_CAPTURE;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("\n... (output truncated)");
    }
    text
}

mod doctor;
mod ui;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quickstart_core::config::AppConfig;
use quickstart_core::traits::CommandRunner;
use quickstart_core::types::FlowOutcome;
use quickstart_flows::quickstart::CHECK_RUNTIME;
use quickstart_flows::{
    ContributorOptions, ContributorSetupFlow, ProcessContributor, ProcessQuickstart,
    QuickstartFlow, QuickstartOptions,
};
use quickstart_runner::{ProcessRunner, StepSequencer, TerminalReporter};

const DEFAULT_CONFIG: &str = "quickstart.toml";
const QUICKSTART_ERROR: &str = "Error during quickstart";
const CONTRIBUTORS_ERROR: &str = "Error during contributor setup";
const CONTRIBUTORS_COMPLETE: &str = "🎉 Contributor environment setup complete!\n\n\
     What's been set up: Pre-commit hooks for automatic code formatting\n\
     Next steps: Make changes → Commit (pre-commit runs automatically)\n\
     Run `pre-commit run --all-files` to manually check all files";

#[derive(Parser)]
#[command(
    name = "quickstart",
    version,
    about = "Set up and run Skyvern with one command"
)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Skip starting PostgreSQL container
    #[arg(long)]
    no_postgres: bool,

    /// Skip Chromium browser installation
    #[arg(long)]
    skip_browser_install: bool,

    /// Only start the server, not the UI
    #[arg(long)]
    server_only: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set up development environment for contributors with pre-commit hooks
    Contributors {
        /// Skip running pre-commit on all files
        #[arg(long)]
        skip_run: bool,
    },
    /// Check the tools quickstart depends on
    Doctor {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quickstart=info,warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let prefix = error_prefix(cli.command.as_ref());

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            ui::error(&format!("{prefix}: {e:#}"));
            ExitCode::from(1)
        }
    }
}

fn error_prefix(command: Option<&Commands>) -> &'static str {
    match command {
        Some(Commands::Contributors { .. }) => CONTRIBUTORS_ERROR,
        _ => QUICKSTART_ERROR,
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new());

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "quickstart", &mut std::io::stdout());
            Ok(0)
        }
        Some(Commands::Doctor { json }) => {
            let config = load_config(&cli.config)?;
            if !json {
                println!("Quickstart Doctor");
                println!("=================");
            }
            doctor::run_doctor(&config, runner, json).await?;
            Ok(0)
        }
        Some(Commands::Contributors { skip_run }) => {
            let config = load_config(&cli.config)?;
            let options = ContributorOptions { skip_run };
            let outcome = run_contributors(&config, runner, options).await;
            Ok(outcome.exit_code())
        }
        None => {
            let config = load_config(&cli.config)?;
            let options = QuickstartOptions {
                no_postgres: cli.no_postgres,
                skip_browser_install: cli.skip_browser_install,
                server_only: cli.server_only,
            };
            let outcome = run_quickstart(&config, runner, options).await;
            Ok(outcome.exit_code())
        }
    }
}

/// The default path is optional; a path given with `--config` must exist.
fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let explicit = path != Path::new(DEFAULT_CONFIG);
    let config = AppConfig::load_or_default(path, explicit)?;
    if path.exists() {
        info!(path = %path.display(), "Loaded config");
    }
    Ok(config)
}

/// Cancelled on Ctrl-C. Installing the handler also stops SIGINT from
/// killing the process outright, so the flow can wind down cleanly.
fn interrupt_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received");
            token.cancel();
        }
    });
    cancel
}

async fn run_quickstart(
    config: &AppConfig,
    runner: Arc<dyn CommandRunner>,
    options: QuickstartOptions,
) -> FlowOutcome {
    ui::panel(None, "🚀 Starting Skyvern Quickstart");

    let actions = Arc::new(ProcessQuickstart::new(runner, config));
    let flow = QuickstartFlow::new(options, actions);
    let sequencer = StepSequencer::new(Arc::new(TerminalReporter::new()), interrupt_token());
    let outcome = flow.run(&sequencer).await;
    if let Some(err) = outcome.error() {
        info!(error = %err, "Quickstart ended early");
    }

    quickstart_notice(&outcome).show();
    outcome
}

async fn run_contributors(
    config: &AppConfig,
    runner: Arc<dyn CommandRunner>,
    options: ContributorOptions,
) -> FlowOutcome {
    ui::panel(None, "🚀 Setting up Skyvern Contributor Environment");

    let actions = Arc::new(ProcessContributor::new(runner, config));
    let flow = ContributorSetupFlow::new(options, actions);
    let sequencer = StepSequencer::new(Arc::new(TerminalReporter::new()), interrupt_token());
    let outcome = flow.run(&sequencer).await;
    if let Some(err) = outcome.error() {
        info!(error = %err, "Contributor setup ended early");
    }

    contributors_notice(&outcome).show();
    outcome
}

/// What the user is told once a flow has ended.
#[derive(Debug, PartialEq, Eq)]
enum Notice {
    Panel {
        title: Option<&'static str>,
        body: String,
    },
    Heading(&'static str),
    Error(String),
    Warning(&'static str),
}

impl Notice {
    fn show(&self) {
        match self {
            Notice::Panel { title, body } => ui::panel(*title, body),
            Notice::Heading(text) => ui::heading(text),
            Notice::Error(text) => ui::error(text),
            Notice::Warning(text) => ui::warning(text),
        }
    }
}

fn quickstart_notice(outcome: &FlowOutcome) -> Notice {
    match outcome {
        FlowOutcome::Completed => Notice::Heading("Skyvern quickstart complete."),
        // The runtime message carries its own install instructions.
        FlowOutcome::FailedFatal { step, detail } if step == CHECK_RUNTIME => Notice::Panel {
            title: None,
            body: detail.clone(),
        },
        FlowOutcome::FailedFatal { detail, .. } => {
            Notice::Error(format!("{QUICKSTART_ERROR}: {detail}"))
        }
        FlowOutcome::Interrupted => Notice::Warning("Quickstart process interrupted by user."),
    }
}

fn contributors_notice(outcome: &FlowOutcome) -> Notice {
    match outcome {
        FlowOutcome::Completed => Notice::Panel {
            title: Some("🛠️ Development Setup Complete"),
            body: CONTRIBUTORS_COMPLETE.to_string(),
        },
        FlowOutcome::FailedFatal { detail, .. } => {
            Notice::Error(format!("{CONTRIBUTORS_ERROR}: {detail}"))
        }
        FlowOutcome::Interrupted => Notice::Warning("Setup interrupted by user."),
    }
}

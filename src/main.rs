use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::error;
use parking_lot::Mutex;

use addonup::cli;
use addonup::config::Settings;
use addonup::logging::{self, LogConfig, LogDestination, LogFormat};
use addonup::registry::RepositoryRegistry;
use addonup::updater::{
    ControllerOutcome, OrchestratorState, RateLimiter, UpdateController, UpdatePrompt,
};
use addonup::worker::TaskWorker;

/// How the console prompt answers the update dialogs
#[derive(Debug, Clone, Copy)]
enum PromptMode {
    /// Ask on stdin
    Interactive,
    /// Consent without asking (--yes)
    AssumeYes,
    /// Report pending updates and decline (--check-only)
    CheckOnly,
}

/// Terminal stand-in for the front-end's dialog screens
struct ConsolePrompt {
    mode: PromptMode,
}

impl ConsolePrompt {
    fn ask_yes_no(question: &str) -> bool {
        eprint!("{} [y/N] ", question);
        let _ = io::stderr().flush();

        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

#[async_trait]
impl UpdatePrompt for ConsolePrompt {
    async fn confirm_updates(&self, pending_count: usize, names: &str) -> bool {
        println!("Updates available for {} addon(s):\n{}", pending_count, names);
        match self.mode {
            PromptMode::Interactive => Self::ask_yes_no("Do you want to update these addons?"),
            PromptMode::AssumeYes => true,
            PromptMode::CheckOnly => false,
        }
    }

    async fn report_applied(&self, applied_count: usize, pending_count: usize, names: &str) {
        println!(
            "Following addons were updated ({}/{}):\n{}",
            applied_count, pending_count, names
        );
    }

    async fn confirm_restart(&self) -> bool {
        match self.mode {
            PromptMode::Interactive => {
                Self::ask_yes_no("The front-end needs a restart. Restart it now?")
            }
            // non-interactive runs leave the restart to the host
            _ => false,
        }
    }

    async fn first_run_notice(&self) {
        println!(
            "This is the first time you started addonup.\n\
             Check that all necessary video plugins are installed."
        );
    }
}

fn main() {
    if let Err(e) = run() {
        error!("Application error: {}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = cli::parse_args();
    cli::validate_args(&args)?;

    let log_config = LogConfig {
        console_level: cli::console_level(&args),
        file_level: match &args.log_file_level {
            Some(level) => Some(logging::parse_log_level(level)?),
            None => args.log_file.as_ref().map(|_| log::LevelFilter::Debug),
        },
        format: args.log_format.parse::<LogFormat>().map_err(anyhow::Error::msg)?,
        destination: match &args.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Console,
        },
    };
    logging::init_logger(log_config)?;

    let settings = Settings::load(args.config_file.as_deref())?;

    let repositories_dir: PathBuf = args
        .repositories
        .as_ref()
        .map(PathBuf::from)
        .or_else(|| settings.repositories_dir.clone())
        .context("No repositories directory given (argument or repositories-dir setting)")?;

    let mode = if args.check_only {
        PromptMode::CheckOnly
    } else if args.yes {
        PromptMode::AssumeYes
    } else {
        PromptMode::Interactive
    };

    // Multi-threaded runtime so repository checks fan out across worker
    // threads instead of queueing behind each other.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let registry = Arc::new(RepositoryRegistry::new(repositories_dir));
        let state = Arc::new(Mutex::new(OrchestratorState::new(RateLimiter::new(
            settings.cooldown(),
        ))));
        let worker = Arc::new(TaskWorker::new());
        let prompt = Arc::new(ConsolePrompt { mode });

        let mut controller = UpdateController::new(
            settings,
            Arc::clone(&registry),
            state,
            prompt,
            Arc::clone(&worker),
        );

        let outcome = controller.run().await?;
        match outcome {
            ControllerOutcome::OpenContent => {
                log::debug!(
                    "content screen open with {} repositories",
                    registry.repositories().len()
                );
                // a host GUI would keep the screen open here; we close it
                // again immediately, which drains and stops the worker
                controller.close_content_screen().await;
            }
            ControllerOutcome::Restart => {
                println!("Restart accepted - hand off to the process restart mechanism.");
            }
            ControllerOutcome::RestartDeferred => {
                println!("Restart deferred - updates take effect after the next restart.");
            }
        }
        Ok(())
    })
}

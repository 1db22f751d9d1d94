// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printdesk: print and scan through the operating system's native tools.
//
// Entry point. Initialises logging, loads configuration once, merges the
// operator's --printer/--scanner overrides, selects the platform backends and
// hands them to the job orchestrator.

mod cli;
mod output;
mod shell;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use printdesk_core::command::{CommandRunner, SystemRunner};
use printdesk_core::config::Config;
use printdesk_core::error::Result;
use printdesk_core::human_errors::humanize_error;
use printdesk_core::types::Platform;
use printdesk_security::{CredentialVerifier, LoginOutcome, Session};
use printdesk_service::{Backends, DeviceInventory, JobOrchestrator, JobReport};
use tracing::{error, info, warn};

use cli::{Cli, Commands, Credentials};
use output::OutputWriter;
use shell::{ShellSession, supervise};

const SHELL_RESTART_DELAY: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!(config = %cli.config.display(), "printdesk starting");

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            let human = humanize_error(&e);
            error!(error = %e, "printdesk failed");
            eprintln!("error: {}\n  hint: {}", human.message, human.suggestion);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let platform = Platform::current();
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let output = OutputWriter::new(cli.json);

    if let Commands::Devices = cli.command {
        let inventory = DeviceInventory::discover(platform, runner).await;
        output.to_stdout(&inventory)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load(&cli.config)?.with_overrides(&cli.overrides(), platform);
    config.storage.ensure_directories()?;

    let verifier = CredentialVerifier::from_config(&config.server);
    let backends = Backends::for_platform(platform, &config, runner);
    let orchestrator = Arc::new(JobOrchestrator::new(Arc::new(config), backends));

    let report = match cli.command {
        Commands::Print(args) => {
            let session = one_shot_session(&verifier, &args.credentials);
            JobReport::from_print(&orchestrator.print(&session, args.files).await)
        }
        Commands::Scan(args) => {
            let session = one_shot_session(&verifier, &args.credentials);
            JobReport::from_scan(&orchestrator.scan(&session, args.mode.into()).await)
        }
        Commands::Shell => {
            supervise(SHELL_RESTART_DELAY, move |attempt| {
                let mut session = ShellSession::new(orchestrator.clone(), verifier.clone(), output);
                async move {
                    if attempt > 0 {
                        info!(attempt, "starting new shell session");
                    }
                    let input = tokio::io::BufReader::new(tokio::io::stdin());
                    let mut out = tokio::io::stdout();
                    session.run(input, &mut out).await
                }
            })
            .await;
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Devices => return Ok(ExitCode::SUCCESS),
    };

    output.to_stdout(&report)?;
    Ok(if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Session for a single CLI job. Bad credentials leave it anonymous, so the
/// job then fails at the auth gate if login is required.
fn one_shot_session(verifier: &CredentialVerifier, credentials: &Credentials) -> Session {
    let mut session = Session::anonymous();
    if let Some(username) = credentials.username.as_deref() {
        let password = credentials.password.as_deref().unwrap_or_default();
        if let LoginOutcome::InvalidCredentials = session.login(verifier, username, password) {
            warn!(username, "one-shot login rejected");
            eprintln!("{}", LoginOutcome::InvalidCredentials);
        }
    }
    session
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive line session.
//
// Each session owns its login state; a restarted session starts logged out.
// The supervisor runs sessions as tasks and starts a fresh one whenever a
// session fails or panics, until one ends normally.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use printdesk_core::error::Result;
use printdesk_core::types::ColorMode;
use printdesk_security::{CredentialVerifier, Session};
use printdesk_service::{JobOrchestrator, JobReport};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use crate::output::OutputWriter;

const HELP: &str = "\
Commands:
  login <username> <password>
  logout
  print <file> [<file>...]
  scan [color|gray|lineart]
  status
  help
  quit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Login { username: String, password: String },
    Logout,
    Print(Vec<PathBuf>),
    Scan(ColorMode),
    Status,
    Help,
    Quit,
    Empty,
}

/// Split on whitespace, keeping double-quoted runs together.
fn tokenize(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut pending = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                pending = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if pending {
                    tokens.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if in_quotes {
        return Err("unterminated quote".into());
    }
    if pending {
        tokens.push(current);
    }
    Ok(tokens)
}

pub fn parse_line(line: &str) -> std::result::Result<ShellCommand, String> {
    let tokens = tokenize(line)?;
    let Some((head, rest)) = tokens.split_first() else {
        return Ok(ShellCommand::Empty);
    };

    match (head.to_ascii_lowercase().as_str(), rest) {
        ("login", [username, password]) => Ok(ShellCommand::Login {
            username: username.clone(),
            password: password.clone(),
        }),
        ("login", _) => Err("usage: login <username> <password>".into()),
        ("logout", []) => Ok(ShellCommand::Logout),
        ("print", []) => Err("usage: print <file> [<file>...]".into()),
        ("print", files) => Ok(ShellCommand::Print(files.iter().map(PathBuf::from).collect())),
        ("scan", []) => Ok(ShellCommand::Scan(ColorMode::Color)),
        ("scan", [mode]) => Ok(ShellCommand::Scan(ColorMode::parse_lenient(mode))),
        ("status", []) => Ok(ShellCommand::Status),
        ("help" | "?", _) => Ok(ShellCommand::Help),
        ("quit" | "exit", _) => Ok(ShellCommand::Quit),
        (other, _) => Err(format!("unknown command '{other}', type 'help'")),
    }
}

/// How a session finished without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    EndOfInput,
}

pub struct ShellSession {
    orchestrator: Arc<JobOrchestrator>,
    verifier: CredentialVerifier,
    output: OutputWriter,
    session: Session,
}

impl ShellSession {
    pub fn new(
        orchestrator: Arc<JobOrchestrator>,
        verifier: CredentialVerifier,
        output: OutputWriter,
    ) -> Self {
        Self {
            orchestrator,
            verifier,
            output,
            session: Session::anonymous(),
        }
    }

    /// Read commands until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<SessionEnd>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        out.write_all(b"printdesk shell, type 'help' for commands\n").await?;

        loop {
            out.write_all(b"> ").await?;
            out.flush().await?;

            let Some(line) = lines.next_line().await? else {
                return Ok(SessionEnd::EndOfInput);
            };

            let reply = match parse_line(&line) {
                Ok(ShellCommand::Quit) => return Ok(SessionEnd::Quit),
                Ok(ShellCommand::Empty) => continue,
                Ok(command) => self.execute(command).await?,
                Err(usage) => usage,
            };
            out.write_all(reply.trim_end().as_bytes()).await?;
            out.write_all(b"\n").await?;
        }
    }

    /// Run one command and return the text to show.
    pub async fn execute(&mut self, command: ShellCommand) -> Result<String> {
        let text = match command {
            ShellCommand::Login { username, password } => {
                self.session.login(&self.verifier, &username, &password).to_string()
            }
            ShellCommand::Logout => self.session.logout().to_string(),
            ShellCommand::Print(files) => {
                let outcome = self.orchestrator.print(&self.session, files).await;
                self.output.to_string(&JobReport::from_print(&outcome))?
            }
            ShellCommand::Scan(mode) => {
                let outcome = self.orchestrator.scan(&self.session, mode).await;
                self.output.to_string(&JobReport::from_scan(&outcome))?
            }
            ShellCommand::Status => self.status(),
            ShellCommand::Help => HELP.to_owned(),
            ShellCommand::Quit | ShellCommand::Empty => String::new(),
        };
        Ok(text)
    }

    fn status(&self) -> String {
        let config = self.orchestrator.config();
        let (print_backend, scan_backend) = self.orchestrator.backend_names();
        let user = match self.session.username() {
            Some(name) => format!("logged in as {name}"),
            None if self.orchestrator.auth_gate().is_required() => {
                "not logged in (login required)".to_owned()
            }
            None => "not logged in".to_owned(),
        };
        let scanner = config
            .scanning
            .unix_device_name
            .clone()
            .or_else(|| config.scanning.device_num.map(|n| n.to_string()))
            .unwrap_or_else(|| "(not configured)".to_owned());

        let printer = config.printing.default_printer.as_deref().unwrap_or("(system default)");
        [
            format!("Session: {user}"),
            format!("Printer: {printer} via {print_backend}"),
            format!("Scanner: {scanner} via {scan_backend}"),
            format!("Scans saved to: {}", config.storage.scan_dir.display()),
        ]
        .join("\n")
    }
}

/// Run sessions made by `make` until one ends normally.
///
/// A session that returns an error or panics is logged and replaced after
/// `delay`. `make` receives the attempt number, starting at 0.
pub async fn supervise<F, Fut>(delay: Duration, mut make: F) -> SessionEnd
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<SessionEnd>> + Send + 'static,
{
    let mut attempt = 0u32;
    loop {
        match tokio::spawn(make(attempt)).await {
            Ok(Ok(end)) => {
                info!(?end, attempt, "shell session ended");
                return end;
            }
            Ok(Err(e)) => error!(error = %e, attempt, "shell session failed, restarting"),
            Err(join) if join.is_panic() => error!(attempt, "shell session crashed, restarting"),
            Err(join) => warn!(error = %join, attempt, "shell session cancelled, restarting"),
        }
        attempt = attempt.saturating_add(1);
        tokio::time::sleep(delay).await;
    }
}

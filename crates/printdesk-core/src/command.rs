// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Subprocess execution for the native print/scan tools.
//
// Every backend talks to the OS through a `CommandRunner`. The system runner
// spawns the tool with stdin closed and stderr captured, optionally redirects
// stdout straight into a file (scan capture), and bounds the whole run with a
// timeout. The child is killed when the timeout fires.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::PrintdeskError;

/// Where the child's standard output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StdoutTarget {
    /// Buffer in memory and return in [`CommandOutput::stdout`].
    Capture,
    /// Create (truncate) this file and stream stdout into it.
    File(PathBuf),
}

/// A fully described invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub stdout: StdoutTarget,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            stdout: StdoutTarget::Capture,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = StdoutTarget::File(path.into());
        self
    }

    /// Program and arguments joined for log output.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Program used to reach Windows automation (spooler, shell verbs, WIA).
pub const POWERSHELL: &str = "powershell";

/// Build a non-interactive PowerShell invocation of `script`.
pub fn powershell(script: impl Into<String>, timeout: Duration) -> CommandSpec {
    CommandSpec::new(POWERSHELL, timeout).args([
        "-NoProfile".to_owned(),
        "-NonInteractive".to_owned(),
        "-ExecutionPolicy".to_owned(),
        "Bypass".to_owned(),
        "-Command".to_owned(),
        script.into(),
    ])
}

/// Quote `value` as a single-quoted PowerShell string literal.
pub fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Result of a command that ran to completion (successfully or not).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Best diagnostic text: trimmed stderr, falling back to trimmed stdout.
    pub fn diagnostic(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Failures that prevented a command from producing an exit status.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{program}: command not found")]
    NotFound { program: String },

    #[error("{program} timed out after {}s", .after.as_secs())]
    TimedOut { program: String, after: Duration },

    #[error("{program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Convert into the service error taxonomy. `not_found_message` is the
    /// actionable text shown when the tool is not installed.
    pub fn into_job_error(self, not_found_message: &str) -> PrintdeskError {
        match self {
            Self::NotFound { .. } => PrintdeskError::Configuration(not_found_message.to_owned()),
            Self::TimedOut { program, after } => PrintdeskError::Timeout {
                tool: program,
                secs: after.as_secs(),
            },
            Self::Io { program, source } => {
                PrintdeskError::device(program.clone(), format!("{program}: {source}"))
            }
        }
    }
}

/// Runs OS commands on behalf of a backend.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError>;
}

/// Runner backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
        let io_err = |source: std::io::Error| CommandError::Io {
            program: spec.program.clone(),
            source,
        };

        let mut cmd = tokio::process::Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        match &spec.stdout {
            StdoutTarget::Capture => {
                cmd.stdout(Stdio::piped());
            }
            StdoutTarget::File(path) => {
                let file = std::fs::File::create(path).map_err(io_err)?;
                cmd.stdout(Stdio::from(file));
            }
        }

        debug!(command = %spec.command_line(), timeout_secs = spec.timeout.as_secs(), "spawning");

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                // Don't leave the empty capture file behind for a tool that never ran.
                if let StdoutTarget::File(path) = &spec.stdout {
                    let _ = std::fs::remove_file(path);
                }
                return Err(if e.kind() == std::io::ErrorKind::NotFound {
                    CommandError::NotFound {
                        program: spec.program.clone(),
                    }
                } else {
                    io_err(e)
                });
            }
        };

        let output = tokio::time::timeout(spec.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                warn!(program = %spec.program, "command timed out, killing");
                CommandError::TimedOut {
                    program: spec.program.clone(),
                    after: spec.timeout,
                }
            })?
            .map_err(io_err)?;

        let result = CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(program = %spec.program, code = ?result.code, "command finished");
        Ok(result)
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod testing {
    //! Scripted runner: replays queued responses and records every spec.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// One queued response.
    #[derive(Debug, Clone)]
    pub enum Scripted {
        /// Exit with `code`; `file_bytes` is written to the stdout file, if any.
        Exit {
            code: i32,
            stdout: String,
            stderr: String,
            file_bytes: Option<Vec<u8>>,
        },
        NotFound,
        TimedOut,
    }

    /// Replays [`Scripted`] responses in order. Once the queue is empty every
    /// call succeeds with empty output.
    #[derive(Debug, Default)]
    pub struct ScriptedRunner {
        responses: Mutex<VecDeque<Scripted>>,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl ScriptedRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push(&self, response: Scripted) -> &Self {
            self.responses
                .lock()
                .expect("responses lock")
                .push_back(response);
            self
        }

        pub fn push_success(&self, stdout: &str) -> &Self {
            self.push(Scripted::Exit {
                code: 0,
                stdout: stdout.to_owned(),
                stderr: String::new(),
                file_bytes: None,
            })
        }

        pub fn push_failure(&self, code: i32, stderr: &str) -> &Self {
            self.push(Scripted::Exit {
                code,
                stdout: String::new(),
                stderr: stderr.to_owned(),
                file_bytes: None,
            })
        }

        /// Succeed and write `bytes` to the command's stdout file.
        pub fn push_file_output(&self, bytes: Vec<u8>) -> &Self {
            self.push(Scripted::Exit {
                code: 0,
                stdout: String::new(),
                stderr: String::new(),
                file_bytes: Some(bytes),
            })
        }

        pub fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().expect("calls lock").clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().expect("calls lock").len()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandError> {
            self.calls.lock().expect("calls lock").push(spec.clone());
            let next = self.responses.lock().expect("responses lock").pop_front();
            match next {
                None => Ok(CommandOutput {
                    success: true,
                    code: Some(0),
                    ..CommandOutput::default()
                }),
                Some(Scripted::NotFound) => Err(CommandError::NotFound {
                    program: spec.program.clone(),
                }),
                Some(Scripted::TimedOut) => Err(CommandError::TimedOut {
                    program: spec.program.clone(),
                    after: spec.timeout,
                }),
                Some(Scripted::Exit {
                    code,
                    stdout,
                    stderr,
                    file_bytes,
                }) => {
                    if let StdoutTarget::File(path) = &spec.stdout {
                        let bytes = file_bytes.unwrap_or_default();
                        std::fs::write(path, bytes).map_err(|source| CommandError::Io {
                            program: spec.program.clone(),
                            source,
                        })?;
                    }
                    Ok(CommandOutput {
                        success: code == 0,
                        code: Some(code),
                        stdout,
                        stderr,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_prefers_stderr() {
        let out = CommandOutput {
            success: false,
            code: Some(1),
            stdout: "request id is lp-1\n".into(),
            stderr: "  lp: The printer or class does not exist.\n".into(),
        };
        assert_eq!(out.diagnostic(), "lp: The printer or class does not exist.");

        let out = CommandOutput {
            stderr: " \n".into(),
            ..out
        };
        assert_eq!(out.diagnostic(), "request id is lp-1");
    }

    #[test]
    fn not_found_maps_to_configuration() {
        let err = CommandError::NotFound {
            program: "lp".into(),
        }
        .into_job_error("install CUPS");
        assert!(matches!(err, PrintdeskError::Configuration(ref m) if m == "install CUPS"));
    }

    #[test]
    fn timeout_maps_to_timeout() {
        let err = CommandError::TimedOut {
            program: "scanimage".into(),
            after: Duration::from_secs(30),
        }
        .into_job_error("unused");
        assert!(
            matches!(err, PrintdeskError::Timeout { ref tool, secs: 30 } if tool == "scanimage")
        );
    }

    #[test]
    fn command_line_joins_args() {
        let spec = CommandSpec::new("lp", Duration::from_secs(1)).args(["-d", "Office", "a.pdf"]);
        assert_eq!(spec.command_line(), "lp -d Office a.pdf");
    }

    #[test]
    fn ps_quote_escapes_single_quotes() {
        assert_eq!(ps_quote("C:\\scans\\a.jpg"), "'C:\\scans\\a.jpg'");
        assert_eq!(ps_quote("Bob's Printer"), "'Bob''s Printer'");
    }

    #[test]
    fn powershell_spec_is_non_interactive() {
        let spec = powershell("Get-Printer", Duration::from_secs(10));
        assert_eq!(spec.program, POWERSHELL);
        assert!(spec.args.contains(&"-NonInteractive".to_owned()));
        assert_eq!(spec.args.last().map(String::as_str), Some("Get-Printer"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_captures_output() {
        let spec = CommandSpec::new("sh", Duration::from_secs(5))
            .args(["-c", "echo out; echo err >&2; exit 3"]);
        let out = SystemRunner.run(&spec).await.expect("run");
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "err");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_streams_stdout_to_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("capture.bin");
        let spec = CommandSpec::new("sh", Duration::from_secs(5))
            .args(["-c", "printf scanned"])
            .stdout_to(&target);
        let out = SystemRunner.run(&spec).await.expect("run");
        assert!(out.success);
        assert_eq!(std::fs::read_to_string(&target).expect("read"), "scanned");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_reports_missing_program() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("never.jpg");
        let spec =
            CommandSpec::new("printdesk-no-such-tool", Duration::from_secs(5)).stdout_to(&target);
        let err = SystemRunner.run(&spec).await.unwrap_err();
        assert!(matches!(err, CommandError::NotFound { .. }));
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn system_runner_kills_on_timeout() {
        let spec = CommandSpec::new("sleep", Duration::from_millis(100)).arg("5");
        let err = SystemRunner.run(&spec).await.unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }));
    }

    #[tokio::test]
    async fn scripted_runner_replays_in_order() {
        use testing::ScriptedRunner;

        let runner = ScriptedRunner::new();
        runner.push_success("first").push_failure(2, "second");
        let spec = CommandSpec::new("tool", Duration::from_secs(1));

        let a = runner.run(&spec).await.expect("first");
        let b = runner.run(&spec).await.expect("second");
        let c = runner.run(&spec).await.expect("default");

        assert_eq!(a.stdout, "first");
        assert!(!b.success);
        assert!(c.success);
        assert_eq!(runner.call_count(), 3);
    }
}

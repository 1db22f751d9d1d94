// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// CUPS print backend for POSIX systems.
//
// Each file is submitted with one `lp` invocation, strictly in order. The
// first failing submission aborts the rest of the job. Without a configured
// printer the `-d` flag is omitted and CUPS picks its own default.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use printdesk_core::command::{CommandRunner, CommandSpec};
use printdesk_core::error::{PrintdeskError, Result};
use tracing::{debug, info, instrument, warn};

use crate::backend::{Delivery, PrintBackend, PrintReceipt};

/// CUPS submission tool.
pub const LP: &str = "lp";

const LP_NOT_FOUND: &str =
    "Printing command 'lp' not found. Install CUPS or configure printing manually.";

/// Prints through `lp`.
pub struct CupsPrintBackend {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl CupsPrintBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    fn submit_command(&self, path: &std::path::Path, printer: Option<&str>) -> CommandSpec {
        let mut spec = CommandSpec::new(LP, self.timeout);
        if let Some(printer) = printer {
            spec = spec.args(["-d", printer]);
        }
        spec.arg(path.to_string_lossy())
    }
}

#[async_trait]
impl PrintBackend for CupsPrintBackend {
    fn name(&self) -> &'static str {
        "cups"
    }

    #[instrument(skip(self, paths), fields(files = paths.len()))]
    async fn print_files(&self, paths: &[PathBuf], printer: Option<&str>) -> Result<PrintReceipt> {
        if paths.is_empty() {
            debug!("empty print job");
            return Ok(PrintReceipt::empty());
        }

        for path in paths {
            let spec = self.submit_command(path, printer);
            let output = self
                .runner
                .run(&spec)
                .await
                .map_err(|e| e.into_job_error(LP_NOT_FOUND))?;

            if !output.success {
                warn!(path = %path.display(), code = ?output.code, "lp rejected file");
                return Err(PrintdeskError::device(
                    LP,
                    format!("Error printing {}: {}", path.display(), output.diagnostic()),
                ));
            }
            debug!(path = %path.display(), response = output.stdout.trim(), "file spooled");
        }

        let message = match printer {
            Some(name) => format!("Files sent to printer {name}"),
            None => "Files sent to printer".to_owned(),
        };
        info!(files = paths.len(), "print job spooled");

        Ok(PrintReceipt {
            printer: printer.map(str::to_owned),
            files: paths.to_vec(),
            delivery: Delivery::Spooled,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printdesk_core::command::testing::{Scripted, ScriptedRunner};

    fn backend(runner: &Arc<ScriptedRunner>) -> CupsPrintBackend {
        CupsPrintBackend::new(runner.clone(), Duration::from_secs(30))
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[tokio::test]
    async fn submits_each_file_with_destination() {
        let runner = Arc::new(ScriptedRunner::new());
        let receipt = backend(&runner)
            .print_files(&paths(&["/tmp/a.pdf", "/tmp/b.pdf"]), Some("Office"))
            .await
            .expect("print");

        assert_eq!(receipt.message, "Files sent to printer Office");
        assert_eq!(receipt.delivery, Delivery::Spooled);

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].program, "lp");
        assert_eq!(calls[0].args, vec!["-d", "Office", "/tmp/a.pdf"]);
        assert_eq!(calls[1].args, vec!["-d", "Office", "/tmp/b.pdf"]);
    }

    #[tokio::test]
    async fn omits_destination_without_printer() {
        let runner = Arc::new(ScriptedRunner::new());
        let receipt = backend(&runner)
            .print_files(&paths(&["/tmp/a.pdf"]), None)
            .await
            .expect("print");

        assert_eq!(receipt.message, "Files sent to printer");
        assert_eq!(runner.calls()[0].args, vec!["/tmp/a.pdf"]);
    }

    #[tokio::test]
    async fn failure_aborts_remaining_files() {
        let runner = Arc::new(ScriptedRunner::new());
        runner
            .push_success("request id is Office-1 (1 file(s))")
            .push_failure(1, "lp: Error - unable to access \"/tmp/b.pdf\"");

        let err = backend(&runner)
            .print_files(&paths(&["/tmp/a.pdf", "/tmp/b.pdf", "/tmp/c.pdf"]), None)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error printing /tmp/b.pdf: lp: Error - unable to access \"/tmp/b.pdf\""
        );
        assert_eq!(runner.call_count(), 2);
    }

    #[tokio::test]
    async fn missing_lp_is_configuration_error() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push(Scripted::NotFound);

        let err = backend(&runner)
            .print_files(&paths(&["/tmp/a.pdf", "/tmp/b.pdf"]), None)
            .await
            .unwrap_err();

        assert!(matches!(err, PrintdeskError::Configuration(_)));
        assert!(err.to_string().contains("Install CUPS"));
        assert_eq!(runner.call_count(), 1);
    }

    #[tokio::test]
    async fn hung_lp_is_timeout() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push(Scripted::TimedOut);

        let err = backend(&runner)
            .print_files(&paths(&["/tmp/a.pdf"]), None)
            .await
            .unwrap_err();

        assert!(matches!(err, PrintdeskError::Timeout { secs: 30, .. }));
    }

    #[tokio::test]
    async fn empty_job_spawns_nothing() {
        let runner = Arc::new(ScriptedRunner::new());
        let receipt = backend(&runner).print_files(&[], Some("Office")).await.expect("print");
        assert_eq!(receipt.delivery, Delivery::Empty);
        assert_eq!(runner.call_count(), 0);
    }
}

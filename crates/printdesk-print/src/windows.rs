// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Windows print backend.
//
// Files are handed to the shell's "print" verb for their registered
// application, with the destination printer passed as `/d:"<name>"`. The
// shell returns as soon as the verb is dispatched, so this backend can only
// acknowledge submission: it never learns whether a page came out.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use printdesk_core::command::{CommandRunner, CommandSpec, POWERSHELL, powershell, ps_quote};
use printdesk_core::error::{PrintdeskError, Result};
use tracing::{debug, info, instrument, warn};

use crate::backend::{Delivery, PrintBackend, PrintReceipt};

const POWERSHELL_NOT_FOUND: &str =
    "PowerShell not found. Windows printing needs powershell.exe on the PATH.";

const DEFAULT_PRINTER_QUERY: &str =
    "(Get-CimInstance -ClassName Win32_Printer -Filter 'Default=TRUE' | Select-Object -First 1).Name";

/// Ask the spooler for the default printer. `Ok(None)` when none is set.
pub async fn query_default_printer(
    runner: &dyn CommandRunner,
    timeout: Duration,
) -> Result<Option<String>> {
    let output = runner
        .run(&powershell(DEFAULT_PRINTER_QUERY, timeout))
        .await
        .map_err(|e| e.into_job_error(POWERSHELL_NOT_FOUND))?;

    if !output.success {
        return Err(PrintdeskError::device(
            POWERSHELL,
            format!("Could not query the default printer: {}", output.diagnostic()),
        ));
    }

    let name = output.stdout.trim();
    Ok((!name.is_empty()).then(|| name.to_owned()))
}

/// Prints through the Windows shell "print" verb.
pub struct ShellPrintBackend {
    runner: Arc<dyn CommandRunner>,
    timeout: Duration,
}

impl ShellPrintBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Duration) -> Self {
        Self { runner, timeout }
    }

    fn print_verb_command(&self, path: &Path, printer: &str) -> CommandSpec {
        let script = format!(
            "Start-Process -FilePath {} -Verb Print -ArgumentList {} -WindowStyle Hidden",
            ps_quote(&path.to_string_lossy()),
            ps_quote(&format!("/d:\"{printer}\"")),
        );
        powershell(script, self.timeout)
    }

    async fn resolve_printer(&self, configured: Option<&str>) -> Result<String> {
        if let Some(name) = configured {
            return Ok(name.to_owned());
        }
        match query_default_printer(self.runner.as_ref(), self.timeout).await? {
            Some(name) => {
                debug!(printer = %name, "using Windows default printer");
                Ok(name)
            }
            None => Err(PrintdeskError::Configuration(
                "No printer configured (printing.default_printer) and Windows has no default printer."
                    .into(),
            )),
        }
    }
}

#[async_trait]
impl PrintBackend for ShellPrintBackend {
    fn name(&self) -> &'static str {
        "windows-shell"
    }

    #[instrument(skip(self, paths), fields(files = paths.len()))]
    async fn print_files(&self, paths: &[PathBuf], printer: Option<&str>) -> Result<PrintReceipt> {
        if paths.is_empty() {
            debug!("empty print job");
            return Ok(PrintReceipt::empty());
        }

        let printer = self.resolve_printer(printer).await?;

        for path in paths {
            let spec = self.print_verb_command(path, &printer);
            let output = self
                .runner
                .run(&spec)
                .await
                .map_err(|e| e.into_job_error(POWERSHELL_NOT_FOUND))?;

            // The verb is fire-and-forget; a refusal here is logged, not surfaced.
            if !output.success {
                warn!(
                    path = %path.display(),
                    detail = output.diagnostic(),
                    "shell print verb reported a problem"
                );
            }
        }

        info!(printer = %printer, files = paths.len(), "print submission acknowledged");

        Ok(PrintReceipt {
            message: format!("Files sent to printer: {printer}"),
            printer: Some(printer),
            files: paths.to_vec(),
            delivery: Delivery::Acknowledged,
        })
    }
}

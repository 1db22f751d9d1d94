// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer discovery through the native print system.
//
// POSIX asks CUPS via `lpstat -p` (queues) and `lpstat -d` (default);
// Windows asks the spooler via `Get-Printer` and `Win32_Printer`. The names
// found here are exactly what `--printer` accepts. Discovery never fails:
// a missing tool yields an empty list and a warning.

use std::sync::Arc;
use std::time::Duration;

use printdesk_core::command::{CommandRunner, CommandSpec, powershell};
use printdesk_core::types::Platform;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::windows::query_default_printer;

/// CUPS status tool.
pub const LPSTAT: &str = "lpstat";

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(15);

/// A print queue known to the OS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterInfo {
    pub name: String,
    pub is_default: bool,
}

/// Lists printers for the `devices` helper.
pub struct PrinterDiscovery {
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
}

impl PrinterDiscovery {
    pub fn new(runner: Arc<dyn CommandRunner>, platform: Platform) -> Self {
        Self { runner, platform }
    }

    /// Snapshot of installed printers, default first.
    pub async fn printers(&self) -> Vec<PrinterInfo> {
        let (names, default) = match self.platform {
            Platform::Posix => (self.cups_printers().await, self.cups_default().await),
            Platform::Windows => (self.windows_printers().await, self.windows_default().await),
        };

        let mut printers: Vec<PrinterInfo> = names
            .into_iter()
            .map(|name| PrinterInfo {
                is_default: default.as_deref() == Some(name.as_str()),
                name,
            })
            .collect();
        printers.sort_by_key(|p| !p.is_default);
        debug!(count = printers.len(), "printers discovered");
        printers
    }

    async fn cups_printers(&self) -> Vec<String> {
        let spec = CommandSpec::new(LPSTAT, DISCOVERY_TIMEOUT).arg("-p");
        match self.runner.run(&spec).await {
            Ok(out) if out.success => parse_lpstat_printers(&out.stdout),
            Ok(out) => {
                warn!(detail = out.diagnostic(), "lpstat -p failed");
                Vec::new()
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "lpstat unavailable; install CUPS (cups, cups-client) to list printers"
                );
                Vec::new()
            }
        }
    }

    async fn cups_default(&self) -> Option<String> {
        let spec = CommandSpec::new(LPSTAT, DISCOVERY_TIMEOUT).arg("-d");
        let out = self.runner.run(&spec).await.ok()?;
        parse_lpstat_default(&out.stdout)
    }

    async fn windows_printers(&self) -> Vec<String> {
        let spec = powershell(
            "Get-Printer | Select-Object -ExpandProperty Name",
            DISCOVERY_TIMEOUT,
        );
        match self.runner.run(&spec).await {
            Ok(out) if out.success => non_empty_lines(&out.stdout),
            Ok(out) => {
                warn!(detail = out.diagnostic(), "Get-Printer failed");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "cannot list Windows printers");
                Vec::new()
            }
        }
    }

    async fn windows_default(&self) -> Option<String> {
        query_default_printer(self.runner.as_ref(), DISCOVERY_TIMEOUT)
            .await
            .ok()
            .flatten()
    }
}

/// Queue names from `lpstat -p` ("printer HP_LaserJet is idle.  enabled since ...").
pub fn parse_lpstat_printers(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("printer"), Some(name)) => Some(name.to_owned()),
                _ => None,
            }
        })
        .collect()
}

/// Default destination from `lpstat -d` ("system default destination: Office").
pub fn parse_lpstat_default(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        line.split_once("default destination:")
            .map(|(_, name)| name.trim().to_owned())
            .filter(|name| !name.is_empty())
    })
}

fn non_empty_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

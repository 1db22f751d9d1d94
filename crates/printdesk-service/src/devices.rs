// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device inventory for the `devices` helper: what can be passed to
// `--printer` and `--scanner` on this machine.

use std::sync::Arc;

use printdesk_core::command::CommandRunner;
use printdesk_core::types::Platform;
use printdesk_print::{PrinterDiscovery, PrinterInfo};
use printdesk_scan::{ScannerDiscovery, ScannerInfo};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInventory {
    pub platform: Platform,
    pub printers: Vec<PrinterInfo>,
    pub scanners: Vec<ScannerInfo>,
}

impl DeviceInventory {
    pub async fn discover(platform: Platform, runner: Arc<dyn CommandRunner>) -> Self {
        let printers = PrinterDiscovery::new(runner.clone(), platform);
        let scanners = ScannerDiscovery::new(runner, platform);
        let (printers, scanners) = tokio::join!(printers.printers(), scanners.scanners());
        Self {
            platform,
            printers,
            scanners,
        }
    }

    /// Start command using the first printer and scanner found.
    pub fn example_command(&self) -> Option<String> {
        let mut command = String::from("printdesk");
        if let Some(printer) = self.printers.first() {
            command.push_str(&format!(" --printer \"{}\"", printer.name));
        }
        if let Some(scanner) = self.scanners.first() {
            command.push_str(&format!(" --scanner \"{}\"", scanner.id));
        }
        (command != "printdesk").then(|| format!("{command} shell"))
    }
}

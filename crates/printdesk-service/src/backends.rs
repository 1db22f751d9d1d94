// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backend selection. The platform is decided once at startup and exactly one
// print and one scan backend are built for it.

use std::sync::Arc;

use printdesk_core::command::CommandRunner;
use printdesk_core::config::Config;
use printdesk_core::types::Platform;
use printdesk_print::{CupsPrintBackend, PrintBackend, ShellPrintBackend};
use printdesk_scan::{SaneScanBackend, ScanBackend, WiaScanBackend};
use tracing::info;

/// The capability pair injected into the orchestrator.
#[derive(Clone)]
pub struct Backends {
    pub print: Arc<dyn PrintBackend>,
    pub scan: Arc<dyn ScanBackend>,
}

impl Backends {
    pub fn for_platform(
        platform: Platform,
        config: &Config,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let backends = match platform {
            Platform::Posix => Self {
                print: Arc::new(CupsPrintBackend::new(runner.clone(), config.printing.timeout())),
                scan: Arc::new(SaneScanBackend::new(runner, &config.scanning)),
            },
            Platform::Windows => Self {
                print: Arc::new(ShellPrintBackend::new(runner.clone(), config.printing.timeout())),
                scan: Arc::new(WiaScanBackend::new(runner, &config.scanning)),
            },
        };
        info!(
            %platform,
            print = backends.print.name(),
            scan = backends.scan.name(),
            "backends selected"
        );
        backends
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printdesk-service: the job layer between the presentation surface and the
// platform backends.

pub mod backends;
pub mod devices;
pub mod orchestrator;
pub mod report;

pub use backends::Backends;
pub use devices::DeviceInventory;
pub use orchestrator::{JobOrchestrator, SCAN_COMPLETED, ScanArtifacts};
pub use report::JobReport;

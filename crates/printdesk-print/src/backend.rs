// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The print capability shared by every platform variant.

use std::path::PathBuf;

use async_trait::async_trait;
use printdesk_core::error::Result;
use serde::{Deserialize, Serialize};

/// What the backend can vouch for once `print_files` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// The spooler accepted every file (the submit command exited zero).
    Spooled,
    /// Hand-off was issued but completion is not observable.
    Acknowledged,
    /// There was nothing to send.
    Empty,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintReceipt {
    /// Printer the files were sent to; `None` means the system default.
    pub printer: Option<String>,
    pub files: Vec<PathBuf>,
    pub delivery: Delivery,
    /// Status line shown to the caller.
    pub message: String,
}

impl PrintReceipt {
    pub fn empty() -> Self {
        Self {
            printer: None,
            files: Vec::new(),
            delivery: Delivery::Empty,
            message: "No files to print".into(),
        }
    }
}

/// Sends files to a physical or virtual printer.
///
/// `printer` is the already-resolved configured printer (operator override or
/// config default). Implementations fall back to their platform default when
/// it is `None`. Files are submitted in the order given.
#[async_trait]
pub trait PrintBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn print_files(&self, paths: &[PathBuf], printer: Option<&str>) -> Result<PrintReceipt>;
}

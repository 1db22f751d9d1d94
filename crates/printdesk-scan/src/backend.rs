// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The scan capability shared by every platform variant.

use std::path::Path;

use async_trait::async_trait;
use printdesk_core::error::Result;
use printdesk_core::types::ColorMode;

/// Acquires one page from a scanner and writes it to `target`.
///
/// On success the returned status line names `target`. A failed capture may
/// leave a partial file behind; callers must not treat an existing target as
/// proof of success.
#[async_trait]
pub trait ScanBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn scan_document(&self, mode: ColorMode, target: &Path) -> Result<String>;
}

/// Status line for a completed capture.
pub(crate) fn saved_message(target: &Path) -> String {
    format!("Document scanned and saved to {}", target.display())
}

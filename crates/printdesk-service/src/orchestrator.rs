// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job orchestrator.
//
// Print: auth -> extension check over every file -> dispatch.
// Scan:  auth -> scan lock -> capture -> post-process (blocking pool).
//
// Each job runs once and its outcome is reported once. Nothing is retried.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use printdesk_core::config::Config;
use printdesk_core::error::{PrintdeskError, Result};
use printdesk_core::types::{ColorMode, JobId, PrintJob, ScanRequest, dotted_extension};
use printdesk_document::{DynamicImage, PdfInfo, ScanPostProcessor};
use printdesk_print::{PrintBackend, PrintReceipt};
use printdesk_scan::ScanBackend;
use printdesk_security::{AuthGate, Session};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::backends::Backends;

/// Status line for a scan whose PDF was derived.
pub const SCAN_COMPLETED: &str = "Scan completed successfully";

/// Everything a finished scan produced.
#[derive(Debug, Clone)]
pub struct ScanArtifacts {
    pub job_id: JobId,
    pub mode: ColorMode,
    pub image_path: PathBuf,
    pub pdf_path: PathBuf,
    pub pdf_info: PdfInfo,
    /// Decoded capture for display.
    pub preview: DynamicImage,
    /// The scan backend's own status line.
    pub capture_message: String,
    pub message: String,
}

/// Accepts print and scan requests and drives them through their pipelines.
pub struct JobOrchestrator {
    config: Arc<Config>,
    gate: AuthGate,
    print: Arc<dyn PrintBackend>,
    scan: Arc<dyn ScanBackend>,
    post: ScanPostProcessor,
    // One scan in flight per process, capture and post-processing included.
    scan_lock: Mutex<()>,
}

impl JobOrchestrator {
    pub fn new(config: Arc<Config>, backends: Backends) -> Self {
        Self {
            gate: AuthGate::from_config(&config.server),
            config,
            print: backends.print,
            scan: backends.scan,
            post: ScanPostProcessor::new(),
            scan_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth_gate(&self) -> &AuthGate {
        &self.gate
    }

    /// Names of the injected print and scan backends.
    pub fn backend_names(&self) -> (&'static str, &'static str) {
        (self.print.name(), self.scan.name())
    }

    /// Print `files` on the configured printer.
    ///
    /// Every extension is checked before anything is dispatched; the first
    /// disallowed one fails the whole job.
    #[instrument(skip(self, session, files), fields(files = files.len()))]
    pub async fn print(&self, session: &Session, files: Vec<PathBuf>) -> Result<PrintReceipt> {
        self.gate.check(session)?;
        self.validate_extensions(&files)?;

        let job = PrintJob::new(files, self.config.printing.default_printer.clone());
        debug!(job = %job.id, backend = self.print.name(), "dispatching print job");

        let receipt = self
            .print
            .print_files(&job.files, job.printer.as_deref())
            .await
            .inspect_err(|e| warn!(job = %job.id, error = %e, "print job failed"))?;

        info!(job = %job.id, delivery = ?receipt.delivery, "print job done");
        Ok(receipt)
    }

    fn validate_extensions(&self, files: &[PathBuf]) -> Result<()> {
        for file in files {
            let ext = dotted_extension(file);
            if !self.config.printing.is_allowed(&ext) {
                warn!(file = %file.display(), ext = %ext, "file type rejected");
                return Err(PrintdeskError::UnsupportedFileType(ext));
            }
        }
        Ok(())
    }

    /// Capture one page in `mode`, then derive its PDF and preview.
    ///
    /// A capture failure is returned as-is and post-processing is skipped.
    /// `storage.scan_dir` must already exist (see `StorageConfig::ensure_directories`).
    #[instrument(skip(self, session))]
    pub async fn scan(&self, session: &Session, mode: ColorMode) -> Result<ScanArtifacts> {
        self.gate.check(session)?;

        let _guard = self.scan_lock.lock().await;

        let target = next_scan_target(&self.config.storage.scan_dir, Local::now().naive_local());
        let request = ScanRequest::new(mode, target);
        debug!(
            job = %request.id,
            target = %request.target.display(),
            backend = self.scan.name(),
            "dispatching scan"
        );

        let capture_message = self
            .scan
            .scan_document(request.mode, &request.target)
            .await
            .inspect_err(|e| warn!(job = %request.id, error = %e, "scan capture failed"))?;

        let post = self.post;
        let image = request.target.clone();
        let processed = tokio::task::spawn_blocking(move || post.process(&image))
            .await
            .map_err(|e| {
                PrintdeskError::PostProcessing(format!("post-processing task failed: {e}"))
            })?
            .inspect_err(|e| warn!(job = %request.id, error = %e, "scan post-processing failed"))?;

        info!(job = %request.id, pdf = %processed.pdf_path.display(), "scan job done");

        Ok(ScanArtifacts {
            job_id: request.id,
            mode: request.mode,
            preview: processed.preview,
            image_path: request.target,
            pdf_path: processed.pdf_path,
            pdf_info: processed.pdf_info,
            capture_message,
            message: SCAN_COMPLETED.to_owned(),
        })
    }
}

/// `scan_<YYYYMMDD_HHMMSS>.jpg` in `dir`, with `_<n>` appended when the name
/// is already taken.
pub fn next_scan_target(dir: &Path, now: NaiveDateTime) -> PathBuf {
    let stem = format!("scan_{}", now.format("%Y%m%d_%H%M%S"));
    let candidate = dir.join(format!("{stem}.jpg"));
    if !candidate.exists() {
        return candidate;
    }
    (1u32..)
        .map(|n| dir.join(format!("{stem}_{n}.jpg")))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

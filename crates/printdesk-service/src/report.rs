// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Serializable job outcomes for `--json` output and log correlation.

use std::path::PathBuf;

use printdesk_core::error::{ErrorKind, PrintdeskError, Result};
use printdesk_core::human_errors::{Severity, humanize_error};
use printdesk_core::types::{JobId, JobKind};
use printdesk_print::{Delivery, PrintReceipt};
use serde::{Deserialize, Serialize};

use crate::orchestrator::ScanArtifacts;

/// One job's outcome, success or failure, as a flat record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    pub kind: JobKind,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Whether submitting the same job again could succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retriable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub printer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<Delivery>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_size: Option<(u32, u32)>,
}

impl JobReport {
    fn base(kind: JobKind, success: bool, message: String) -> Self {
        Self {
            job_id: None,
            kind,
            success,
            message,
            error_kind: None,
            suggestion: None,
            severity: None,
            retriable: None,
            printer: None,
            delivery: None,
            files: Vec::new(),
            pages: None,
            preview_size: None,
        }
    }

    pub fn failure(kind: JobKind, err: &PrintdeskError) -> Self {
        let human = humanize_error(err);
        Self {
            error_kind: Some(err.kind()),
            suggestion: Some(human.suggestion),
            severity: Some(human.severity),
            retriable: Some(human.retriable),
            ..Self::base(kind, false, human.message)
        }
    }

    pub fn from_print(outcome: &Result<PrintReceipt>) -> Self {
        match outcome {
            Ok(receipt) => Self {
                printer: receipt.printer.clone(),
                delivery: Some(receipt.delivery),
                files: receipt.files.clone(),
                ..Self::base(JobKind::Print, true, receipt.message.clone())
            },
            Err(err) => Self::failure(JobKind::Print, err),
        }
    }

    pub fn from_scan(outcome: &Result<ScanArtifacts>) -> Self {
        match outcome {
            Ok(scan) => Self {
                job_id: Some(scan.job_id),
                files: vec![scan.image_path.clone(), scan.pdf_path.clone()],
                pages: Some(scan.pdf_info.page_count),
                preview_size: Some((scan.preview.width(), scan.preview.height())),
                ..Self::base(JobKind::Scan, true, scan.message.clone())
            },
            Err(err) => Self::failure(JobKind::Scan, err),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for printdesk.
//
// Every backend failure is converted into a `PrintdeskError` value before it
// crosses back into the orchestrator. The `Display` text of each variant is
// the message shown verbatim to the caller.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error type for all printdesk operations.
#[derive(Debug, Error)]
pub enum PrintdeskError {
    // -- Access --
    #[error("Authentication required")]
    AuthRequired,

    // -- Setup --
    /// A required printer/device identifier is missing or a tool is not installed.
    #[error("{0}")]
    Configuration(String),

    #[error("failed to load configuration: {0}")]
    ConfigLoad(String),

    // -- Job validation --
    #[error("File type {} not allowed", display_extension(.0))]
    UnsupportedFileType(String),

    // -- Device --
    /// The OS command exited non-zero or the OS automation layer raised.
    #[error("{detail}")]
    DeviceCommand { tool: String, detail: String },

    #[error("{tool} did not finish within {secs}s")]
    Timeout { tool: String, secs: u64 },

    // -- Scan artifacts --
    #[error("Error processing scan: {0}")]
    PostProcessing(String),

    // -- Plumbing --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn display_extension(ext: &str) -> &str {
    if ext.is_empty() { "(none)" } else { ext }
}

/// Stable tag for an error, carried in job reports so operators can tell
/// a hung tool from a failing one without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AuthRequired,
    Configuration,
    UnsupportedFileType,
    DeviceCommand,
    Timeout,
    PostProcessing,
    Internal,
}

impl PrintdeskError {
    /// Build a device error for `tool` with the given diagnostic text.
    pub fn device(tool: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::DeviceCommand {
            tool: tool.into(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthRequired => ErrorKind::AuthRequired,
            Self::Configuration(_) | Self::ConfigLoad(_) => ErrorKind::Configuration,
            Self::UnsupportedFileType(_) => ErrorKind::UnsupportedFileType,
            Self::DeviceCommand { .. } => ErrorKind::DeviceCommand,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::PostProcessing(_) => ErrorKind::PostProcessing,
            Self::Io(_) | Self::Serialization(_) => ErrorKind::Internal,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrintdeskError>;

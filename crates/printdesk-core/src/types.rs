// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for print and scan jobs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a job, used to correlate log lines and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which native backend family the process drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// CUPS `lp`/`lpstat` and SANE `scanimage`.
    Posix,
    /// Shell print verb and WIA automation.
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Posix => f.write_str("posix"),
            Self::Windows => f.write_str("windows"),
        }
    }
}

/// Capture mode requested from the scanner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    #[default]
    Color,
    Grayscale,
    /// Black and white.
    Lineart,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [Self::Color, Self::Grayscale, Self::Lineart];

    /// SANE `--mode` value.
    pub fn sane_mode(&self) -> &'static str {
        match self {
            Self::Color => "Color",
            Self::Grayscale => "Gray",
            Self::Lineart => "Lineart",
        }
    }

    /// WIA item property 6146 (WIA_IPA_DATATYPE / "Current Intent") value.
    pub fn wia_value(&self) -> i32 {
        match self {
            Self::Color => 1,
            Self::Grayscale => 2,
            Self::Lineart => 4,
        }
    }

    /// Inverse of [`ColorMode::wia_value`]. Unknown values select color.
    pub fn from_wia_value(value: i64) -> Self {
        match value {
            2 => Self::Grayscale,
            4 => Self::Lineart,
            _ => Self::Color,
        }
    }

    /// Lenient parse of user input. Unknown input selects color.
    pub fn parse_lenient(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "gray" | "grey" | "grayscale" | "greyscale" | "2" => Self::Grayscale,
            "lineart" | "bw" | "black-and-white" | "blackandwhite" | "4" => Self::Lineart,
            _ => Self::Color,
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Color => f.write_str("color"),
            Self::Grayscale => f.write_str("grayscale"),
            Self::Lineart => f.write_str("lineart"),
        }
    }
}

/// Extension of `path` in allow-list form: lowercase with leading dot, or
/// empty when the file name has none.
pub fn dotted_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_ascii_lowercase()))
        .unwrap_or_default()
}

/// One print request, discarded once the backend returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: JobId,
    /// Submitted in this order.
    pub files: Vec<PathBuf>,
    /// `None` lets the backend pick its platform default.
    pub printer: Option<String>,
}

impl PrintJob {
    pub fn new(files: Vec<PathBuf>, printer: Option<String>) -> Self {
        Self {
            id: JobId::new(),
            files,
            printer,
        }
    }
}

/// One scan request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub id: JobId,
    pub mode: ColorMode,
    pub target: PathBuf,
}

impl ScanRequest {
    pub fn new(mode: ColorMode, target: PathBuf) -> Self {
        Self {
            id: JobId::new(),
            mode,
            target,
        }
    }
}

/// Kind of job a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Print,
    Scan,
}

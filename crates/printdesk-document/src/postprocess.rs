// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan post-processing: turn a captured image into its PDF sibling and a
// preview. Everything here is synchronous file and pixel work; async
// callers run it on the blocking pool.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use printdesk_core::error::{PrintdeskError, Result};
use tracing::{info, instrument};

use crate::image::load_preview;
use crate::pdf::{PdfInfo, ScanPdfWriter, inspect_pdf};

/// Artifacts derived from one captured image.
#[derive(Debug, Clone)]
pub struct ProcessedScan {
    pub pdf_path: PathBuf,
    pub pdf_info: PdfInfo,
    pub preview: DynamicImage,
}

/// Derives PDFs and previews from scan output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanPostProcessor {
    writer: ScanPdfWriter,
}

impl ScanPostProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `scan_X.jpg` becomes `scan_X.pdf` in the same directory.
    pub fn pdf_path_for(image: &Path) -> PathBuf {
        image.with_extension("pdf")
    }

    /// Write the single-page PDF next to `image` and return its path.
    /// An existing file at that path is replaced.
    #[instrument(skip(self), fields(image = %image.display()))]
    pub fn derive_pdf(&self, image: &Path) -> Result<PathBuf> {
        let decoded = load_preview(image)?;
        self.write_pdf(image, &decoded)
    }

    /// Decoded image for display.
    pub fn load_preview(&self, image: &Path) -> Result<DynamicImage> {
        load_preview(image)
    }

    /// Decode once, derive the PDF, and verify it.
    #[instrument(skip(self), fields(image = %image.display()))]
    pub fn process(&self, image: &Path) -> Result<ProcessedScan> {
        let preview = load_preview(image)?;
        let pdf_path = self.write_pdf(image, &preview)?;
        let pdf_info = inspect_pdf(&pdf_path)?;
        if pdf_info.page_count != 1 {
            return Err(PrintdeskError::PostProcessing(format!(
                "{} has {} pages, expected 1",
                pdf_path.display(),
                pdf_info.page_count
            )));
        }
        Ok(ProcessedScan {
            pdf_path,
            pdf_info,
            preview,
        })
    }

    fn write_pdf(&self, image: &Path, decoded: &DynamicImage) -> Result<PathBuf> {
        let pdf_path = Self::pdf_path_for(image);
        let title = image
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "scan".to_owned());

        let bytes = self.writer.render(decoded, &title);
        std::fs::write(&pdf_path, &bytes).map_err(|err| {
            PrintdeskError::PostProcessing(format!("cannot write {}: {err}", pdf_path.display()))
        })?;

        info!(
            pdf = %pdf_path.display(),
            bytes = bytes.len(),
            dpi = self.writer.dpi(),
            "scan PDF derived"
        );
        Ok(pdf_path)
    }
}

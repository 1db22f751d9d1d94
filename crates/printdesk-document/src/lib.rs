// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printdesk-document: post-processing for captured scans.
//
// Derives a single-page 300 DPI PDF from each scanned image, decodes the
// image for preview, and inspects PDFs to confirm their geometry.

pub mod image;
pub mod pdf;
pub mod postprocess;

pub use ::image::DynamicImage;
pub use pdf::{PdfInfo, ScanPdfWriter, inspect_pdf};
pub use postprocess::{ProcessedScan, ScanPostProcessor};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader: geometry inspection of derived scan PDFs using `lopdf`.

use std::path::Path;

use lopdf::{Document, ObjectId};
use printdesk_core::error::{PrintdeskError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Page count and first-page size of a PDF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PdfInfo {
    pub page_count: usize,
    /// Width and height of the first page's MediaBox, in points.
    pub media_box_pt: (f32, f32),
}

fn pdf_error(path: &Path, err: impl std::fmt::Display) -> PrintdeskError {
    PrintdeskError::PostProcessing(format!("cannot read {}: {err}", path.display()))
}

/// Load `path` and report its page count and first-page geometry.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn inspect_pdf(path: &Path) -> Result<PdfInfo> {
    let document = Document::load(path).map_err(|e| pdf_error(path, e))?;
    let pages = document.get_pages();

    let first = pages
        .values()
        .next()
        .copied()
        .ok_or_else(|| pdf_error(path, "document has no pages"))?;

    let media_box = media_box(&document, first).map_err(|e| pdf_error(path, e))?;
    let info = PdfInfo {
        page_count: pages.len(),
        media_box_pt: (media_box[2] - media_box[0], media_box[3] - media_box[1]),
    };
    debug!(
        pages = info.page_count,
        width_pt = info.media_box_pt.0,
        height_pt = info.media_box_pt.1,
        "PDF inspected"
    );
    Ok(info)
}

/// MediaBox of `page`, following `/Parent` links for inherited boxes.
fn media_box(document: &Document, page: ObjectId) -> std::result::Result<[f32; 4], lopdf::Error> {
    let mut node = page;
    loop {
        let dict = document.get_dictionary(node)?;
        if let Ok(value) = dict.get(b"MediaBox") {
            let (_, value) = document.dereference(value)?;
            let mut rect = [0.0f32; 4];
            for (slot, number) in rect.iter_mut().zip(value.as_array()?) {
                *slot = number.as_float()?;
            }
            return Ok(rect);
        }
        node = dict.get(b"Parent")?.as_reference()?;
    }
}

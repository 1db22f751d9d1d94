// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF writer: wraps one scanned raster in a single-page PDF using `printpdf` 0.8.
//
// The page is sized to the image at a fixed resolution, so a 2550x3300 px
// capture at 300 DPI becomes an 8.5x11 in page with the image edge to edge.

use image::DynamicImage;
use printpdf::{
    Mm, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Pt, RawImage, RawImageData,
    RawImageFormat, XObjectTransform,
};
use tracing::{debug, instrument, warn};

/// Resolution scanned pages are written at.
pub const SCAN_DPI: f32 = 300.0;

const MM_PER_INCH: f32 = 25.4;

/// Builds single-page PDFs from scanned images.
#[derive(Debug, Clone, Copy)]
pub struct ScanPdfWriter {
    dpi: f32,
}

impl Default for ScanPdfWriter {
    fn default() -> Self {
        Self { dpi: SCAN_DPI }
    }
}

impl ScanPdfWriter {
    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    /// Page size for an image of `width` x `height` pixels.
    pub fn page_size(&self, width: u32, height: u32) -> (Mm, Mm) {
        (
            Mm(width as f32 / self.dpi * MM_PER_INCH),
            Mm(height as f32 / self.dpi * MM_PER_INCH),
        )
    }

    /// Serialise `image` as a one-page PDF titled `title`.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub fn render(&self, image: &DynamicImage, title: &str) -> Vec<u8> {
        let (page_w, page_h) = self.page_size(image.width(), image.height());

        let rgb = image.to_rgb8();
        let raw = RawImage {
            width: rgb.width() as usize,
            height: rgb.height() as usize,
            pixels: RawImageData::U8(rgb.into_raw()),
            data_format: RawImageFormat::RGB8,
            tag: Vec::new(),
        };

        let mut doc = PdfDocument::new(title);
        let xobject_id = doc.add_image(&raw);

        let ops = vec![Op::UseXobject {
            id: xobject_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(0.0)),
                translate_y: Some(Pt(0.0)),
                scale_x: Some(1.0),
                scale_y: Some(1.0),
                dpi: Some(self.dpi),
                rotate: None,
            },
        }];

        doc.with_pages(vec![PdfPage::new(page_w, page_h, ops)]);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "printpdf reported warnings");
        }
        debug!(
            page_w_mm = page_w.0,
            page_h_mm = page_h.0,
            bytes = bytes.len(),
            "scan page written"
        );
        bytes
    }
}

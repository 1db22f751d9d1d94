// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::Path;

use image::DynamicImage;
use printdesk_core::error::{PrintdeskError, Result};
use tracing::{debug, instrument};

/// Decode a captured scan so it can be displayed.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_preview(path: &Path) -> Result<DynamicImage> {
    let img = image::open(path).map_err(|err| {
        PrintdeskError::PostProcessing(format!("failed to open {}: {err}", path.display()))
    })?;
    debug!(width = img.width(), height = img.height(), "preview decoded");
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn decodes_jpeg() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scan.jpg");
        RgbImage::from_pixel(40, 20, Rgb([200, 10, 10]))
            .save(&path)
            .expect("write jpeg");

        let img = load_preview(&path).expect("preview");
        assert_eq!((img.width(), img.height()), (40, 20));
    }

    #[test]
    fn garbage_is_post_processing_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scan.jpg");
        std::fs::write(&path, b"scanimage: open failed").expect("write");

        let err = load_preview(&path).unwrap_err();
        assert!(matches!(err, PrintdeskError::PostProcessing(_)));
    }
}

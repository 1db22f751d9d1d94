// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SANE scan backend for POSIX systems.
//
// `scanimage` writes the encoded image to stdout; the runner streams that
// straight into the target file.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use printdesk_core::command::{CommandRunner, CommandSpec};
use printdesk_core::config::ScanningConfig;
use printdesk_core::error::{PrintdeskError, Result};
use printdesk_core::types::ColorMode;
use tracing::{info, instrument, warn};

use crate::backend::{ScanBackend, saved_message};

/// SANE command-line frontend.
pub const SCANIMAGE: &str = "scanimage";

const SCANIMAGE_NOT_FOUND: &str = "scanimage command not found. Install SANE (e.g., sane-utils).";

const NO_DEVICE: &str = "No Unix SANE device configured (scanning.unix_device_name).";

/// Scans through `scanimage`.
pub struct SaneScanBackend {
    runner: Arc<dyn CommandRunner>,
    device: Option<String>,
    resolution: u32,
    timeout: Duration,
}

impl SaneScanBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &ScanningConfig) -> Self {
        Self {
            runner,
            device: config.unix_device_name.clone(),
            resolution: config.resolution,
            timeout: config.timeout(),
        }
    }

    fn capture_command(&self, device: &str, mode: ColorMode, target: &Path) -> CommandSpec {
        CommandSpec::new(SCANIMAGE, self.timeout)
            .args([
                format!("--device-name={device}"),
                "--format=jpeg".to_owned(),
                format!("--mode={}", mode.sane_mode()),
                format!("--resolution={}", self.resolution),
            ])
            .stdout_to(target)
    }
}

#[async_trait]
impl ScanBackend for SaneScanBackend {
    fn name(&self) -> &'static str {
        "sane"
    }

    #[instrument(skip(self, target), fields(target = %target.display()))]
    async fn scan_document(&self, mode: ColorMode, target: &Path) -> Result<String> {
        let Some(device) = self.device.as_deref() else {
            return Err(PrintdeskError::Configuration(NO_DEVICE.into()));
        };

        let output = self
            .runner
            .run(&self.capture_command(device, mode, target))
            .await
            .map_err(|e| e.into_job_error(SCANIMAGE_NOT_FOUND))?;

        if !output.success {
            warn!(device, code = ?output.code, "scanimage failed");
            return Err(PrintdeskError::device(
                SCANIMAGE,
                format!("Error from scanner: {}", output.stderr.trim()),
            ));
        }

        info!(device, "scan captured");
        Ok(saved_message(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printdesk_core::command::StdoutTarget;
    use printdesk_core::command::testing::{Scripted, ScriptedRunner};

    fn config(device: Option<&str>) -> ScanningConfig {
        ScanningConfig {
            unix_device_name: device.map(str::to_owned),
            ..ScanningConfig::default()
        }
    }

    #[tokio::test]
    async fn missing_device_touches_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("x.jpg");
        let runner = Arc::new(ScriptedRunner::new());

        let err = SaneScanBackend::new(runner.clone(), &config(None))
            .scan_document(ColorMode::Color, &target)
            .await
            .unwrap_err();

        assert!(matches!(err, PrintdeskError::Configuration(_)));
        assert!(err.to_string().starts_with("No Unix SANE device configured"));
        assert_eq!(runner.call_count(), 0);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn builds_scanimage_invocation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("scan.jpg");
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_file_output(vec![0xFF, 0xD8, 0xFF]);

        let message = SaneScanBackend::new(runner.clone(), &config(Some("epson2:libusb:001:004")))
            .scan_document(ColorMode::Grayscale, &target)
            .await
            .expect("scan");

        assert_eq!(message, format!("Document scanned and saved to {}", target.display()));
        let call = &runner.calls()[0];
        assert_eq!(call.program, "scanimage");
        assert_eq!(
            call.args,
            vec![
                "--device-name=epson2:libusb:001:004",
                "--format=jpeg",
                "--mode=Gray",
                "--resolution=300",
            ]
        );
        assert_eq!(call.stdout, StdoutTarget::File(target.clone()));
        assert!(target.exists());
    }

    #[tokio::test]
    async fn mode_table_reaches_scanimage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = Arc::new(ScriptedRunner::new());
        let backend = SaneScanBackend::new(runner.clone(), &config(Some("test:0")));

        for mode in ColorMode::ALL {
            backend
                .scan_document(mode, &dir.path().join("s.jpg"))
                .await
                .expect("scan");
        }

        let modes: Vec<String> = runner.calls().iter().map(|c| c.args[2].clone()).collect();
        assert_eq!(modes, vec!["--mode=Color", "--mode=Gray", "--mode=Lineart"]);
    }

    #[tokio::test]
    async fn device_error_carries_stderr() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_failure(1, "scanimage: open of device test:0 failed: Device busy\n");

        let err = SaneScanBackend::new(runner.clone(), &config(Some("test:0")))
            .scan_document(ColorMode::Color, &dir.path().join("s.jpg"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error from scanner: scanimage: open of device test:0 failed: Device busy"
        );
    }

    #[tokio::test]
    async fn hung_scanimage_is_timeout() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = Arc::new(ScriptedRunner::new());
        runner.push(Scripted::TimedOut);

        let err = SaneScanBackend::new(runner.clone(), &config(Some("test:0")))
            .scan_document(ColorMode::Color, &dir.path().join("s.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, PrintdeskError::Timeout { secs: 300, .. }));
    }

    #[tokio::test]
    async fn missing_scanimage_is_configuration_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let runner = Arc::new(ScriptedRunner::new());
        runner.push(Scripted::NotFound);

        let err = SaneScanBackend::new(runner.clone(), &config(Some("test:0")))
            .scan_document(ColorMode::Color, &dir.path().join("s.jpg"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), SCANIMAGE_NOT_FOUND);
    }
}

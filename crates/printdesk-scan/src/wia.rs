// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Windows Image Acquisition scan backend.
//
// WIA is COM automation, so the capture runs as a short PowerShell script:
// connect the device by index, set the item properties, then transfer and
// save. Any exception inside the script is printed as "Error: <text>" on
// stderr with a non-zero exit, which becomes a `DeviceCommand` error here.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use printdesk_core::command::{CommandRunner, CommandSpec, POWERSHELL, powershell, ps_quote};
use printdesk_core::config::ScanningConfig;
use printdesk_core::error::{PrintdeskError, Result};
use printdesk_core::types::ColorMode;
use tracing::{info, instrument, warn};

use crate::backend::{ScanBackend, saved_message};

/// Capture resolution set on the WIA item, both axes.
pub const WIA_DPI: u32 = 300;

/// WIA item property ids.
pub mod property {
    pub const CURRENT_INTENT: u32 = 6146;
    pub const HORIZONTAL_RESOLUTION: u32 = 6147;
    pub const VERTICAL_RESOLUTION: u32 = 6148;
    pub const HORIZONTAL_START: u32 = 6149;
    pub const VERTICAL_START: u32 = 6150;
}

/// `wiaFormatJPEG`.
const WIA_FORMAT_JPEG: &str = "{B96B3CAE-0728-11D3-9D7B-0000F81EF32E}";

const POWERSHELL_NOT_FOUND: &str =
    "PowerShell not found. Windows scanning needs powershell.exe on the PATH.";

const NO_DEVICE: &str = "No WIA scanner configured (scanning.device_num).";

/// Scans through WIA.
pub struct WiaScanBackend {
    runner: Arc<dyn CommandRunner>,
    device_num: Option<u32>,
    timeout: Duration,
}

impl WiaScanBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &ScanningConfig) -> Self {
        Self {
            runner,
            device_num: config.device_num,
            timeout: config.timeout(),
        }
    }

    fn capture_command(&self, device_num: u32, mode: ColorMode, target: &Path) -> CommandSpec {
        powershell(capture_script(device_num, mode, target), self.timeout)
    }
}

/// PowerShell that performs one WIA capture into `target`.
///
/// Properties are all set before `Transfer`; the device count is checked
/// before connecting. `DeviceInfos` and `Items` are 1-based in automation.
pub fn capture_script(device_num: u32, mode: ColorMode, target: &Path) -> String {
    use property::*;

    let target = ps_quote(&target.to_string_lossy());
    format!(
        r#"$ErrorActionPreference = 'Stop'
try {{
  $manager = New-Object -ComObject WIA.DeviceManager
  if ($manager.DeviceInfos.Count -le {device_num}) {{
    [Console]::Error.WriteLine('No device with device num {device_num} found. Check scanner device index!')
    exit 2
  }}
  $device = $manager.DeviceInfos.Item({index}).Connect()
  $item = $device.Items.Item(1)
  $item.Properties.Item('{CURRENT_INTENT}').Value = {intent}
  $item.Properties.Item('{HORIZONTAL_RESOLUTION}').Value = {WIA_DPI}
  $item.Properties.Item('{VERTICAL_RESOLUTION}').Value = {WIA_DPI}
  $item.Properties.Item('{HORIZONTAL_START}').Value = 0
  $item.Properties.Item('{VERTICAL_START}').Value = 0
  $image = $item.Transfer('{WIA_FORMAT_JPEG}')
  if (Test-Path -LiteralPath {target}) {{ Remove-Item -LiteralPath {target} -Force }}
  $image.SaveFile({target})
}} catch {{
  [Console]::Error.WriteLine('Error: ' + $_.Exception.Message)
  exit 1
}}"#,
        index = u64::from(device_num) + 1,
        intent = mode.wia_value(),
    )
}

#[async_trait]
impl ScanBackend for WiaScanBackend {
    fn name(&self) -> &'static str {
        "wia"
    }

    #[instrument(skip(self, target), fields(target = %target.display()))]
    async fn scan_document(&self, mode: ColorMode, target: &Path) -> Result<String> {
        let Some(device_num) = self.device_num else {
            return Err(PrintdeskError::Configuration(NO_DEVICE.into()));
        };

        let output = self
            .runner
            .run(&self.capture_command(device_num, mode, target))
            .await
            .map_err(|e| e.into_job_error(POWERSHELL_NOT_FOUND))?;

        if !output.success {
            warn!(device_num, code = ?output.code, "WIA capture failed");
            return Err(PrintdeskError::device(POWERSHELL, output.diagnostic()));
        }

        info!(device_num, "scan captured");
        Ok(saved_message(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printdesk_core::command::testing::{Scripted, ScriptedRunner};

    fn config(device_num: Option<u32>) -> ScanningConfig {
        ScanningConfig {
            device_num,
            ..ScanningConfig::default()
        }
    }

    #[test]
    fn script_sets_properties_before_transfer() {
        let script = capture_script(0, ColorMode::Lineart, Path::new(r"C:\scans\scan.jpg"));

        assert!(script.contains("DeviceInfos.Item(1).Connect()"));
        assert!(script.contains("Item('6146').Value = 4"));
        assert!(script.contains("Item('6147').Value = 300"));
        assert!(script.contains("Item('6148').Value = 300"));
        assert!(script.contains("Item('6149').Value = 0"));
        assert!(script.contains("Item('6150').Value = 0"));
        assert!(script.contains(r"SaveFile('C:\scans\scan.jpg')"));

        let transfer = script.find("Transfer(").expect("transfer");
        for id in ["6146", "6147", "6148", "6149", "6150"] {
            let set = script.find(&format!("Item('{id}')")).expect("property");
            assert!(set < transfer, "property {id} set after transfer");
        }
    }

    #[test]
    fn script_checks_device_count_first() {
        let script = capture_script(3, ColorMode::Color, Path::new("s.jpg"));
        let check = script.find("Count -le 3").expect("count check");
        let connect = script.find("Item(4).Connect()").expect("connect");
        assert!(check < connect);
        assert!(script.contains("No device with device num 3 found. Check scanner device index!"));
    }

    #[test]
    fn largest_device_num_still_builds_script() {
        let script = capture_script(u32::MAX, ColorMode::Color, Path::new("s.jpg"));
        assert!(script.contains("Count -le 4294967295"));
        assert!(script.contains("Item(4294967296).Connect()"));
    }

    #[test]
    fn mode_table_reaches_wia() {
        for (mode, value) in [
            (ColorMode::Color, 1),
            (ColorMode::Grayscale, 2),
            (ColorMode::Lineart, 4),
        ] {
            let script = capture_script(0, mode, Path::new("s.jpg"));
            assert!(script.contains(&format!("Item('6146').Value = {value}")));
        }
    }

    #[tokio::test]
    async fn missing_device_num_is_configuration_error() {
        let runner = Arc::new(ScriptedRunner::new());
        let err = WiaScanBackend::new(runner.clone(), &config(None))
            .scan_document(ColorMode::Color, Path::new("s.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, PrintdeskError::Configuration(_)));
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn script_exception_becomes_device_error() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_failure(1, "Error: The remote procedure call failed.\r\n");

        let err = WiaScanBackend::new(runner.clone(), &config(Some(0)))
            .scan_document(ColorMode::Color, Path::new("s.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, PrintdeskError::DeviceCommand { .. }));
        assert_eq!(err.to_string(), "Error: The remote procedure call failed.");
    }

    #[tokio::test]
    async fn hung_wia_script_is_timeout() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push(Scripted::TimedOut);

        let err = WiaScanBackend::new(runner.clone(), &config(Some(0)))
            .scan_document(ColorMode::Color, Path::new("s.jpg"))
            .await
            .unwrap_err();

        assert!(matches!(err, PrintdeskError::Timeout { .. }));
    }

    #[tokio::test]
    async fn success_names_target() {
        let runner = Arc::new(ScriptedRunner::new());
        let message = WiaScanBackend::new(runner.clone(), &config(Some(1)))
            .scan_document(ColorMode::Grayscale, Path::new(r"C:\scans\a.jpg"))
            .await
            .expect("scan");

        assert_eq!(message, r"Document scanned and saved to C:\scans\a.jpg");
        assert_eq!(runner.calls()[0].program, POWERSHELL);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanner discovery: `scanimage -L` on POSIX, WIA `DeviceInfos` on Windows.

use std::sync::Arc;
use std::time::Duration;

use printdesk_core::command::{CommandRunner, CommandSpec, powershell};
use printdesk_core::types::Platform;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::sane::SCANIMAGE;

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(30);

const WIA_ENUMERATION: &str = r#"$manager = New-Object -ComObject WIA.DeviceManager
$i = 0
foreach ($info in $manager.DeviceInfos) {
  try { $name = $info.Properties.Item('Name').Value } catch { $name = 'Unknown device' }
  Write-Output ("{0}`t{1}" -f $i, $name)
  $i++
}"#;

/// How to address a scanner from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScannerId {
    /// SANE device string for `scanning.unix_device_name`.
    Sane { device: String },
    /// WIA index for `scanning.device_num`.
    Wia { index: u32 },
}

impl std::fmt::Display for ScannerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sane { device } => f.write_str(device),
            Self::Wia { index } => write!(f, "{index}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerInfo {
    pub id: ScannerId,
    pub description: String,
}

/// Lists scanners for the `devices` helper.
pub struct ScannerDiscovery {
    runner: Arc<dyn CommandRunner>,
    platform: Platform,
}

impl ScannerDiscovery {
    pub fn new(runner: Arc<dyn CommandRunner>, platform: Platform) -> Self {
        Self { runner, platform }
    }

    pub async fn scanners(&self) -> Vec<ScannerInfo> {
        let scanners = match self.platform {
            Platform::Posix => self.sane_scanners().await,
            Platform::Windows => self.wia_scanners().await,
        };
        debug!(count = scanners.len(), "scanners discovered");
        scanners
    }

    async fn sane_scanners(&self) -> Vec<ScannerInfo> {
        let spec = CommandSpec::new(SCANIMAGE, DISCOVERY_TIMEOUT).arg("-L");
        match self.runner.run(&spec).await {
            Ok(out) => {
                // scanimage -L exits non-zero when nothing is attached but may
                // still have listed network devices.
                if !out.success {
                    warn!(detail = out.diagnostic(), "scanimage -L exited with an error");
                }
                parse_scanimage_list(&out.stdout)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    "scanimage unavailable; install SANE (sane-utils) to list scanners"
                );
                Vec::new()
            }
        }
    }

    async fn wia_scanners(&self) -> Vec<ScannerInfo> {
        match self.runner.run(&powershell(WIA_ENUMERATION, DISCOVERY_TIMEOUT)).await {
            Ok(out) if out.success => parse_wia_list(&out.stdout),
            Ok(out) => {
                warn!(detail = out.diagnostic(), "WIA enumeration failed");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "cannot list WIA scanners");
                Vec::new()
            }
        }
    }
}

/// Devices from `scanimage -L` ("device `epson2:net:10.0.0.5' is a Epson PID flatbed scanner").
pub fn parse_scanimage_list(stdout: &str) -> Vec<ScannerInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("device `")?;
            let (device, rest) = rest.split_once('\'')?;
            let description = rest
                .trim()
                .strip_prefix("is a ")
                .unwrap_or(rest.trim())
                .to_owned();
            Some(ScannerInfo {
                id: ScannerId::Sane {
                    device: device.to_owned(),
                },
                description,
            })
        })
        .collect()
}

/// Tab-separated `index<TAB>name` rows from the WIA enumeration script.
pub fn parse_wia_list(stdout: &str) -> Vec<ScannerInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let (index, name) = line.trim_end().split_once('\t')?;
            Some(ScannerInfo {
                id: ScannerId::Wia {
                    index: index.trim().parse().ok()?,
                },
                description: name.trim().to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use printdesk_core::command::testing::{Scripted, ScriptedRunner};

    const SCANIMAGE_L: &str = "device `epson2:libusb:001:004' is a Epson GT-S50 flatbed scanner\n\
device `airscan:e0:HP LaserJet MFP' is a eSCL HP LaserJet MFP ip=10.0.0.7\n";

    #[test]
    fn parses_scanimage_devices() {
        let devices = parse_scanimage_list(SCANIMAGE_L);
        assert_eq!(devices.len(), 2);
        assert_eq!(
            devices[0].id,
            ScannerId::Sane {
                device: "epson2:libusb:001:004".into()
            }
        );
        assert_eq!(devices[0].description, "Epson GT-S50 flatbed scanner");
        assert_eq!(devices[1].id.to_string(), "airscan:e0:HP LaserJet MFP");
    }

    #[test]
    fn ignores_non_device_lines() {
        let out = "\nNo scanners were identified. If you were expecting something different,\n";
        assert!(parse_scanimage_list(out).is_empty());
    }

    #[test]
    fn parses_wia_rows() {
        let devices = parse_wia_list("0\tCanon LiDE 300\r\n1\tUnknown device\r\n");
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].id, ScannerId::Wia { index: 1 });
        assert_eq!(devices[0].description, "Canon LiDE 300");
    }

    #[tokio::test]
    async fn parses_stdout_even_on_failure() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push(Scripted::Exit {
            code: 1,
            stdout: SCANIMAGE_L.into(),
            stderr: "scanimage: sane_open failed".into(),
            file_bytes: None,
        });

        let scanners = ScannerDiscovery::new(runner.clone(), Platform::Posix)
            .scanners()
            .await;
        assert_eq!(scanners.len(), 2);
        assert_eq!(runner.calls()[0].args, vec!["-L"]);
    }

    #[tokio::test]
    async fn missing_scanimage_yields_empty_list() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push(Scripted::NotFound);

        let scanners = ScannerDiscovery::new(runner.clone(), Platform::Posix)
            .scanners()
            .await;
        assert!(scanners.is_empty());
    }
}

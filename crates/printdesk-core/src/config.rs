// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service configuration.
//
// The YAML file is read once at startup, operator overrides are merged once
// via `Config::with_overrides`, and the result is shared read-only for the
// rest of the process lifetime.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{PrintdeskError, Result};
use crate::types::Platform;

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Top-level configuration record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub printing: PrintingConfig,
    #[serde(default)]
    pub scanning: ScanningConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Settings for the hosting server and its login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// `None` or 0 lets the host pick a free port.
    pub port: Option<u16>,
    pub auth_enabled: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssl_enabled: bool,
    pub ssl_cert: Option<PathBuf>,
    pub ssl_key: Option<PathBuf>,
    /// Publish the service beyond the local network.
    pub external_access: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: None,
            auth_enabled: false,
            username: None,
            password: None,
            ssl_enabled: false,
            ssl_cert: None,
            ssl_key: None,
            external_access: false,
        }
    }
}

/// Printing defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintingConfig {
    pub default_printer: Option<String>,
    /// Lowercase extensions including the leading dot (".pdf").
    pub allowed_extensions: BTreeSet<String>,
    /// Upper bound for each print submission command.
    pub timeout_secs: u64,
}

impl Default for PrintingConfig {
    fn default() -> Self {
        Self {
            default_printer: None,
            allowed_extensions: [".pdf", ".txt", ".jpg", ".jpeg", ".png"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeout_secs: 120,
        }
    }
}

impl PrintingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether `extension` (with leading dot, any case) is on the allow-list.
    pub fn is_allowed(&self, extension: &str) -> bool {
        self.allowed_extensions
            .contains(&extension.to_ascii_lowercase())
    }
}

/// Scanner selection and capture settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// SANE device string, used on POSIX.
    pub unix_device_name: Option<String>,
    /// WIA device index (0-based), used on Windows.
    pub device_num: Option<u32>,
    /// Capture resolution in DPI.
    pub resolution: u32,
    pub default_format: String,
    /// Upper bound for one capture, including device warm-up.
    pub timeout_secs: u64,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            unix_device_name: None,
            device_num: None,
            resolution: 300,
            default_format: "jpeg".into(),
            timeout_secs: 300,
        }
    }
}

impl ScanningConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Where uploads and scan artifacts live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub scan_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            scan_dir: PathBuf::from("scans"),
        }
    }
}

impl StorageConfig {
    /// Create the upload and scan directories if they don't exist.
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.scan_dir)?;
        Ok(())
    }
}

/// Printer/scanner identifiers supplied by the operator at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartupOverrides {
    pub printer: Option<String>,
    /// SANE device name on POSIX, numeric device index on Windows.
    pub scanner: Option<String>,
}

impl Config {
    /// Read, normalise and validate the YAML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PrintdeskError::ConfigLoad(format!(
                    "configuration file not found: {}",
                    path.display()
                ))
            } else {
                PrintdeskError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse a YAML document into a normalised, validated config.
    pub fn parse(yaml: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| PrintdeskError::ConfigLoad(e.to_string()))?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Merge operator overrides into this config, consuming it.
    ///
    /// Called once before any backend is built; the returned value is the
    /// configuration for the rest of the run.
    pub fn with_overrides(mut self, overrides: &StartupOverrides, platform: Platform) -> Self {
        if let Some(printer) = non_empty(overrides.printer.as_deref()) {
            debug!(printer, "printer override applied");
            self.printing.default_printer = Some(printer.to_owned());
        }

        if let Some(scanner) = non_empty(overrides.scanner.as_deref()) {
            match platform {
                Platform::Windows => match scanner.trim().parse::<u32>() {
                    Ok(index) => {
                        debug!(index, "scanner index override applied");
                        self.scanning.device_num = Some(index);
                    }
                    Err(_) => {
                        warn!(scanner, "scanner override is not a device index, ignoring");
                    }
                },
                Platform::Posix => {
                    debug!(device = scanner, "scanner device override applied");
                    self.scanning.unix_device_name = Some(scanner.to_owned());
                }
            }
        }

        self
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<()> {
        let server = &self.server;
        if server.auth_enabled
            && (non_empty(server.username.as_deref()).is_none() || server.password.is_none())
        {
            return Err(PrintdeskError::ConfigLoad(
                "server.auth_enabled requires server.username and server.password".into(),
            ));
        }
        if server.ssl_enabled && (server.ssl_cert.is_none() || server.ssl_key.is_none()) {
            return Err(PrintdeskError::ConfigLoad(
                "server.ssl_enabled requires server.ssl_cert and server.ssl_key".into(),
            ));
        }
        if self.scanning.resolution == 0 {
            return Err(PrintdeskError::ConfigLoad(
                "scanning.resolution must be positive".into(),
            ));
        }
        if self.printing.timeout_secs == 0 || self.scanning.timeout_secs == 0 {
            return Err(PrintdeskError::ConfigLoad(
                "timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.printing.allowed_extensions = self
            .printing
            .allowed_extensions
            .iter()
            .map(|ext| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();

        // Empty strings in YAML mean "not configured".
        if non_empty(self.printing.default_printer.as_deref()).is_none() {
            self.printing.default_printer = None;
        }
        if non_empty(self.scanning.unix_device_name.as_deref()).is_none() {
            self.scanning.unix_device_name = None;
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
server:
  host: 0.0.0.0
  port: 7860
  auth_enabled: true
  username: admin
  password: secret
  ssl_enabled: false
  external_access: false
printing:
  default_printer: ""
  allowed_extensions: [".PDF", "png", ".txt"]
scanning:
  unix_device_name: "genesys:libusb:001:002"
  device_num: 0
  resolution: 300
  default_format: jpeg
storage:
  upload_dir: uploads
  scan_dir: scans
"#;

    #[test]
    fn parses_and_normalises_sample() {
        let config = Config::parse(SAMPLE).expect("parse");
        assert_eq!(config.server.port, Some(7860));
        assert!(config.server.auth_enabled);
        assert!(config.printing.default_printer.is_none());
        let exts: Vec<&str> = config
            .printing
            .allowed_extensions
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(exts, vec![".pdf", ".png", ".txt"]);
        assert!(config.printing.is_allowed(".PNG"));
        assert!(!config.printing.is_allowed(".docx"));
        assert_eq!(
            config.scanning.unix_device_name.as_deref(),
            Some("genesys:libusb:001:002")
        );
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = Config::parse("{}").expect("parse");
        assert_eq!(config.scanning.resolution, 300);
        assert_eq!(config.scanning.timeout_secs, 300);
        assert_eq!(config.printing.timeout_secs, 120);
        assert_eq!(config.storage.scan_dir, PathBuf::from("scans"));
        assert!(!config.server.auth_enabled);
    }

    #[test]
    fn auth_without_credentials_is_rejected() {
        let err = Config::parse("server:\n  auth_enabled: true\n").unwrap_err();
        assert!(matches!(err, PrintdeskError::ConfigLoad(_)));
    }

    #[test]
    fn ssl_without_key_is_rejected() {
        let yaml = "server:\n  ssl_enabled: true\n  ssl_cert: cert.pem\n";
        assert!(Config::parse(yaml).is_err());
    }

    #[test]
    fn printer_override_takes_precedence() {
        let mut config = Config::default();
        config.printing.default_printer = Some("Office".into());
        let overrides = StartupOverrides {
            printer: Some("HP_LaserJet".into()),
            scanner: None,
        };
        let merged = config.with_overrides(&overrides, Platform::Posix);
        assert_eq!(merged.printing.default_printer.as_deref(), Some("HP_LaserJet"));
    }

    #[test]
    fn posix_scanner_override_sets_device_name() {
        let overrides = StartupOverrides {
            printer: None,
            scanner: Some("epson2:net:10.0.0.5".into()),
        };
        let merged = Config::default().with_overrides(&overrides, Platform::Posix);
        assert_eq!(
            merged.scanning.unix_device_name.as_deref(),
            Some("epson2:net:10.0.0.5")
        );
        assert!(merged.scanning.device_num.is_none());
    }

    #[test]
    fn windows_scanner_override_parses_index() {
        let overrides = StartupOverrides {
            printer: None,
            scanner: Some("2".into()),
        };
        let merged = Config::default().with_overrides(&overrides, Platform::Windows);
        assert_eq!(merged.scanning.device_num, Some(2));
    }

    #[test]
    fn windows_invalid_index_is_ignored() {
        let mut config = Config::default();
        config.scanning.device_num = Some(1);
        let overrides = StartupOverrides {
            printer: None,
            scanner: Some("first-scanner".into()),
        };
        let merged = config.with_overrides(&overrides, Platform::Windows);
        assert_eq!(merged.scanning.device_num, Some(1));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load(dir.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn ensure_directories_creates_both() {
        let dir = tempfile::tempdir().expect("tempdir");
        let storage = StorageConfig {
            upload_dir: dir.path().join("up"),
            scan_dir: dir.path().join("nested").join("scans"),
        };
        storage.ensure_directories().expect("create");
        assert!(storage.upload_dir.is_dir());
        assert!(storage.scan_dir.is_dir());
    }
}

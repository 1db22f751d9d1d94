// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable guidance for job failures.
//
// The error's own message is always shown verbatim; this adds a plain-English
// suggestion plus a severity and retriable flag carried into job reports.

use serde::{Deserialize, Serialize};

use crate::error::PrintdeskError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Trying again may work (device busy, tool hung).
    Transient,
    /// The user or operator must do something first (log in, install a tool).
    ActionRequired,
    /// Retrying the same request will fail the same way.
    Permanent,
}

/// A failure message paired with an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// The verbatim failure message.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    /// Whether submitting the same job again could succeed.
    pub retriable: bool,
    pub severity: Severity,
}

/// Attach guidance to a `PrintdeskError`.
pub fn humanize_error(err: &PrintdeskError) -> HumanError {
    let message = err.to_string();
    match err {
        PrintdeskError::AuthRequired => HumanError {
            message,
            suggestion: "Log in with the configured username and password, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PrintdeskError::Configuration(_) | PrintdeskError::ConfigLoad(_) => HumanError {
            message,
            suggestion: "Check config/config.yaml or pass --printer / --scanner at startup. Run `printdesk devices` to see what is available.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PrintdeskError::UnsupportedFileType(_) => HumanError {
            message,
            suggestion: "Save the file in one of the allowed formats (for example PDF) and print that instead.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        PrintdeskError::DeviceCommand { detail, .. } => humanize_device_error(message, detail),

        PrintdeskError::Timeout { .. } => HumanError {
            message,
            suggestion: "The device didn't answer in time. Check it is switched on and not busy, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PrintdeskError::PostProcessing(_) => HumanError {
            message,
            suggestion: "The scan was captured but could not be converted. Try scanning again; the raw image is kept in the scan folder.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        PrintdeskError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message,
                    suggestion: "The file couldn't be found. Choose it again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message,
                    suggestion: "The service can't access that location. Check the storage directory permissions.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message,
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        PrintdeskError::Serialization(_) => HumanError {
            message,
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
    }
}

/// Look for well-known CUPS/SANE/WIA phrases in the tool's diagnostic text.
fn humanize_device_error(message: String, detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("busy") {
        HumanError {
            message,
            suggestion: "The device is busy with another job. Wait a moment and try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    } else if lower.contains("does not exist") || lower.contains("unknown printer") {
        HumanError {
            message,
            suggestion: "The printer name is not known to the print system. Run `printdesk devices` and restart with a listed --printer.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("invalid argument") || lower.contains("no device with device num") {
        HumanError {
            message,
            suggestion: "The scanner identifier doesn't match a connected device. Run `printdesk devices` and restart with a listed --scanner.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("cover") || lower.contains("jam") {
        HumanError {
            message,
            suggestion: "Check the device for open covers or stuck paper, then try again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message,
            suggestion: "Try again. If this keeps happening, switch the device off and on.".into(),
            retriable: true,
            severity: Severity::Transient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_verbatim() {
        let err = PrintdeskError::device("lp", "Error printing a.pdf: lp: printer is busy");
        let human = humanize_error(&err);
        assert_eq!(human.message, "Error printing a.pdf: lp: printer is busy");
        assert_eq!(human.severity, Severity::Transient);
    }

    #[test]
    fn timeout_is_retriable() {
        let err = PrintdeskError::Timeout {
            tool: "scanimage".into(),
            secs: 300,
        };
        let human = humanize_error(&err);
        assert!(human.retriable);
        assert_eq!(human.severity, Severity::Transient);
    }

    #[test]
    fn auth_is_action_required() {
        let human = humanize_error(&PrintdeskError::AuthRequired);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn unknown_printer_points_at_devices() {
        let err = PrintdeskError::device(
            "lp",
            "Error printing a.pdf: lp: The printer or class does not exist.",
        );
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(human.suggestion.contains("printdesk devices"));
    }

    #[test]
    fn unsupported_type_is_permanent() {
        let human = humanize_error(&PrintdeskError::UnsupportedFileType(".exe".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface (clap derive). Declarative only.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use printdesk_core::config::{DEFAULT_CONFIG_PATH, StartupOverrides};
use printdesk_core::types::ColorMode;

/// printdesk: print and scan through the operating system's own tools.
///
/// Use `printdesk <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "printdesk", version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Printer to use instead of printing.default_printer.
    #[arg(long, global = true)]
    pub printer: Option<String>,

    /// Scanner to use: SANE device name on Linux/macOS, WIA device index on Windows.
    #[arg(long, global = true)]
    pub scanner: Option<String>,

    /// Emit job reports as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> StartupOverrides {
        StartupOverrides {
            printer: self.printer.clone(),
            scanner: self.scanner.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send files to the printer.
    Print(PrintArgs),

    /// Scan one page to JPEG and derive a 300 DPI PDF.
    Scan(ScanArgs),

    /// List printers and scanners this machine knows about.
    Devices,

    /// Interactive session (login, print, scan, status).
    Shell,
}

/// One-shot login for a single command.
#[derive(Args, Debug, Default)]
pub struct Credentials {
    #[arg(long)]
    pub username: Option<String>,

    #[arg(long, requires = "username")]
    pub password: Option<String>,
}

#[derive(Args, Debug)]
pub struct PrintArgs {
    /// Files to print, in order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub credentials: Credentials,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[arg(long, value_enum, default_value_t = ModeArg::Color)]
    pub mode: ModeArg,

    #[command(flatten)]
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Color,
    #[value(alias = "grayscale")]
    Gray,
    #[value(alias = "bw")]
    Lineart,
}

impl From<ModeArg> for ColorMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Color => ColorMode::Color,
            ModeArg::Gray => ColorMode::Grayscale,
            ModeArg::Lineart => ColorMode::Lineart,
        }
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printdesk: Core types, configuration, errors, and subprocess plumbing
// shared across all crates.

pub mod command;
pub mod config;
pub mod error;
pub mod human_errors;
pub mod types;

pub use command::{CommandError, CommandOutput, CommandRunner, CommandSpec, SystemRunner};
pub use config::{Config, StartupOverrides};
pub use error::{ErrorKind, PrintdeskError};
pub use types::*;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printdesk Print: the print capability and its two platform variants
// (CUPS `lp` on POSIX, the shell print verb on Windows), plus discovery of
// the printers each platform knows about.

pub mod backend;
pub mod cups;
pub mod discovery;
pub mod windows;

pub use backend::{Delivery, PrintBackend, PrintReceipt};
pub use cups::CupsPrintBackend;
pub use discovery::{PrinterDiscovery, PrinterInfo};
pub use windows::ShellPrintBackend;

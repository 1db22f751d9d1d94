// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printdesk Scan: single-page capture through SANE on POSIX and WIA on
// Windows, plus scanner discovery.

pub mod backend;
pub mod discovery;
pub mod sane;
pub mod wia;

pub use backend::ScanBackend;
pub use discovery::{ScannerDiscovery, ScannerId, ScannerInfo};
pub use sane::SaneScanBackend;
pub use wia::WiaScanBackend;

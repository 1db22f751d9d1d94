// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! printdesk-security: access control for the print/scan service.
//!
//! Provides the `AuthGate` consulted before every privileged operation,
//! the login `Session` held by the presentation layer, and the
//! `CredentialVerifier` used at login time.

pub mod auth;

pub use auth::{AuthGate, CredentialVerifier, LoginOutcome, LogoutOutcome, Session, authorize};

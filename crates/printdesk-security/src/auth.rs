// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Access control for privileged operations.
//
// Credentials are checked once, at login. After that every privileged call
// only asks the `AuthGate` whether the caller's `Session` holds a username.
// The gate fails closed: no session means no access when auth is required.

use printdesk_core::config::ServerConfig;
use printdesk_core::error::{PrintdeskError, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

/// Stateless "is this call authorized" decision.
pub fn authorize(username: Option<&str>, required: bool) -> bool {
    if !required {
        return true;
    }
    username.is_some_and(|name| !name.trim().is_empty())
}

/// Per-process gate consulted before every print or scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthGate {
    required: bool,
}

impl AuthGate {
    pub fn new(required: bool) -> Self {
        Self { required }
    }

    pub fn from_config(server: &ServerConfig) -> Self {
        Self::new(server.auth_enabled)
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn authorize(&self, session: &Session) -> bool {
        authorize(session.username(), self.required)
    }

    /// Like [`AuthGate::authorize`] but as a `Result` for `?` propagation.
    pub fn check(&self, session: &Session) -> Result<()> {
        if self.authorize(session) {
            Ok(())
        } else {
            debug!("privileged call without session denied");
            Err(PrintdeskError::AuthRequired)
        }
    }
}

/// Verifies login attempts against the configured username/password.
#[derive(Clone)]
pub struct CredentialVerifier {
    enabled: bool,
    username: String,
    password_digest: [u8; 32],
}

impl std::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("enabled", &self.enabled)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl CredentialVerifier {
    pub fn from_config(server: &ServerConfig) -> Self {
        Self {
            enabled: server.auth_enabled,
            username: server.username.clone().unwrap_or_default(),
            password_digest: digest(server.password.as_deref().unwrap_or_default()),
        }
    }

    /// Always true when auth is disabled.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let user_ok = username == self.username;
        let pass_ok = constant_time_eq(&digest(password), &self.password_digest);
        user_ok && pass_ok
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

fn constant_time_eq(a: &[u8; 32], b: &[u8; 32]) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// One logical login. Owned by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    username: Option<String>,
}

/// Result of [`Session::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    AlreadyLoggedIn,
    Welcome(String),
    InvalidCredentials,
}

impl std::fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyLoggedIn => f.write_str("Already logged in"),
            Self::Welcome(name) => write!(f, "Welcome, {name}!"),
            Self::InvalidCredentials => f.write_str("Invalid credentials"),
        }
    }
}

/// Result of [`Session::logout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    NotLoggedIn,
}

impl std::fmt::Display for LogoutOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LoggedOut => f.write_str("Logged out successfully"),
            Self::NotLoggedIn => f.write_str("Not logged in"),
        }
    }
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session that is already logged in (one-shot CLI use).
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        authorize(self.username(), true)
    }

    pub fn login(
        &mut self,
        verifier: &CredentialVerifier,
        username: &str,
        password: &str,
    ) -> LoginOutcome {
        if self.is_authenticated() {
            return LoginOutcome::AlreadyLoggedIn;
        }
        if verifier.verify(username, password) {
            info!(username, "login succeeded");
            self.username = Some(username.to_owned());
            LoginOutcome::Welcome(username.to_owned())
        } else {
            warn!(username, "login rejected");
            LoginOutcome::InvalidCredentials
        }
    }

    pub fn logout(&mut self) -> LogoutOutcome {
        match self.username.take() {
            Some(name) if !name.trim().is_empty() => {
                info!(username = %name, "logged out");
                LogoutOutcome::LoggedOut
            }
            _ => LogoutOutcome::NotLoggedIn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(auth_enabled: bool) -> ServerConfig {
        ServerConfig {
            auth_enabled,
            username: Some("admin".into()),
            password: Some("s3cret".into()),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn not_required_always_authorizes() {
        assert!(authorize(None, false));
        assert!(authorize(Some(""), false));
    }

    #[test]
    fn required_needs_non_empty_username() {
        assert!(!authorize(None, true));
        assert!(!authorize(Some(""), true));
        assert!(!authorize(Some("   "), true));
        assert!(authorize(Some("alice"), true));
    }

    #[test]
    fn gate_check_fails_closed() {
        let gate = AuthGate::new(true);
        let err = gate.check(&Session::anonymous()).unwrap_err();
        assert!(matches!(err, PrintdeskError::AuthRequired));
        assert!(gate.check(&Session::authenticated("alice")).is_ok());
    }

    #[test]
    fn verifier_checks_both_fields() {
        let verifier = CredentialVerifier::from_config(&server(true));
        assert!(verifier.verify("admin", "s3cret"));
        assert!(!verifier.verify("admin", "wrong"));
        assert!(!verifier.verify("root", "s3cret"));
    }

    #[test]
    fn verifier_open_when_auth_disabled() {
        let verifier = CredentialVerifier::from_config(&server(false));
        assert!(verifier.verify("anyone", "anything"));
    }

    #[test]
    fn verifier_debug_hides_password() {
        let verifier = CredentialVerifier::from_config(&server(true));
        let rendered = format!("{verifier:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("password_digest"));
    }

    #[test]
    fn login_logout_lifecycle() {
        let verifier = CredentialVerifier::from_config(&server(true));
        let mut session = Session::anonymous();

        assert_eq!(session.logout(), LogoutOutcome::NotLoggedIn);
        assert_eq!(
            session.login(&verifier, "admin", "nope"),
            LoginOutcome::InvalidCredentials
        );
        assert!(!session.is_authenticated());

        let outcome = session.login(&verifier, "admin", "s3cret");
        assert_eq!(outcome.to_string(), "Welcome, admin!");
        assert_eq!(session.username(), Some("admin"));
        assert_eq!(
            session.login(&verifier, "admin", "s3cret"),
            LoginOutcome::AlreadyLoggedIn
        );

        assert_eq!(session.logout().to_string(), "Logged out successfully");
        assert!(session.username().is_none());
    }
}

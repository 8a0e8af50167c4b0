// LineDash - core/auth.rs
//
// Dashboard login gate: a plain credential-equality check.
//
// The gate hands back an explicit `AuthSession` value; the application state
// owns it for as long as the window is open. Nothing here is global.

use crate::util::error::AuthError;
use chrono::{DateTime, Utc};

/// Configured dashboard credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Hand-written so the password never reaches a log line via `{:?}`.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub username: String,
    pub started_at: DateTime<Utc>,
}

/// Decides whether the dashboard may be shown.
#[derive(Debug, Clone, Default)]
pub struct LoginGate {
    credentials: Option<Credentials>,
}

impl LoginGate {
    /// A gate requiring `credentials`.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Some(credentials),
        }
    }

    /// A gate that admits everyone.
    pub fn open() -> Self {
        Self { credentials: None }
    }

    /// False when no credentials are configured.
    pub fn is_required(&self) -> bool {
        self.credentials.is_some()
    }

    /// Session handed out when the gate is open.
    pub fn anonymous_session(&self) -> Option<AuthSession> {
        if self.is_required() {
            return None;
        }
        Some(AuthSession {
            username: "anonymous".to_string(),
            started_at: Utc::now(),
        })
    }

    /// Check a username/password pair.
    pub fn login(&self, username: &str, password: &str) -> Result<AuthSession, AuthError> {
        let username = username.trim();
        let Some(expected) = &self.credentials else {
            return Ok(AuthSession {
                username: if username.is_empty() {
                    "anonymous".to_string()
                } else {
                    username.to_string()
                },
                started_at: Utc::now(),
            });
        };

        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingInput);
        }

        if username == expected.username && password == expected.password {
            tracing::info!(user = username, "Login succeeded");
            Ok(AuthSession {
                username: username.to_string(),
                started_at: Utc::now(),
            })
        } else {
            tracing::warn!(user = username, "Login rejected");
            Err(AuthError::InvalidCredentials)
        }
    }
}

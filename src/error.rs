// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the engines and their collaborators.

use serde::Deserialize;

/// Application error type.
///
/// The first four variants are the failure classes callers are expected to
/// branch on; the rest wrap collaborator-specific detail.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("{service} error: {message}")]
    Transport {
        service: &'static str,
        status: Option<u16>,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Transport failure without an HTTP status (connection, decoding, database).
    pub fn transport(service: &'static str, message: impl Into<String>) -> Self {
        AppError::Transport {
            service,
            status: None,
            message: message.into(),
        }
    }

    /// True for consent/token failures that survived the retry policy.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }

    /// HTTP status reported by the collaborator, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

/// Structured error returned by a REST collaborator (HTTP status + message).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("HTTP {status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Status used for failures that never produced a response.
    pub const NO_RESPONSE: u16 = 0;

    /// Error for a request that failed before a status was received.
    pub fn no_response(message: impl Into<String>) -> Self {
        Self::new(Self::NO_RESPONSE, message)
    }

    /// 401 means the bearer token was rejected and a fresh grant may help.
    pub fn is_auth_failure(&self) -> bool {
        self.status == 401
    }

    /// Build an error from a non-2xx response body.
    ///
    /// Google APIs wrap errors as `{"error": {"code": .., "message": ..}}`;
    /// anything else falls back to the raw status.
    pub fn from_body(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: Detail,
        }
        #[derive(Deserialize)]
        struct Detail {
            message: Option<String>,
        }

        let message = serde_json::from_str::<Envelope>(body)
            .ok()
            .and_then(|e| e.error.message)
            .unwrap_or_else(|| format!("Google API error: {}", status));
        Self::new(status, message)
    }

    /// Lift into the application taxonomy for a named collaborator.
    pub fn into_app_error(self, service: &'static str) -> AppError {
        AppError::Transport {
            service,
            status: (self.status != Self::NO_RESPONSE).then_some(self.status),
            message: self.message,
        }
    }
}

/// Identity failures, collapsed to the cases the dashboard distinguishes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid email or password")]
    InvalidCredential,

    #[error("This email is already registered")]
    EmailAlreadyInUse,

    #[error("Password should be at least 6 characters")]
    WeakPassword,

    #[error("Something went wrong. Try again. ({0})")]
    Other(String),
}

impl IdentityError {
    /// Map an Identity Toolkit error code (e.g. `EMAIL_EXISTS`) to the taxonomy.
    ///
    /// Codes may carry a suffix such as `WEAK_PASSWORD : Password should be ...`.
    pub fn from_code(code: &str) -> Self {
        let head = code.split(':').next().unwrap_or("").trim();
        match head {
            "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND"
            | "INVALID_EMAIL" => IdentityError::InvalidCredential,
            "EMAIL_EXISTS" => IdentityError::EmailAlreadyInUse,
            "WEAK_PASSWORD" => IdentityError::WeakPassword,
            _ => IdentityError::Other(code.to_string()),
        }
    }
}

/// Result type alias for engine and collaborator operations.
pub type Result<T> = std::result::Result<T, AppError>;

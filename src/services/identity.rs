// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity collaborator: email/password accounts via Firebase Identity Toolkit.

use crate::error::{AppError, IdentityError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SERVICE: &str = "Identity";

/// Signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Stable user identifier (owner key for run records)
    pub uid: String,
    pub email: Option<String>,
}

/// Authentication collaborator.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// The currently signed-in user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Receiver that observes every sign-in and sign-out.
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AppError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AppError>;

    async fn sign_out(&self) -> Result<(), AppError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Firebase Identity Toolkit REST client.
pub struct FirebaseAuth {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    current: watch::Sender<Option<AuthUser>>,
}

impl FirebaseAuth {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different endpoint (emulator or test server).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            current,
        }
    }

    async fn password_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AppError> {
        let url = format!("{}/accounts:{}", self.base_url, endpoint);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|e| AppError::transport(SERVICE, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorEnvelope>(&body) {
                Ok(envelope) => IdentityError::from_code(&envelope.error.message).into(),
                Err(_) => AppError::Transport {
                    service: SERVICE,
                    status: Some(status.as_u16()),
                    message: body,
                },
            });
        }

        let body: PasswordResponse = response
            .json()
            .await
            .map_err(|e| AppError::transport(SERVICE, format!("JSON parse error: {}", e)))?;

        let user = AuthUser {
            uid: body.local_id,
            email: body.email.or_else(|| Some(email.to_string())),
        };
        self.current.send_replace(Some(user.clone()));
        tracing::info!(user_id = %user.uid, endpoint, "User authenticated");
        Ok(user)
    }
}

#[async_trait]
impl IdentityService for FirebaseAuth {
    fn current_user(&self) -> Option<AuthUser> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.current.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        self.password_call("signInWithPassword", email, password)
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AppError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_out(&self) -> Result<(), AppError> {
        if let Some(user) = self.current.send_replace(None) {
            tracing::info!(user_id = %user.uid, "User signed out");
        }
        Ok(())
    }
}

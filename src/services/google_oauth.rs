// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar access-token acquisition.
//!
//! The calendar engine only knows the [`TokenProvider`] seam. The Google
//! implementation exchanges a stored refresh token for a short-lived access
//! token; the result lives in memory only.

use crate::config::GoogleOAuthConfig;
use crate::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;

const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SERVICE: &str = "Google OAuth";

/// Source of calendar access tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Obtain a fresh access token, suspending until the grant resolves.
    ///
    /// A denied grant is reported as [`AppError::Auth`].
    async fn request_access_token(&self) -> Result<String, AppError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Refresh-token grant against Google's OAuth endpoint.
#[derive(Clone)]
pub struct GoogleTokenProvider {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
}

impl GoogleTokenProvider {
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self::with_token_url(config, DEFAULT_TOKEN_URL.to_string())
    }

    pub fn with_token_url(config: &GoogleOAuthConfig, token_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            refresh_token: config.refresh_token.clone(),
        }
    }
}

#[async_trait]
impl TokenProvider for GoogleTokenProvider {
    async fn request_access_token(&self) -> Result<String, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| {
                AppError::transport(SERVICE, format!("Token request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // 400/401 with an OAuth error body means the grant itself was refused
            if let Ok(err) = serde_json::from_str::<TokenErrorResponse>(&body) {
                tracing::warn!(error = %err.error, "Calendar access was not granted");
                return Err(AppError::Auth(match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                }));
            }
            return Err(AppError::Transport {
                service: SERVICE,
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::transport(SERVICE, format!("Failed to parse token response: {}", e))
        })?;

        tracing::info!(expires_in = ?token.expires_in, "Calendar access token granted");
        Ok(token.access_token)
    }
}

//! Auth service client.
//!
//! Authentication is delegated entirely to the hosted auth service; this
//! client only shuttles credentials and tokens. Account ids minted at
//! sign-up are the document keys for everything else in the system.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;

use hidden_fork_core::{AccountId, Email};

use crate::config::BackendConfig;

/// Errors that can occur during auth operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("account already exists")]
    EmailInUse,

    /// The service rejected the password.
    #[error("password rejected: {0}")]
    WeakPassword(String),

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an unexpected status.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it was readable.
        message: String,
    },
}

/// An authenticated session.
///
/// `Debug` redacts the token so sessions can be logged safely.
#[derive(Clone)]
pub struct Session {
    /// The account this session belongs to.
    pub account_id: AccountId,
    /// The account's email address.
    pub email: Email,
    /// Bearer token for follow-up auth calls.
    pub id_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("account_id", &self.account_id)
            .field("email", &self.email)
            .field("id_token", &"[REDACTED]")
            .finish()
    }
}

/// Credential and session operations against the hosted auth service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Create an account and return its first session.
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Session, AuthError>;

    /// Exchange credentials for a session.
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, AuthError>;

    /// Verify the current password without starting a new session.
    ///
    /// The settings flows call this before a password change.
    async fn reauthenticate(&self, email: &Email, current_password: &str)
    -> Result<(), AuthError>;

    /// Set a new password for the session's account.
    async fn change_password(&self, session: &Session, new_password: &str)
    -> Result<(), AuthError>;
}

/// HTTP client for the hosted auth service.
#[derive(Clone)]
pub struct HttpAuthClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    account_id: String,
    email: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl HttpAuthClient {
    /// Create a new auth client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!(
                "{}/v1/{}/accounts",
                config.api_base_url.trim_end_matches('/'),
                config.project_id
            ),
            api_key: config.api_key.expose_secret().to_string(),
        }
    }

    async fn call(
        &self,
        verb: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, AuthError> {
        let url = format!("{}:{verb}", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // The service reports credential problems through a coded message
        // in the error body; anything else is surfaced as-is.
        let text = response.text().await.unwrap_or_default();
        if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&text) {
            let code = parsed.error.message;
            if code.starts_with("WEAK_PASSWORD") {
                let detail = code
                    .split_once(':')
                    .map_or_else(|| code.clone(), |(_, d)| d.trim().to_string());
                return Err(AuthError::WeakPassword(detail));
            }
            match code.as_str() {
                "EMAIL_EXISTS" => return Err(AuthError::EmailInUse),
                "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" | "INVALID_CREDENTIALS" => {
                    return Err(AuthError::InvalidCredentials);
                }
                _ => {}
            }
        }
        Err(AuthError::Api {
            status: status.as_u16(),
            message: text.chars().take(200).collect(),
        })
    }

    async fn session_call(
        &self,
        verb: &str,
        email: &Email,
        password: &str,
    ) -> Result<Session, AuthError> {
        let body = serde_json::json!({ "email": email.as_str(), "password": password });
        let response = self.call(verb, body).await?;
        let session: SessionResponse = response.json().await.map_err(AuthError::Http)?;
        let email = Email::parse(&session.email).map_err(|e| AuthError::Api {
            status: 200,
            message: format!("malformed email in session response: {e}"),
        })?;
        Ok(Session {
            account_id: AccountId::new(session.account_id),
            email,
            id_token: session.id_token,
        })
    }
}

#[async_trait]
impl AuthBackend for HttpAuthClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(&self, email: &Email, password: &str) -> Result<Session, AuthError> {
        self.session_call("signUp", email, password).await
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(&self, email: &Email, password: &str) -> Result<Session, AuthError> {
        self.session_call("signInWithPassword", email, password).await
    }

    #[instrument(skip(self, current_password), fields(email = %email))]
    async fn reauthenticate(
        &self,
        email: &Email,
        current_password: &str,
    ) -> Result<(), AuthError> {
        self.session_call("signInWithPassword", email, current_password)
            .await
            .map(|_| ())
    }

    #[instrument(skip(self, session, new_password))]
    async fn change_password(
        &self,
        session: &Session,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let body = serde_json::json!({
            "idToken": session.id_token,
            "password": new_password,
        });
        self.call("update", body).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_debug_redacts_token() {
        let session = Session {
            account_id: AccountId::new("u-1"),
            email: Email::parse("a@b.c").expect("valid email"),
            id_token: "very-secret-token".to_string(),
        };
        let debug_output = format!("{session:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("very-secret-token"));
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid credentials"
        );
        assert_eq!(
            AuthError::WeakPassword("too short".to_string()).to_string(),
            "password rejected: too short"
        );
    }
}

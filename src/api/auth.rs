//! OAuth2 client-credentials authentication.
//!
//! [`TokenProvider`] performs the raw exchange against `/oauth/token`.
//! [`Session`] owns the current token and decides, per [`TokenPolicy`], when a
//! new one has to be requested.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use reqwest::Client;
use tokio::sync::Mutex;

use super::error::AuthError;
use super::types::TokenResponse;
use crate::config::Credentials;

/// Bearer token issued by the authorization server.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// When a [`Session`] requests a new token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenPolicy {
    /// A fresh token for every outbound call.
    PerRequest,
    /// One token for the whole run.
    #[default]
    PerRun,
    /// Reuse the token until it is older than the given age.
    MaxAge(Duration),
}

impl FromStr for TokenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-request" | "per_request" | "request" => Ok(Self::PerRequest),
            "per-run" | "per_run" | "run" => Ok(Self::PerRun),
            other => other
                .parse::<u64>()
                .map(|secs| Self::MaxAge(Duration::from_secs(secs)))
                .map_err(|_| {
                    format!(
                        "expected 'per-run', 'per-request' or a max age in seconds, got '{}'",
                        s
                    )
                }),
        }
    }
}

/// Performs the client-credentials exchange.
pub struct TokenProvider {
    client: Client,
    token_url: String,
    credentials: Credentials,
}

impl TokenProvider {
    pub fn new(client: Client, base_url: &str, credentials: Credentials) -> Self {
        Self {
            client,
            token_url: format!("{}/oauth/token", base_url.trim_end_matches('/')),
            credentials,
        }
    }

    /// Request a new access token.
    pub async fn acquire_token(&self) -> Result<AccessToken, AuthError> {
        let form = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let resp = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(AuthError::Request)?;

        let status = resp.status();
        let text = resp.text().await.map_err(AuthError::Request)?;

        if !status.is_success() {
            return Err(AuthError::Status { status, body: text });
        }

        let parsed: TokenResponse = serde_json::from_str(&text).map_err(AuthError::Decode)?;
        match parsed.access_token {
            Some(token) if !token.is_empty() => {
                tracing::debug!("Acquired access token");
                Ok(AccessToken::new(token))
            }
            _ => Err(AuthError::MissingToken),
        }
    }
}

struct IssuedToken {
    token: AccessToken,
    acquired_at: Instant,
}

/// Holds the current token and refreshes it on demand.
pub struct Session {
    provider: TokenProvider,
    policy: TokenPolicy,
    current: Mutex<Option<IssuedToken>>,
}

impl Session {
    pub fn new(provider: TokenProvider, policy: TokenPolicy) -> Self {
        Self {
            provider,
            policy,
            current: Mutex::new(None),
        }
    }

    /// Token to authorize the next call, acquiring a new one if the policy
    /// requires it.
    pub async fn token(&self) -> Result<AccessToken, AuthError> {
        let mut current = self.current.lock().await;

        let reusable = match (&*current, self.policy) {
            (None, _) | (_, TokenPolicy::PerRequest) => None,
            (Some(issued), TokenPolicy::PerRun) => Some(issued.token.clone()),
            (Some(issued), TokenPolicy::MaxAge(max_age)) => {
                (issued.acquired_at.elapsed() < max_age).then(|| issued.token.clone())
            }
        };
        if let Some(token) = reusable {
            return Ok(token);
        }

        let token = self.provider.acquire_token().await?;
        *current = Some(IssuedToken {
            token: token.clone(),
            acquired_at: Instant::now(),
        });
        Ok(token)
    }

    /// When the current token was acquired, if any.
    pub async fn acquired_at(&self) -> Option<Instant> {
        self.current.lock().await.as_ref().map(|t| t.acquired_at)
    }
}

//! Bearer token management
//!
//! vRA accepts either a long-lived access token or a refresh token that is
//! exchanged for short-lived bearer tokens. On-prem installations exchange at
//! `/iaas/api/login`; vRA Cloud exchanges at the CSP authorize endpoint.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, Result};

/// CSP endpoint used by vRA Cloud to authorize refresh tokens
pub const CSP_AUTHORIZE_URL: &str =
    "https://console.cloud.vmware.com/csp/gateway/am/api/auth/api-tokens/authorize";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct CspAuthorizeResponse {
    access_token: String,
}

#[derive(Debug, Clone)]
struct Token {
    value: String,
    obtained_at: Instant,
}

/// Holds credentials and the current bearer token
pub(crate) struct TokenStore {
    credentials: Credentials,
    base_url: String,
    cloud: bool,
    reauthorize_after: Duration,
    current: RwLock<Option<Token>>,
}

impl TokenStore {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            credentials: config.credentials.clone(),
            base_url: config.url.trim_end_matches('/').to_string(),
            cloud: config.is_cloud(),
            reauthorize_after: config.reauthorize_timeout,
            current: RwLock::new(None),
        }
    }

    /// Whether a fresh token can be obtained after a 401
    pub fn can_refresh(&self) -> bool {
        matches!(self.credentials, Credentials::RefreshToken(_))
    }

    /// Current bearer token, logging in again when it is too old
    pub async fn bearer(&self, http: &reqwest::Client) -> Result<String> {
        match &self.credentials {
            Credentials::AccessToken(token) => Ok(token.clone()),
            Credentials::RefreshToken(_) => {
                {
                    let current = self.current.read().await;
                    if let Some(token) = current.as_ref() {
                        if token.obtained_at.elapsed() < self.reauthorize_after {
                            return Ok(token.value.clone());
                        }
                    }
                }
                self.refresh(http).await
            }
        }
    }

    /// Exchange the refresh token for a new bearer token
    pub async fn refresh(&self, http: &reqwest::Client) -> Result<String> {
        let refresh_token = match &self.credentials {
            Credentials::RefreshToken(token) => token,
            Credentials::AccessToken(token) => return Ok(token.clone()),
        };

        let mut current = self.current.write().await;
        let value = if self.cloud {
            self.authorize_csp(http, refresh_token).await?
        } else {
            self.login(http, refresh_token).await?
        };
        info!("Obtained vRA bearer token");
        *current = Some(Token {
            value: value.clone(),
            obtained_at: Instant::now(),
        });
        Ok(value)
    }

    async fn login(&self, http: &reqwest::Client, refresh_token: &str) -> Result<String> {
        let url = format!("{}/iaas/api/login", self.base_url);
        debug!("POST {}", url);

        let response = http
            .post(&url)
            .json(&LoginRequest { refresh_token })
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("login returned {}: {}", status, body)));
        }
        let body: LoginResponse = response.json().await?;
        Ok(body.token)
    }

    async fn authorize_csp(&self, http: &reqwest::Client, refresh_token: &str) -> Result<String> {
        debug!("POST {}", CSP_AUTHORIZE_URL);

        let response = http
            .post(CSP_AUTHORIZE_URL)
            .form(&[("refresh_token", refresh_token)])
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("CSP authorize returned {}: {}", status, body)));
        }
        let body: CspAuthorizeResponse = response.json().await?;
        Ok(body.access_token)
    }
}

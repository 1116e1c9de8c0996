//! OAuth client-credentials tokens for gateway calls.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{GateError, GateResult};
use crate::services::TokenSource;
use crate::types::ClientInfo;

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,

    #[serde(default)]
    expires_in: Option<u64>,

    #[serde(default)]
    token_type: Option<String>,
}

/// Requests access tokens from the token endpoint named in [`ClientInfo`].
#[derive(Debug, Clone)]
pub struct OAuthTokenClient {
    client: reqwest::Client,
}

impl OAuthTokenClient {
    pub fn new(timeout: Duration) -> GateResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GateError::Network {
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TokenSource for OAuthTokenClient {
    async fn access_token(&self, client: &ClientInfo) -> GateResult<String> {
        let mut form = vec![("grant_type", "client_credentials")];
        if let Some(scope) = client.scope.as_deref() {
            form.push(("scope", scope));
        }

        let response = self
            .client
            .post(&client.token_endpoint)
            .basic_auth(&client.client_id, Some(&client.client_secret))
            .form(&form)
            .send()
            .await
            .map_err(|e| GateError::Network {
                message: format!("failed to request access token: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GateError::Unauthorized {
                message: format!("token request failed: HTTP {} - {}", status, body),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| GateError::invalid_response("failed to parse token response", e))?;

        debug!(
            expires_in = ?token.expires_in,
            token_type = ?token.token_type,
            "access token obtained"
        );

        Ok(token.access_token)
    }
}

//! HTTP layer: request execution and status mapping.
//!
//! This is the ONLY place for status code handling. client/mod.rs never
//! interprets status codes.

use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{GateError, GateResult};

/// HTTP backend for making requests (holds reqwest client, base URL, token).
#[derive(Debug, Clone)]
pub(crate) struct HttpBackend {
    pub(crate) client: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) token: Option<String>,
}

impl HttpBackend {
    /// Send a request and decode the JSON body (`Value::Null` for an empty body).
    pub(crate) async fn send_json(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> GateResult<Value> {
        let response = self.request(method, url, body).await?;
        let text = response.text().await.map_err(|e| GateError::Network {
            message: format!("failed to read response body: {}", e),
        })?;

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| GateError::invalid_response("malformed JSON", e))
    }

    /// Make a single request. No retries.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&Value>,
    ) -> GateResult<reqwest::Response> {
        debug!(method = %method, url = %url, "control-plane request");

        let path = url.path().to_string();
        let mut request = self.client.request(method, url);

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        match status.as_u16() {
            200..=299 => Ok(response),

            401 | 403 => {
                let message = response.text().await.unwrap_or_default();
                Err(GateError::Unauthorized {
                    message: if message.is_empty() {
                        format!("HTTP {} for {}", status.as_u16(), path)
                    } else {
                        message
                    },
                })
            }

            404 => Err(GateError::NotFound { resource: path }),

            409 => {
                let message = response.text().await.unwrap_or_else(|_| status.to_string());
                Err(GateError::Conflict { message })
            }

            _ => {
                let message = response.text().await.unwrap_or_else(|_| status.to_string());
                Err(GateError::Remote {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

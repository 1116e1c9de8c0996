//! Pure helpers: endpoint building and list-page parsing (no HTTP, no status logic).

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{GateError, GateResult};

/// Join path segments onto the base URL, percent-encoding each segment.
///
/// An empty trailing segment produces a trailing slash (`/gateways/`).
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> GateResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GateError::Config {
            message: format!("control-plane URL cannot be a base: {base}"),
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// One page of a list response: the items under `key` and the continuation token.
pub(crate) fn parse_page<T: DeserializeOwned>(
    body: Value,
    key: &str,
) -> GateResult<(Vec<T>, Option<String>)> {
    let next_token = body
        .get("nextToken")
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .map(String::from);

    let items = match body.get(key) {
        Some(items) => serde_json::from_value(items.clone())
            .map_err(|e| GateError::invalid_response(&format!("failed to parse {key}"), e))?,
        None => Vec::new(),
    };

    Ok((items, next_token))
}

//! Shared HTTP plumbing for the lookup clients.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::LookupError;

/// Builds a `reqwest` client with the configured timeout and user agent.
///
/// # Errors
///
/// Returns [`LookupError::Http`] if the client cannot be constructed.
pub fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, LookupError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;
    Ok(client)
}

/// Parses `base_url` and appends `endpoint` as its last path segment.
///
/// The base is normalised to end with exactly one slash first, so both
/// `http://host/api` and `http://host/api/` resolve to `http://host/api/<endpoint>`.
///
/// # Errors
///
/// Returns [`LookupError::InvalidBaseUrl`] if the result is not a valid URL.
pub fn endpoint_url(base_url: &str, endpoint: &str) -> Result<Url, LookupError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised)
        .and_then(|base| base.join(endpoint))
        .map_err(|e| LookupError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })
}

/// Sends a GET with `query` and decodes the JSON body.
///
/// `429` maps to [`LookupError::RateLimited`] tagged with `service`; any other
/// non-2xx status maps to [`LookupError::UnexpectedStatus`].
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    url: &Url,
    query: &[(&str, String)],
    service: &'static str,
) -> Result<T, LookupError> {
    let response = client.get(url.clone()).query(query).send().await?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(LookupError::RateLimited { service });
    }
    if !status.is_success() {
        return Err(LookupError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| LookupError::Deserialize {
        context: url.to_string(),
        source: e,
    })
}

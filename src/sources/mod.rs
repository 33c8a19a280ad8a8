//! Source clients and shared HTTP utilities for the upstream services.

use reqwest::header::HeaderValue;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::PathoNetError;

pub mod config;
pub(crate) mod opentargets;
pub(crate) mod reactome;
pub(crate) mod string;

pub use config::SourcesConfig;

const ERROR_EXCERPT_CHARS: usize = 300;
const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

/// Builds the HTTP client used by every source client.
///
/// - Timeouts: request and connect budgets from [`SourcesConfig`]
/// - Retry: exponential backoff on transient errors, `max_retries` attempts
pub(crate) fn http_client(config: &SourcesConfig) -> Result<ClientWithMiddleware, PathoNetError> {
    let base_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(concat!("pathonet/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(PathoNetError::HttpClientInit)?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);

    Ok(ClientBuilder::new(base_client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Sends `req` and decodes a JSON body, mapping failures onto [`PathoNetError`].
pub(crate) async fn send_json<T: DeserializeOwned>(
    api: &str,
    req: reqwest_middleware::RequestBuilder,
) -> Result<T, PathoNetError> {
    let resp = req.send().await?;
    let status = resp.status();
    let media_type = media_type(resp.headers().get(reqwest::header::CONTENT_TYPE));
    let bytes = read_capped(resp, api).await?;

    let upstream_error = |what: String| PathoNetError::Api {
        api: api.to_string(),
        message: format!("{what}: {}", excerpt(&bytes)),
    };
    if !status.is_success() {
        return Err(upstream_error(format!("HTTP {status}")));
    }
    match media_type.as_deref() {
        // Maintenance pages and captive portals answer 200 with HTML.
        Some("text/html" | "application/xhtml+xml") => {
            return Err(upstream_error("HTML page instead of JSON".to_string()));
        }
        Some(other) if !is_json_media_type(other) => {
            debug!(source = api, content_type = other, "Decoding non-JSON content type as JSON");
        }
        _ => {}
    }

    serde_json::from_slice(&bytes).map_err(|source| PathoNetError::ApiJson {
        api: api.to_string(),
        source,
    })
}

/// Lowercased media type without parameters; `None` when absent or unreadable.
fn media_type(header: Option<&HeaderValue>) -> Option<String> {
    let value = header?.to_str().ok()?;
    let essence = value.split(';').next()?.trim();
    (!essence.is_empty()).then(|| essence.to_ascii_lowercase())
}

fn is_json_media_type(media_type: &str) -> bool {
    matches!(media_type, "application/json" | "text/json") || media_type.ends_with("+json")
}

/// Single-line preview of an upstream body for error messages.
fn excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut words = text.split_whitespace();
    let mut out = String::new();
    for word in words.by_ref() {
        if out.chars().count() + word.chars().count() > ERROR_EXCERPT_CHARS {
            out.push_str(" …");
            return out;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Buffers the body, refusing anything over [`MAX_BODY_BYTES`].
async fn read_capped(mut resp: reqwest::Response, api: &str) -> Result<Vec<u8>, PathoNetError> {
    let too_large = || PathoNetError::Api {
        api: api.to_string(),
        message: format!("Response body larger than {MAX_BODY_BYTES} bytes"),
    };
    if resp
        .content_length()
        .is_some_and(|len| len > MAX_BODY_BYTES as u64)
    {
        return Err(too_large());
    }

    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

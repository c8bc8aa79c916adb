//! Best-effort link shortening for image fallbacks.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use mxd_config::{HttpMethod, UrlShortenerConfig};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Map, Value};
use tracing::debug;
use ureq::Agent;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 10;

/// RFC 3986 unreserved characters stay as they are.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Error from a shortener call.
#[derive(Debug, thiserror::Error)]
pub enum ShortenError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    Http(#[from] ureq::Error),

    /// Server returned an error status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse { status: u16, body: String },

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Response JSON lacks the configured field.
    #[error("response has no string field `{0}`")]
    MissingField(String),

    /// Blocking request task panicked or was cancelled.
    #[error("shortener task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Turns a long URL into a short one.
#[async_trait]
pub trait LinkShortener: Send + Sync {
    async fn shorten(&self, url: &str) -> Result<String, ShortenError>;
}

/// Shortener backed by a JSON HTTP service.
///
/// Requests block, so `shorten` runs them on [`tokio::task::spawn_blocking`]
/// and must be awaited inside a Tokio runtime.
#[derive(Clone, Debug)]
pub struct HttpLinkShortener {
    agent: Agent,
    endpoint: String,
    method: HttpMethod,
    url_field: String,
    short_field: String,
    extra_body: BTreeMap<String, String>,
}

impl HttpLinkShortener {
    #[must_use]
    pub fn from_config(config: &UrlShortenerConfig) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            endpoint: config.endpoint.clone(),
            method: config.method,
            url_field: config.url_field.clone(),
            short_field: config.short_field.clone(),
            extra_body: config.extra_body.clone(),
        }
    }

    /// Request fields: the static extras plus the long URL.
    fn fields<'a>(&'a self, url: &'a str) -> BTreeMap<&'a str, &'a str> {
        let mut fields: BTreeMap<&str, &str> = self
            .extra_body
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        fields.insert(&self.url_field, url);
        fields
    }

    fn query_url(&self, url: &str) -> String {
        let query = self
            .fields(url)
            .into_iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, QUERY_ENCODE_SET),
                    utf8_percent_encode(v, QUERY_ENCODE_SET)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.endpoint)
    }

    fn json_body(&self, url: &str) -> Value {
        Value::Object(
            self.fields(url)
                .into_iter()
                .map(|(k, v)| (k.to_owned(), Value::String(v.to_owned())))
                .collect::<Map<_, _>>(),
        )
    }

    fn shorten_blocking(&self, url: &str) -> Result<String, ShortenError> {
        debug!("Shortening {} via {} {}", url, self.method.as_str(), self.endpoint);

        let response = match self.method {
            HttpMethod::Get => self
                .agent
                .get(self.query_url(url))
                .header("Accept", "application/json")
                .call()?,
            HttpMethod::Post => self
                .agent
                .post(&self.endpoint)
                .header("Accept", "application/json")
                .send_json(self.json_body(url))?,
            HttpMethod::Put => self
                .agent
                .put(&self.endpoint)
                .header("Accept", "application/json")
                .send_json(self.json_body(url))?,
            HttpMethod::Patch => self
                .agent
                .patch(&self.endpoint)
                .header("Accept", "application/json")
                .send_json(self.json_body(url))?,
        };

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if status >= 400 {
            let error_body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ShortenError::HttpResponse {
                status,
                body: error_body,
            });
        }

        let body = body_reader.read_to_string()?;
        extract_short_url(&body, &self.short_field)
    }
}

#[async_trait]
impl LinkShortener for HttpLinkShortener {
    async fn shorten(&self, url: &str) -> Result<String, ShortenError> {
        let shortener = self.clone();
        let url = url.to_owned();
        tokio::task::spawn_blocking(move || shortener.shorten_blocking(&url)).await?
    }
}

fn extract_short_url(body: &str, field: &str) -> Result<String, ShortenError> {
    let value: Value = serde_json::from_str(body)?;
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| ShortenError::MissingField(field.to_owned()))
}

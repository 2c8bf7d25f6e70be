use reqwest::{Client, Method, Url};
use tracing::debug;

use crate::error::FetchError;

/// Thin wrapper that issues one request and hands back the body as text.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Issue `method` against `url` and return the raw response body.
    ///
    /// Non-success statuses are errors; the body is kept (truncated) for the
    /// log line.
    pub async fn fetch_text(&self, method: Method, url: Url) -> Result<String, FetchError> {
        debug!(%method, url = %redact(&url), "sending request");

        let res = self
            .http
            .request(method, url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: redact(&url),
                source,
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| FetchError::Request {
                url: redact(&url),
                source,
            })?;

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: redact(&url),
                status,
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

/// URL as a string with the `appid` credential masked.
pub(crate) fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "appid") {
        return url.to_string();
    }

    let mut masked = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "appid" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}

use std::time::Instant;

use reqwest::{Client, StatusCode};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{CoreResult, ShipRatesError};

/// Thin wrapper around reqwest::Client with defaults and typed error mapping.
/// `provider` names the upstream for error attribution and logging.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new_default() -> CoreResult<Self> {
        let inner = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| ShipRatesError::Other(anyhow::anyhow!("http client build failed: {e}")))?;
        Ok(Self {
            inner,
            user_agent: "shiprates/0.1".to_string(),
        })
    }

    pub async fn post_json<T: Serialize, R: DeserializeOwned>(
        &self,
        provider: &str,
        url: &str,
        body: &T,
        headers: &[(&str, &str)],
    ) -> CoreResult<R> {
        let start = Instant::now();
        let mut req = self
            .inner
            .post(url)
            .json(body)
            .header("User-Agent", &self.user_agent);
        for (k, v) in headers {
            req = req.header(*k, *v);
        }

        let resp = req
            .send()
            .await
            .map_err(|_e| ShipRatesError::ProviderUnavailable {
                provider: provider.to_string(),
            })?;
        self.decode(provider, url, start, resp).await
    }

    /// POST an application/x-www-form-urlencoded body (OAuth token endpoints).
    pub async fn post_form<R: DeserializeOwned>(
        &self,
        provider: &str,
        url: &str,
        form: &[(&str, &str)],
    ) -> CoreResult<R> {
        let start = Instant::now();
        let resp = self
            .inner
            .post(url)
            .form(form)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|_e| ShipRatesError::ProviderUnavailable {
                provider: provider.to_string(),
            })?;
        self.decode(provider, url, start, resp).await
    }

    pub async fn get_json<R: DeserializeOwned>(
        &self,
        provider: &str,
        url: &str,
        headers: &[(&str, &str)],
    ) -> CoreResult<R> {
        let start = Instant::now();
        let mut req = self.inner.get(url).header("User-Agent", &self.user_agent);
        for (k, v) in headers {
            req = req.header(*k, *v);
        }

        let resp = req
            .send()
            .await
            .map_err(|_e| ShipRatesError::ProviderUnavailable {
                provider: provider.to_string(),
            })?;
        self.decode(provider, url, start, resp).await
    }

    async fn decode<R: DeserializeOwned>(
        &self,
        provider: &str,
        url: &str,
        start: Instant,
        resp: reqwest::Response,
    ) -> CoreResult<R> {
        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u32;
        tracing::debug!(provider, url, %status, latency_ms, "upstream call");

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(map_http_error(provider, status, &text));
        }

        resp.json::<R>()
            .await
            .map_err(|e| ShipRatesError::ProviderError {
                provider: provider.to_string(),
                code: status.as_u16().to_string(),
                message: format!("json decode error: {e}"),
            })
    }
}

fn map_http_error(provider: &str, status: StatusCode, body: &str) -> ShipRatesError {
    if status.is_server_error() {
        ShipRatesError::ProviderUnavailable {
            provider: provider.to_string(),
        }
    } else {
        ShipRatesError::ProviderError {
            provider: provider.to_string(),
            code: status.as_u16().to_string(),
            message: truncate(body, 300),
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        // Back off to a char boundary so multibyte bodies can't panic the slice.
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        let mut t = s[..end].to_string();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::CoreResult;
use crate::http_client::HttpClient;

/// Refresh this long before the token actually expires.
const EXPIRY_SKEW: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

struct CachedToken {
    access_token: SecretString,
    /// None means the endpoint sent no `expires_in`; treat as non-expiring.
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(at) => now + EXPIRY_SKEW < at,
            None => true,
        }
    }
}

/// OAuth2 client-credentials token provider for the postal API.
///
/// Holds one cached access token and refreshes it when it is missing or
/// within the skew window of expiry. The mutex doubles as a singleflight
/// guard: concurrent callers wait for the same refresh instead of stampeding
/// the token endpoint.
pub struct TokenProvider {
    http: HttpClient,
    token_url: String,
    client_id: SecretString,
    client_secret: SecretString,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(
        http: HttpClient,
        base: &str,
        client_id: SecretString,
        client_secret: SecretString,
    ) -> Self {
        Self {
            http,
            token_url: format!("{base}/oauth2/v3/token"),
            client_id,
            client_secret,
            cached: Mutex::new(None),
        }
    }

    /// Returns a currently-valid access token, fetching or refreshing first
    /// if needed.
    pub async fn bearer(&self) -> CoreResult<String> {
        let mut slot = self.cached.lock().await;
        let now = Instant::now();
        if let Some(token) = slot.as_ref()
            && token.is_fresh(now)
        {
            return Ok(token.access_token.expose_secret().to_string());
        }

        let resp: TokenResponse = self
            .http
            .post_form(
                "usps",
                &self.token_url,
                &[
                    ("grant_type", "client_credentials"),
                    ("client_id", self.client_id.expose_secret()),
                    ("client_secret", self.client_secret.expose_secret()),
                ],
            )
            .await?;

        let bearer = resp.access_token.clone();
        *slot = Some(CachedToken {
            access_token: resp.access_token.into(),
            expires_at: resp.expires_in.map(|secs| now + Duration::from_secs(secs)),
        });
        Ok(bearer)
    }
}

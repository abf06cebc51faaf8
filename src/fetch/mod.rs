pub mod newsmax;
pub mod wordpress;

use std::time::Duration;

use anyhow::Result;
use reqwest::{Response, StatusCode};
use tracing::warn;

use crate::error::FetchError;
use crate::settings::Settings;

const MAX_BACKOFF_EXP: u32 = 6;

/// `reqwest::Client` with timeout, user agent and retry policy applied.
pub struct HttpClient {
    client: reqwest::Client,
    /// Total attempts per request, at least one.
    attempts: u32,
    backoff: Duration,
}

impl HttpClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut builder = reqwest::Client::builder().timeout(settings.timeout());
        if let Some(ua) = &settings.user_agent {
            builder = builder.user_agent(ua.as_str());
        }
        Ok(HttpClient {
            client: builder.build()?,
            attempts: settings.retries.max(1),
            backoff: settings.backoff(),
        })
    }

    /// GET with retries on transport errors, 429 and 5xx. Any other status is
    /// handed back for the caller to interpret.
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response, FetchError> {
        let mut attempt = 0;
        loop {
            let last = attempt + 1 >= self.attempts;
            match self.client.get(url).query(query).send().await {
                Ok(resp) if last || !is_retryable(resp.status()) => return Ok(resp),
                Ok(resp) => warn!(
                    "HTTP {} from {} (attempt {}/{})",
                    resp.status().as_u16(),
                    url,
                    attempt + 1,
                    self.attempts
                ),
                Err(source) if last => {
                    return Err(FetchError::Http { url: url.to_string(), source });
                }
                Err(e) => warn!("Request to {} failed (attempt {}/{}): {}", url, attempt + 1, self.attempts, e),
            }
            tokio::time::sleep(backoff_delay(self.backoff, attempt)).await;
            attempt += 1;
        }
    }
}

/// `base * 2^attempt`, with the exponent capped.
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.pow(attempt.min(MAX_BACKOFF_EXP))
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Read a response body, mapping transport failures to `FetchError`.
pub(crate) async fn body_text(resp: Response) -> Result<String, FetchError> {
    let url = resp.url().to_string();
    resp.text().await.map_err(|source| FetchError::Http { url, source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy() {
        assert!(is_retryable(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable(StatusCode::NOT_FOUND));
        assert!(!is_retryable(StatusCode::BAD_REQUEST));
        assert!(!is_retryable(StatusCode::OK));
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 0), base);
        assert_eq!(backoff_delay(base, 2), Duration::from_secs(2));
        assert_eq!(backoff_delay(base, 40), backoff_delay(base, MAX_BACKOFF_EXP));
        assert_eq!(backoff_delay(base, u32::MAX), Duration::from_secs(32));
    }

    #[test]
    fn retries_count_total_attempts() {
        let settings = |retries| Settings {
            db_path: "monologues.db".into(),
            output_root: "data".into(),
            timeout_secs: 1,
            retries,
            backoff_ms: 0,
            user_agent: None,
        };
        assert_eq!(HttpClient::new(&settings(3)).unwrap().attempts, 3);
        assert_eq!(HttpClient::new(&settings(1)).unwrap().attempts, 1);
        assert_eq!(HttpClient::new(&settings(0)).unwrap().attempts, 1);
    }
}

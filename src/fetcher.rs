use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use url::Url;

use crate::error::RepoError;
use crate::progress::{Progress, RequestKind};

#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_attempts: usize,
    progress: Option<Arc<Progress>>,
}

impl Fetcher {
    pub fn new(
        user_agent: &str,
        timeout: Duration,
        max_attempts: usize,
        progress: Option<Arc<Progress>>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            client,
            max_attempts: max_attempts.max(1),
            progress,
        })
    }

    /// GET `url`, retrying only on 429/503. A 404 maps to [`RepoError::NotFound`].
    pub async fn get_bytes(&self, kind: RequestKind, url: Url) -> Result<Bytes, RepoError> {
        if let Some(p) = &self.progress {
            p.http_start(kind, &url);
        }
        let res = self.get_bytes_inner(kind, &url).await;
        if let Some(p) = &self.progress {
            match &res {
                Ok(bytes) => p.http_ok(kind, &url, bytes.len()),
                Err(_) => p.http_err(kind, &url),
            }
        }
        res
    }

    async fn get_bytes_inner(&self, kind: RequestKind, url: &Url) -> Result<Bytes, RepoError> {
        let mut backoff = Duration::from_millis(250);

        for attempt in 1..=self.max_attempts {
            let resp = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| network(url, e))?;

            let status = resp.status();
            if status.is_success() {
                return resp.bytes().await.map_err(|e| network(url, e));
            }

            if status == StatusCode::NOT_FOUND {
                return Err(RepoError::NotFound {
                    resource: url.to_string(),
                });
            }

            let throttled =
                status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE;
            if throttled && attempt < self.max_attempts {
                let wait = retry_after_duration(resp.headers()).unwrap_or(backoff);
                tracing::warn!(
                    %status,
                    attempt,
                    wait_ms = wait.as_millis(),
                    "throttled; backing off"
                );
                if let Some(p) = &self.progress {
                    p.http_throttled(kind, url, status.as_u16(), wait);
                }
                tokio::time::sleep(wait).await;
                backoff = (backoff * 2).min(Duration::from_secs(10));
                continue;
            }

            return Err(RepoError::Network {
                url: url.to_string(),
                reason: format!("status {status}"),
            });
        }

        Err(RepoError::Network {
            url: url.to_string(),
            reason: format!("gave up after {} attempts", self.max_attempts),
        })
    }
}

fn network(url: &Url, err: reqwest::Error) -> RepoError {
    RepoError::Network {
        url: url.to_string(),
        reason: err.to_string(),
    }
}

fn retry_after_duration(headers: &HeaderMap) -> Option<Duration> {
    let v = headers.get(RETRY_AFTER)?;
    let s = v.to_str().ok()?.trim();
    let seconds: u64 = s.parse().ok()?;
    Some(Duration::from_secs(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static(" 3 "));
        assert_eq!(retry_after_duration(&headers), Some(Duration::from_secs(3)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after_duration(&headers), None);
    }
}

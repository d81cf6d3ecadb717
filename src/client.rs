use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::domain::{CreatePullRequest, ServiceErrorCode};
use crate::error::{LoadTestError, Result, TransportError};

pub const CREATE_PATH: &str = "/pullRequest/create";
pub const HEALTH_PATH: &str = "/health";

/// The system under test, as seen by a virtual user
#[async_trait]
pub trait PullRequestTarget: Send + Sync {
    /// Send one create request. Never retries; transport failures are
    /// reported inside the outcome rather than as an error.
    async fn create_pull_request(&self, payload: &CreatePullRequest) -> RequestOutcome;

    /// Pre-flight probe run once before the load starts
    async fn health(&self) -> Result<()>;
}

/// An HTTP response as far as the load test cares about it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSummary {
    pub status: StatusCode,
    pub error_code: Option<ServiceErrorCode>,
}

#[derive(Debug, Clone)]
pub struct RequestOutcome {
    pub latency: Duration,
    pub result: std::result::Result<ResponseSummary, TransportError>,
}

impl RequestOutcome {
    pub fn status(&self) -> Option<StatusCode> {
        self.result.as_ref().ok().map(|r| r.status)
    }
}

/// reqwest-backed target pointing at a running PR service
#[derive(Clone)]
pub struct HttpTarget {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTarget {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("pr-service-loadtest/", env!("CARGO_PKG_VERSION"))),
        );
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl PullRequestTarget for HttpTarget {
    async fn create_pull_request(&self, payload: &CreatePullRequest) -> RequestOutcome {
        let start = Instant::now();
        let sent = self
            .client
            .post(self.url(CREATE_PATH))
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await;

        let result = match sent {
            Ok(resp) => {
                let status = resp.status();
                // A body we cannot read still leaves a usable status
                let error_code = match resp.bytes().await {
                    Ok(body) if !status.is_success() => ServiceErrorCode::from_body(&body),
                    Ok(_) => None,
                    Err(e) => {
                        debug!(error = %e, %status, "failed to read response body");
                        None
                    }
                };
                Ok(ResponseSummary { status, error_code })
            }
            Err(e) => Err(TransportError::from(e)),
        };

        RequestOutcome {
            latency: start.elapsed(),
            result,
        }
    }

    async fn health(&self) -> Result<()> {
        let resp = self.client.get(self.url(HEALTH_PATH)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LoadTestError::Unhealthy(format!("HTTP {status}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trims_trailing_slash() {
        let target = HttpTarget::new("http://localhost:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(
            target.url(CREATE_PATH),
            "http://localhost:8080/pullRequest/create"
        );
        assert_eq!(target.url(HEALTH_PATH), "http://localhost:8080/health");
    }

    #[test]
    fn test_outcome_status() {
        let ok = RequestOutcome {
            latency: Duration::from_millis(3),
            result: Ok(ResponseSummary {
                status: StatusCode::CREATED,
                error_code: None,
            }),
        };
        assert_eq!(ok.status(), Some(StatusCode::CREATED));

        let failed = RequestOutcome {
            latency: Duration::from_millis(3),
            result: Err(TransportError::Timeout),
        };
        assert_eq!(failed.status(), None);
    }
}

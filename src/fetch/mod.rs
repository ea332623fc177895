//! Candidate fetch.
//!
//! Candidates come from the server already filtered by time window,
//! audience, and page rules; the engine treats the list as opaque input.
//! One fetch per engine start, no retry: a failure is logged and the page
//! simply runs with zero notifications.

use async_trait::async_trait;

use crate::error::Result;
use crate::notification::RawNotification;

/// Context identifying the page the visitor is on, forwarded to the server
/// so its page rules can run.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub url: String,
    pub page_id: u64,
}

/// Source of candidate notifications.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch(&self, page: &PageContext) -> Result<Vec<RawNotification>>;
}

/// HTTP implementation: `GET {base}/notifications?url=<url>&pid=<id>`.
pub struct HttpCandidateSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpCandidateSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/notifications", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CandidateSource for HttpCandidateSource {
    async fn fetch(&self, page: &PageContext) -> Result<Vec<RawNotification>> {
        let pid = page.page_id.to_string();
        let response = self
            .http
            .get(self.endpoint())
            .query(&[("url", page.url.as_str()), ("pid", pid.as_str())])
            .send()
            .await?
            .error_for_status()?;
        let candidates = response.json::<Vec<RawNotification>>().await?;
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let source = HttpCandidateSource::new("https://example.com/nc/v1/");
        assert_eq!(source.endpoint(), "https://example.com/nc/v1/notifications");

        let source = HttpCandidateSource::new("https://example.com/nc/v1");
        assert_eq!(source.endpoint(), "https://example.com/nc/v1/notifications");
    }
}

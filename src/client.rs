//! HTTP access to the subjects / polls / votes API

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::trace;

use crate::config::ApiTestConfig;
use crate::domain::{PollCreate, Subject, VoteCreate};
use crate::error::LoadTestError;

/// Raw outcome of one request; status interpretation is left to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
    pub elapsed: Duration,
}

impl ApiResponse {
    pub fn is_created(&self) -> bool {
        self.status == reqwest::StatusCode::CREATED.as_u16()
    }
}

#[async_trait]
pub trait PollsApi: Send + Sync {
    async fn create_subject(&self, subject: &Subject) -> Result<ApiResponse, LoadTestError>;

    async fn create_poll(
        &self,
        subject_id: i64,
        poll: &PollCreate,
    ) -> Result<ApiResponse, LoadTestError>;

    async fn cast_vote(
        &self,
        subject_id: i64,
        poll_id: i64,
        vote: &VoteCreate,
    ) -> Result<ApiResponse, LoadTestError>;

    async fn list_votes(&self, subject_id: i64, poll_id: i64)
        -> Result<ApiResponse, LoadTestError>;
}

/// `PollsApi` over a pooled reqwest client
#[derive(Clone)]
pub struct HttpPollsApi {
    base_url: String,
    client: Client,
}

impl HttpPollsApi {
    pub fn new(cfg: &ApiTestConfig) -> Result<Self, LoadTestError> {
        Url::parse(&cfg.base_url).map_err(|e| LoadTestError::InvalidUrl {
            url: cfg.base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("poll-loadtest/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .connect_timeout(cfg.connect_timeout())
            .read_timeout(cfg.read_timeout())
            .default_headers(headers)
            .build()?;

        Ok(Self {
            base_url: cfg.base_url.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join `path` onto the base URL with exactly one slash between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn post_json<T: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<ApiResponse, LoadTestError> {
        let url = self.endpoint(path);
        trace!(%url, "POST");
        let started = Instant::now();
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(ApiResponse {
            status,
            body,
            elapsed: started.elapsed(),
        })
    }

    async fn get(&self, path: &str) -> Result<ApiResponse, LoadTestError> {
        let url = self.endpoint(path);
        trace!(%url, "GET");
        let started = Instant::now();
        let resp = self.client.get(&url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(ApiResponse {
            status,
            body,
            elapsed: started.elapsed(),
        })
    }
}

#[async_trait]
impl PollsApi for HttpPollsApi {
    async fn create_subject(&self, subject: &Subject) -> Result<ApiResponse, LoadTestError> {
        self.post_json("subjects", subject).await
    }

    async fn create_poll(
        &self,
        subject_id: i64,
        poll: &PollCreate,
    ) -> Result<ApiResponse, LoadTestError> {
        self.post_json(&format!("subjects/{subject_id}/polls"), poll)
            .await
    }

    async fn cast_vote(
        &self,
        subject_id: i64,
        poll_id: i64,
        vote: &VoteCreate,
    ) -> Result<ApiResponse, LoadTestError> {
        self.post_json(
            &format!("subjects/{subject_id}/polls/{poll_id}/votes"),
            vote,
        )
        .await
    }

    async fn list_votes(
        &self,
        subject_id: i64,
        poll_id: i64,
    ) -> Result<ApiResponse, LoadTestError> {
        self.get(&format!("subjects/{subject_id}/polls/{poll_id}/votes"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn api(base_url: &str) -> HttpPollsApi {
        HttpPollsApi::new(&ApiTestConfig::resolve_from(Some(base_url.to_string()))).unwrap()
    }

    #[rstest]
    #[case("http://localhost:8080/", "subjects", "http://localhost:8080/subjects")]
    #[case("http://localhost:8080", "subjects", "http://localhost:8080/subjects")]
    #[case("http://example:9999/", "/subjects/3/polls", "http://example:9999/subjects/3/polls")]
    #[case("http://host/api/", "subjects/1/polls/2/votes", "http://host/api/subjects/1/polls/2/votes")]
    fn test_endpoint_join(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        assert_eq!(api(base).endpoint(path), expected);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let cfg = ApiTestConfig::resolve_from(Some("localhost without scheme".to_string()));
        let err = HttpPollsApi::new(&cfg).err().expect("invalid url");
        assert!(matches!(err, LoadTestError::InvalidUrl { .. }));
    }

    #[test]
    fn test_created_status() {
        let resp = ApiResponse {
            status: 201,
            body: String::new(),
            elapsed: Duration::ZERO,
        };
        assert!(resp.is_created());
        assert!(!ApiResponse { status: 200, ..resp }.is_created());
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use poll_loadtest::client::ApiResponse;
use poll_loadtest::domain::{PollCreate, Subject, VoteCreate};
use poll_loadtest::{ApiTestConfig, HttpPollsApi, LoadTestError, PollsApi};

pub const SUBJECT_ID: i64 = 4242;
pub const POLL_ID: i64 = 77;

pub fn subject() -> Subject {
    Subject::new(SUBJECT_ID, "subject 12")
}

pub fn poll() -> PollCreate {
    PollCreate::new("poll 34")
}

pub fn http_api(server: &MockServer) -> HttpPollsApi {
    let cfg = ApiTestConfig::resolve_from(Some(format!("{}/", server.uri())));
    HttpPollsApi::new(&cfg).expect("client for mock server")
}

pub fn votes_path() -> String {
    format!("/subjects/{SUBJECT_ID}/polls/{POLL_ID}/votes")
}

/// Mount subject and poll creation mocks that both answer 201.
pub async fn mount_setup(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/subjects"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "id": SUBJECT_ID, "name": "subject 12" })),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/subjects/{SUBJECT_ID}/polls")))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "id": POLL_ID, "name": "poll 34" })),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub async fn vote_requests(server: &MockServer) -> Vec<VoteCreate> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .into_iter()
        .filter(|r| r.url.path() == votes_path())
        .map(|r| r.body_json::<VoteCreate>().expect("vote body"))
        .collect()
}

/// In-process service double that answers votes with a fixed status
pub struct StubPollsApi {
    pub vote_status: u16,
    pub latency: Duration,
    pub voters: Mutex<Vec<Uuid>>,
    pub vote_calls: AtomicU64,
}

impl StubPollsApi {
    pub fn new(vote_status: u16, latency: Duration) -> Self {
        Self {
            vote_status,
            latency,
            voters: Mutex::new(Vec::new()),
            vote_calls: AtomicU64::new(0),
        }
    }

    pub fn vote_calls(&self) -> u64 {
        self.vote_calls.load(Ordering::SeqCst)
    }

    fn respond(status: u16, body: String) -> ApiResponse {
        ApiResponse {
            status,
            body,
            elapsed: Duration::from_micros(100),
        }
    }
}

#[async_trait]
impl PollsApi for StubPollsApi {
    async fn create_subject(&self, subject: &Subject) -> Result<ApiResponse, LoadTestError> {
        Ok(Self::respond(201, serde_json::to_string(subject).unwrap()))
    }

    async fn create_poll(
        &self,
        _subject_id: i64,
        poll: &PollCreate,
    ) -> Result<ApiResponse, LoadTestError> {
        Ok(Self::respond(
            201,
            json!({ "id": POLL_ID, "name": poll.name }).to_string(),
        ))
    }

    async fn cast_vote(
        &self,
        _subject_id: i64,
        _poll_id: i64,
        vote: &VoteCreate,
    ) -> Result<ApiResponse, LoadTestError> {
        self.vote_calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.voters.lock().push(vote.voter);
        Ok(Self::respond(self.vote_status, String::new()))
    }

    async fn list_votes(
        &self,
        _subject_id: i64,
        _poll_id: i64,
    ) -> Result<ApiResponse, LoadTestError> {
        let votes: Vec<_> = self
            .voters
            .lock()
            .iter()
            .map(|voter| json!({ "voter": voter, "agree": true }))
            .collect();
        Ok(Self::respond(200, serde_json::Value::Array(votes).to_string()))
    }
}

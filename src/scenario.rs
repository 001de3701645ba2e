//! The vote scenario: one-time setup, the per-iteration vote, and an
//! optional read-back of the recorded votes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::checks::CheckSet;
use crate::client::{ApiResponse, PollsApi};
use crate::domain::{PollCreate, PollResponse, Subject, VoteCreate, VoteResponse};
use crate::error::LoadTestError;
use crate::metrics::{Metrics, RequestTag};

pub const VOTE_CHECK: &str = "vote status is 201";

/// Identifiers produced by setup and shared read-only with every virtual user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupData {
    pub subject_id: i64,
    pub poll_id: i64,
}

/// Create the subject, then a poll under it. Anything but 201 aborts.
pub async fn setup(
    api: &dyn PollsApi,
    subject: &Subject,
    poll: &PollCreate,
    metrics: &Metrics,
) -> Result<SetupData, LoadTestError> {
    let resp = api.create_subject(subject).await?;
    expect_created(RequestTag::Subject, resp, metrics)?;
    debug!(subject_id = subject.id, name = %subject.name, "subject created");

    let resp = api.create_poll(subject.id, poll).await?;
    let resp = expect_created(RequestTag::Poll, resp, metrics)?;
    let created: PollResponse =
        serde_json::from_str(&resp.body).map_err(|source| LoadTestError::Decode {
            stage: RequestTag::Poll,
            source,
        })?;

    let data = SetupData {
        subject_id: subject.id,
        poll_id: created.id,
    };
    info!(subject_id = data.subject_id, poll_id = data.poll_id, "setup complete");
    Ok(data)
}

fn expect_created(
    stage: RequestTag,
    resp: ApiResponse,
    metrics: &Metrics,
) -> Result<ApiResponse, LoadTestError> {
    let ok = resp.is_created();
    metrics.record(stage, resp.elapsed, ok);
    if ok {
        Ok(resp)
    } else {
        Err(LoadTestError::Setup {
            stage,
            status: resp.status,
            body: resp.body,
        })
    }
}

/// What one vote iteration observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteOutcome {
    pub voter: Uuid,
    /// `None` when the request never got a response
    pub status: Option<u16>,
    pub passed: bool,
}

/// Cast one vote from a fresh voter and record the check. Never fails.
pub async fn cast_vote(
    api: &dyn PollsApi,
    data: &SetupData,
    agree: bool,
    checks: &CheckSet,
    metrics: &Metrics,
) -> VoteOutcome {
    let vote = VoteCreate::new(agree);
    let started = std::time::Instant::now();

    let status = match api.cast_vote(data.subject_id, data.poll_id, &vote).await {
        Ok(resp) => {
            metrics.record(RequestTag::Vote, resp.elapsed, resp.is_created());
            if !resp.is_created() {
                debug!(voter = %vote.voter, status = resp.status, body = %resp.body, "vote rejected");
            }
            Some(resp.status)
        }
        Err(e) => {
            metrics.record(RequestTag::Vote, started.elapsed(), false);
            debug!(voter = %vote.voter, error = %e, "vote request failed");
            None
        }
    };

    let passed = checks.check(VOTE_CHECK, status == Some(201));
    VoteOutcome {
        voter: vote.voter,
        status,
        passed,
    }
}

/// Result of reading the poll's votes back after a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub expected: u64,
    pub recorded: u64,
    pub agree: u64,
    pub disagree: u64,
}

impl Verification {
    pub fn matches(&self) -> bool {
        self.expected == self.recorded
    }
}

/// List the votes recorded for the poll and compare with `expected`.
pub async fn verify(
    api: &dyn PollsApi,
    data: &SetupData,
    expected: u64,
    metrics: &Metrics,
) -> Result<Verification, LoadTestError> {
    let resp = api.list_votes(data.subject_id, data.poll_id).await?;
    let ok = resp.status == reqwest::StatusCode::OK.as_u16();
    metrics.record(RequestTag::Verify, resp.elapsed, ok);
    if !ok {
        return Err(LoadTestError::Verify {
            status: resp.status,
            body: resp.body,
        });
    }

    let votes: Vec<VoteResponse> =
        serde_json::from_str(&resp.body).map_err(|source| LoadTestError::Decode {
            stage: RequestTag::Verify,
            source,
        })?;
    let agree = votes.iter().filter(|v| v.agree).count() as u64;
    let verification = Verification {
        expected,
        recorded: votes.len() as u64,
        agree,
        disagree: votes.len() as u64 - agree,
    };

    if verification.matches() {
        info!(recorded = verification.recorded, "recorded votes match passed checks");
    } else {
        warn!(
            expected = verification.expected,
            recorded = verification.recorded,
            "recorded votes differ from passed checks"
        );
    }
    Ok(verification)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /subjects/{subjectId}/polls/{pollId}/votes`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCreate {
    pub agree: bool,
    pub voter: Uuid,
}

impl VoteCreate {
    /// A vote from a fresh random voter
    pub fn new(agree: bool) -> Self {
        Self {
            agree,
            voter: Uuid::new_v4(),
        }
    }
}

/// A recorded vote as listed by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub voter: Uuid,
    pub agree: bool,
    #[serde(default)]
    pub vote_date: Option<DateTime<Utc>>,
}

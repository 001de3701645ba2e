use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::subject::NAME_SUFFIX_MAX;

/// Body of `POST /subjects/{subjectId}/polls`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollCreate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl PollCreate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            end_date: None,
        }
    }

    /// Close the poll `duration` from now (UTC).
    pub fn closing_in(mut self, duration: Duration) -> Self {
        self.end_date = Some(Utc::now() + duration);
        self
    }

    /// Name `poll <1..=1000>`, optionally closing after `duration`
    pub fn random(duration: Option<Duration>) -> Self {
        let suffix = rand::thread_rng().gen_range(1..=NAME_SUFFIX_MAX);
        let poll = Self::new(format!("poll {suffix}"));
        match duration {
            Some(d) => poll.closing_in(d),
            None => poll,
        }
    }
}

/// Poll as returned by the service; `id` is server-assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

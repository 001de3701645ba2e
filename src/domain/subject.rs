use rand::Rng;
use serde::{Deserialize, Serialize};

/// Upper bound of the random subject id space
pub const SUBJECT_ID_MAX: i64 = 100_000;
/// Upper bound of the numeric suffix in generated names
pub const NAME_SUFFIX_MAX: u32 = 1_000;

/// Top-level entity under which polls are created.
///
/// The client chooses the id; collisions with existing subjects are
/// possible and surface as a rejected setup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

impl Subject {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Random id in `1..=100000`, name `subject <1..=1000>`
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            id: rng.gen_range(1..=SUBJECT_ID_MAX),
            name: format!("subject {}", rng.gen_range(1..=NAME_SUFFIX_MAX)),
        }
    }
}

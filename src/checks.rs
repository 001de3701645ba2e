use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Outcome counters for one named check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passes: u64,
    pub fails: u64,
}

impl CheckResult {
    pub fn total(&self) -> u64 {
        self.passes + self.fails
    }
}

/// Non-fatal assertions recorded for the end-of-run report.
///
/// A failing check never interrupts the caller; it only bumps a counter.
#[derive(Debug, Default)]
pub struct CheckSet {
    tallies: Mutex<BTreeMap<String, (u64, u64)>>,
}

impl CheckSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `passed` under `name` and hand it back.
    pub fn check(&self, name: &str, passed: bool) -> bool {
        let mut tallies = self.tallies.lock();
        let (passes, fails) = tallies.entry(name.to_string()).or_insert((0, 0));
        if passed {
            *passes += 1;
        } else {
            *fails += 1;
            debug!(check = name, "check failed");
        }
        passed
    }

    pub fn results(&self) -> Vec<CheckResult> {
        self.tallies
            .lock()
            .iter()
            .map(|(name, (passes, fails))| CheckResult {
                name: name.clone(),
                passes: *passes,
                fails: *fails,
            })
            .collect()
    }

    pub fn passes(&self) -> u64 {
        self.tallies.lock().values().map(|(p, _)| p).sum()
    }

    pub fn fails(&self) -> u64 {
        self.tallies.lock().values().map(|(_, f)| f).sum()
    }

    /// Pass ratio across every check; 1.0 when nothing was checked.
    pub fn rate(&self) -> f64 {
        let (passes, fails) = self
            .tallies
            .lock()
            .values()
            .fold((0u64, 0u64), |(p, f), (tp, tf)| (p + tp, f + tf));
        let total = passes + fails;
        if total == 0 {
            1.0
        } else {
            passes as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_empty_rate_is_one() {
        assert_eq!(CheckSet::new().rate(), 1.0);
    }

    #[test]
    fn test_failures_do_not_stop_recording() {
        let checks = CheckSet::new();
        assert!(checks.check("vote status is 201", true));
        assert!(!checks.check("vote status is 201", false));
        assert!(checks.check("vote status is 201", true));
        assert!(checks.check("vote status is 201", true));

        assert_eq!(checks.passes(), 3);
        assert_eq!(checks.fails(), 1);
        assert_eq!(checks.rate(), 0.75);

        let results = checks.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "vote status is 201");
        assert_eq!(results[0].total(), 4);
    }

    #[test]
    fn test_concurrent_recording() {
        let checks = Arc::new(CheckSet::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let checks = Arc::clone(&checks);
                std::thread::spawn(move || {
                    for j in 0..100 {
                        checks.check("shared", (i + j) % 4 != 0);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(checks.passes() + checks.fails(), 800);
        assert_eq!(checks.fails(), 200);
    }
}

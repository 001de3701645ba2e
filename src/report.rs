use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::checks::CheckResult;
use crate::metrics::TagSummary;
use crate::scenario::{SetupData, Verification};

/// Process exit code when a threshold is crossed
pub const THRESHOLD_EXIT_CODE: i32 = 99;

/// Everything worth reporting about one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub setup: SetupData,
    pub vus: u32,
    pub iterations_planned: u64,
    pub iterations_completed: u64,
    pub cancelled: bool,
    pub elapsed_ms: u64,
    pub check_rate: f64,
    pub checks: Vec<CheckResult>,
    pub requests: Vec<TagSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
}

impl RunSummary {
    /// True when a minimum check rate is configured and the run fell below it
    pub fn threshold_crossed(&self, checks_min_rate: Option<f64>) -> bool {
        checks_min_rate.is_some_and(|min| self.check_rate < min)
    }

    pub fn iterations_per_sec(&self) -> f64 {
        if self.elapsed_ms == 0 {
            0.0
        } else {
            self.iterations_completed as f64 * 1000.0 / self.elapsed_ms as f64
        }
    }

    /// Human-readable table on stdout, plus one structured log line
    pub fn print(&self) {
        println!();
        println!("════════════════════════════════════════════════");
        println!(
            "  subject={}  poll={}  vus={}",
            self.setup.subject_id, self.setup.poll_id, self.vus
        );
        println!(
            "  iterations: {}/{}{}  in {:.2}s  ({:.1}/s)",
            self.iterations_completed,
            self.iterations_planned,
            if self.cancelled { " (cancelled)" } else { "" },
            self.elapsed_ms as f64 / 1000.0,
            self.iterations_per_sec()
        );
        println!();
        for check in &self.checks {
            let mark = if check.fails == 0 { "✓" } else { "✗" };
            println!(
                "  {} {:<28} ✓ {}  ✗ {}  of {}",
                mark,
                check.name,
                check.passes,
                check.fails,
                check.total()
            );
        }
        println!("  checks: {:.2}%", self.check_rate * 100.0);
        println!();
        for req in &self.requests {
            println!(
                "  {:<8} n={:<5} failed={:<4} ({:.1}%)  min={:.1}ms  avg={:.1}ms  p50={:.1}ms  p90={:.1}ms  p95={:.1}ms  max={:.1}ms",
                req.tag.as_ref(),
                req.count,
                req.failed,
                req.failure_rate() * 100.0,
                req.min_ms,
                req.mean_ms,
                req.p50_ms,
                req.p90_ms,
                req.p95_ms,
                req.max_ms
            );
        }
        if let Some(v) = &self.verification {
            println!();
            println!(
                "  recorded votes: {} (agree={} disagree={})  expected {}",
                v.recorded, v.agree, v.disagree, v.expected
            );
        }
        println!("════════════════════════════════════════════════");

        info!(
            subject_id = self.setup.subject_id,
            poll_id = self.setup.poll_id,
            completed = self.iterations_completed,
            check_rate = self.check_rate,
            "run summary"
        );
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing run summary")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

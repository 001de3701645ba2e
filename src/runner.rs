use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::checks::CheckSet;
use crate::client::PollsApi;
use crate::config::LoadConfig;
use crate::domain::{PollCreate, Subject};
use crate::error::LoadTestError;
use crate::metrics::Metrics;
use crate::report::RunSummary;
use crate::scenario::{self, SetupData};

/// Execution parameters for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub vus: u32,
    pub iterations: u64,
    pub think_time: Duration,
    pub agree: bool,
    pub poll_duration: Option<chrono::Duration>,
    pub verify: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::from(&LoadConfig::default())
    }
}

impl From<&LoadConfig> for RunOptions {
    fn from(cfg: &LoadConfig) -> Self {
        Self {
            vus: cfg.vus,
            iterations: cfg.iterations,
            think_time: cfg.think_time(),
            agree: cfg.agree,
            poll_duration: cfg.poll_duration(),
            verify: false,
        }
    }
}

/// Outcome of the execution phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    pub completed: u64,
    pub elapsed: Duration,
    pub cancelled: bool,
}

/// Setup once, then `iterations` votes spread over `vus` virtual users
pub struct LoadTest {
    api: Arc<dyn PollsApi>,
    options: RunOptions,
    checks: Arc<CheckSet>,
    metrics: Arc<Metrics>,
}

impl LoadTest {
    pub fn new(api: Arc<dyn PollsApi>, options: RunOptions) -> Self {
        Self {
            api,
            options,
            checks: Arc::new(CheckSet::new()),
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn checks(&self) -> &CheckSet {
        &self.checks
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Run with a randomly generated subject and poll.
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunSummary, LoadTestError> {
        let subject = Subject::random();
        let poll = PollCreate::random(self.options.poll_duration);
        self.run_with(&subject, &poll, cancel).await
    }

    /// Setup failures abort before any vote is cast, as does cancelling
    /// while setup is still in flight.
    pub async fn run_with(
        &self,
        subject: &Subject,
        poll: &PollCreate,
        cancel: CancellationToken,
    ) -> Result<RunSummary, LoadTestError> {
        let started_at = Utc::now();
        let data = tokio::select! {
            _ = cancel.cancelled() => return Err(LoadTestError::Cancelled),
            result = scenario::setup(self.api.as_ref(), subject, poll, &self.metrics) => result?,
        };

        let execution = self.execute(data, cancel).await;

        let verification = if self.options.verify {
            match scenario::verify(self.api.as_ref(), &data, self.checks.passes(), &self.metrics)
                .await
            {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!(error = %e, "vote verification failed");
                    None
                }
            }
        } else {
            None
        };

        Ok(RunSummary {
            started_at,
            setup: data,
            vus: self.options.vus,
            iterations_planned: self.options.iterations,
            iterations_completed: execution.completed,
            cancelled: execution.cancelled,
            elapsed_ms: execution.elapsed.as_millis() as u64,
            check_rate: self.checks.rate(),
            checks: self.checks.results(),
            requests: self.metrics.summary(),
            verification,
        })
    }

    /// Virtual users claim iterations from a shared counter until the pool
    /// is exhausted or `cancel` fires. In-flight requests always complete.
    pub async fn execute(&self, data: SetupData, cancel: CancellationToken) -> Execution {
        let started = Instant::now();
        let data = Arc::new(data);
        let next = Arc::new(AtomicU64::new(0));
        let total = self.options.iterations;

        info!(
            vus = self.options.vus,
            iterations = total,
            "starting execution phase"
        );

        let mut tasks = JoinSet::new();
        for vu in 1..=self.options.vus {
            let api = Arc::clone(&self.api);
            let data = Arc::clone(&data);
            let next = Arc::clone(&next);
            let checks = Arc::clone(&self.checks);
            let metrics = Arc::clone(&self.metrics);
            let cancel = cancel.clone();
            let think_time = self.options.think_time;
            let agree = self.options.agree;

            tasks.spawn(async move {
                let mut done = 0u64;
                loop {
                    if cancel.is_cancelled() {
                        break;
                    }
                    if next.fetch_add(1, Ordering::Relaxed) >= total {
                        break;
                    }
                    scenario::cast_vote(api.as_ref(), &data, agree, &checks, &metrics).await;
                    done += 1;

                    if !think_time.is_zero() {
                        tokio::select! {
                            _ = cancel.cancelled() => break,
                            _ = tokio::time::sleep(think_time) => {}
                        }
                    }
                }
                debug!(vu, iterations = done, "virtual user finished");
                done
            });
        }

        let mut completed = 0u64;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(done) => completed += done,
                Err(e) => warn!(error = %e, "virtual user task failed"),
            }
        }

        let execution = Execution {
            completed,
            elapsed: started.elapsed(),
            cancelled: cancel.is_cancelled() && completed < total,
        };
        info!(
            completed = execution.completed,
            elapsed_ms = execution.elapsed.as_millis() as u64,
            cancelled = execution.cancelled,
            "execution phase finished"
        );
        execution
    }
}

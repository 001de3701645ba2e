//! Load-test driver and API test configuration for the cooperative
//! subjects / polls / votes service.

pub mod checks;
pub mod cli;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod telemetry;

pub use client::{HttpPollsApi, PollsApi};
pub use config::{ApiTestConfig, Config};
pub use error::{ConfigError, LoadTestError};
pub use runner::{LoadTest, RunOptions};

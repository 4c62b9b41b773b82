//! Local and remote evaluation behind one interface.
//!
//! The remote service runs the same engine, so a caller can fall back from
//! remote to local evaluation without changing results.

use crate::config::Settings;
use crate::domain::input::RoiInput;
use crate::domain::output::RoiOutput;
use crate::engine;
use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ATTEMPTS: u32 = 2;
const CALCULATE_PATH: &str = "/calculate";

#[async_trait::async_trait]
pub trait Evaluator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(&self, input: &RoiInput) -> Result<RoiOutput>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalEvaluator;

#[async_trait::async_trait]
impl Evaluator for LocalEvaluator {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn evaluate(&self, input: &RoiInput) -> Result<RoiOutput> {
        Ok(engine::evaluate(input))
    }
}

#[derive(Debug, Clone)]
pub struct RemoteEvaluator {
    http: reqwest::Client,
    base_url: String,
    attempts: u32,
}

/// Timeout and attempt budget for remote calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteTuning {
    pub timeout: Duration,
    pub attempts: u32,
}

impl Default for RemoteTuning {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

impl RemoteTuning {
    /// `ROI_REMOTE_TIMEOUT_SECS` and `ROI_REMOTE_RETRIES`, defaulting when unset or invalid.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let timeout = lookup("ROI_REMOTE_TIMEOUT_SECS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let attempts = lookup("ROI_REMOTE_RETRIES")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(defaults.attempts);

        Self { timeout, attempts }
    }
}

impl RemoteEvaluator {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::from_env(settings.require_remote_url()?)
    }

    /// Remote evaluator for `base_url`, tuned from the environment.
    pub fn from_env(base_url: impl Into<String>) -> Result<Self> {
        Self::with_tuning(base_url, RemoteTuning::from_env())
    }

    pub fn with_tuning(base_url: impl Into<String>, tuning: RemoteTuning) -> Result<Self> {
        Self::new(base_url, tuning.timeout, tuning.attempts)
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration, attempts: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build remote evaluator http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            attempts: attempts.max(1),
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CALCULATE_PATH)
    }

    async fn evaluate_once(&self, input: &RoiInput) -> Result<RoiOutput> {
        let res = self
            .http
            .post(self.url())
            .json(input)
            .send()
            .await
            .context("remote calculate request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read remote calculate response")?;

        if !status.is_success() {
            anyhow::bail!("remote calculate HTTP {status}: {text}");
        }

        serde_json::from_str::<RoiOutput>(&text)
            .with_context(|| format!("remote calculate response is not an ROI result: {text}"))
    }
}

#[async_trait::async_trait]
impl Evaluator for RemoteEvaluator {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn evaluate(&self, input: &RoiInput) -> Result<RoiOutput> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.evaluate_once(input).await {
                Ok(out) => return Ok(out),
                Err(err) => {
                    if attempt >= self.attempts {
                        return Err(err);
                    }
                    let backoff = Duration::from_millis(250 << (attempt - 1).min(4));
                    tracing::warn!(attempt, ?backoff, error = %err, "remote calculate failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

/// Tries `primary`, then `fallback` when the primary fails.
#[derive(Debug, Clone)]
pub struct FallbackEvaluator<P, F = LocalEvaluator> {
    primary: P,
    fallback: F,
}

impl<P: Evaluator> FallbackEvaluator<P, LocalEvaluator> {
    pub fn local(primary: P) -> Self {
        Self::new(primary, LocalEvaluator)
    }
}

impl<P: Evaluator, F: Evaluator> FallbackEvaluator<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait::async_trait]
impl<P: Evaluator, F: Evaluator> Evaluator for FallbackEvaluator<P, F> {
    fn name(&self) -> &'static str {
        self.primary.name()
    }

    async fn evaluate(&self, input: &RoiInput) -> Result<RoiOutput> {
        match self.primary.evaluate(input).await {
            Ok(out) => Ok(out),
            Err(err) => {
                tracing::warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %err,
                    "evaluation failed; using fallback"
                );
                self.fallback.evaluate(input).await
            }
        }
    }
}

/// Remote-with-local-fallback when a remote URL is configured, local otherwise.
pub fn from_settings(settings: &Settings) -> Result<Box<dyn Evaluator>> {
    if settings.remote_url.is_none() {
        return Ok(Box::new(LocalEvaluator));
    }
    let remote = RemoteEvaluator::from_settings(settings)?;
    Ok(Box::new(FallbackEvaluator::local(remote)))
}

//! Script execution bridge
//!
//! Wraps a [`ScriptRunner`] with lazy loading, a per-attempt timeout, bounded
//! retry with linear backoff, a script cache, and execution statistics.
//! Failures surface as [`BridgeError`] only after every attempt is spent.

use crate::cache::ScriptCache;
use crate::config::BridgeConfig;
use crate::error::{AttemptFailure, BridgeError, Result};
use crate::runner::{ScriptRunner, ScriptSource};
use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::time::Duration;
use tokio::time::{timeout, Instant};

/// Runtime lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BridgeState {
    #[default]
    Idle,
    Loading,
    Ready,
    Executing,
    Error,
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BridgeState::Idle => "idle",
            BridgeState::Loading => "loading",
            BridgeState::Ready => "ready",
            BridgeState::Executing => "executing",
            BridgeState::Error => "error",
        })
    }
}

/// Aggregate counters over every execution
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
    /// Running mean over all executions, in milliseconds
    pub average_ms: f64,
    pub last_error: Option<String>,
}

impl ExecutionStats {
    fn record(&mut self, elapsed: Duration, error: Option<&BridgeError>) {
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.average_ms = (self.average_ms * self.total as f64 + ms) / (self.total + 1) as f64;
        self.total += 1;
        match error {
            None => self.successful += 1,
            Some(e) => {
                self.failed += 1;
                self.last_error = Some(e.to_string());
            }
        }
    }
}

/// One entry in the execution history
#[derive(Clone, Debug, PartialEq)]
pub struct Execution {
    pub code: String,
    pub outcome: std::result::Result<String, String>,
    pub duration: Duration,
    pub attempts: u32,
}

/// Interpreter front door
pub struct Bridge<R> {
    runner: R,
    config: BridgeConfig,
    state: BridgeState,
    error: Option<String>,
    stats: ExecutionStats,
    history: VecDeque<Execution>,
    cache: ScriptCache,
    loaded_scripts: BTreeSet<String>,
    loaded_packages: BTreeSet<String>,
}

impl<R: ScriptRunner> Bridge<R> {
    pub fn new(runner: R, config: BridgeConfig) -> Self {
        Self {
            cache: ScriptCache::new(config.cache_ttl()),
            runner,
            config,
            state: BridgeState::Idle,
            error: None,
            stats: ExecutionStats::default(),
            history: VecDeque::new(),
            loaded_scripts: BTreeSet::new(),
            loaded_packages: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == BridgeState::Ready
    }

    /// Human-readable status line
    pub fn status_message(&self) -> String {
        match self.state {
            BridgeState::Idle => "Initializing...".to_string(),
            BridgeState::Loading => "Loading runtime...".to_string(),
            BridgeState::Ready => "Runtime ready".to_string(),
            BridgeState::Executing => "Executing script...".to_string(),
            BridgeState::Error => format!("Error: {}", self.error.as_deref().unwrap_or("unknown")),
        }
    }

    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// Most recent executions, oldest first
    pub fn history(&self) -> impl Iterator<Item = &Execution> {
        self.history.iter()
    }

    pub fn last_execution(&self) -> Option<&Execution> {
        self.history.back()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn loaded_scripts(&self) -> impl Iterator<Item = &str> {
        self.loaded_scripts.iter().map(String::as_str)
    }

    pub fn loaded_packages(&self) -> impl Iterator<Item = &str> {
        self.loaded_packages.iter().map(String::as_str)
    }

    /// Load the runtime if it is not up yet
    pub async fn load(&mut self) -> Result<()> {
        if matches!(self.state, BridgeState::Ready | BridgeState::Executing) {
            return Ok(());
        }
        self.state = BridgeState::Loading;
        self.error = None;
        tracing::info!("loading script runtime");

        match self.runner.load().await {
            Ok(()) => {
                self.state = BridgeState::Ready;
                tracing::info!("script runtime ready");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "script runtime failed to load");
                self.state = BridgeState::Error;
                self.error = Some(e.message.clone());
                Err(BridgeError::Load(e))
            }
        }
    }

    /// Run `code`, retrying timeouts and script errors with backoff
    pub async fn execute(&mut self, code: &str) -> Result<String> {
        let started = Instant::now();
        self.load().await?;
        self.state = BridgeState::Executing;

        let (outcome, attempts) = self.run_with_retry(code).await;

        self.state = BridgeState::Ready;
        let duration = started.elapsed();
        self.stats.record(duration, outcome.as_ref().err());
        self.push_history(Execution {
            code: code.to_string(),
            outcome: outcome.as_ref().cloned().map_err(ToString::to_string),
            duration,
            attempts,
        });

        match &outcome {
            Ok(_) => tracing::debug!(attempts, ?duration, "script executed"),
            Err(e) => tracing::warn!(error = %e, "script execution failed"),
        }
        outcome
    }

    /// Run a script by path, fetching it through `source` unless cached
    pub async fn run_script<S: ScriptSource>(&mut self, path: &str, source: &S) -> Result<String> {
        let now = Instant::now();
        let code = match self.cache.get(path, now) {
            Some(code) => {
                tracing::trace!(path, "script cache hit");
                code.to_string()
            }
            None => {
                let code = source.fetch(path).await.map_err(|e| BridgeError::Fetch {
                    path: path.to_string(),
                    source: e,
                })?;
                self.cache.insert(path, code.clone(), Instant::now());
                self.loaded_scripts.insert(path.to_string());
                code
            }
        };
        self.execute(&code).await
    }

    /// Install interpreter packages
    pub async fn install(&mut self, packages: &[String]) -> Result<()> {
        self.load().await?;
        self.runner
            .install(packages)
            .await
            .map_err(BridgeError::Install)?;
        self.loaded_packages.extend(packages.iter().cloned());
        tracing::debug!(count = packages.len(), "packages installed");
        Ok(())
    }

    /// Back to a fresh, unloaded bridge
    pub fn reset(&mut self) {
        self.cache.clear();
        self.state = BridgeState::Idle;
        self.error = None;
        self.stats = ExecutionStats::default();
        self.history.clear();
        self.loaded_scripts.clear();
        self.loaded_packages.clear();
    }

    /// Drop expired cache entries
    pub fn evict_expired(&mut self) -> usize {
        self.cache.evict_expired(Instant::now())
    }

    async fn run_with_retry(&self, code: &str) -> (Result<String>, u32) {
        let attempts = self.config.attempts.max(1);
        let limit = self.config.execution_timeout();
        let mut last = AttemptFailure::TimedOut(limit);

        for attempt in 1..=attempts {
            last = match timeout(limit, self.runner.run(code)).await {
                Ok(Ok(value)) => return (Ok(value), attempt),
                Ok(Err(e)) => AttemptFailure::Script(e),
                Err(_) => AttemptFailure::TimedOut(limit),
            };
            tracing::debug!(attempt, of = attempts, failure = %last, "script attempt failed");

            if attempt < attempts {
                tokio::time::sleep(self.config.backoff() * attempt).await;
            }
        }

        (Err(BridgeError::Exhausted { attempts, last }), attempts)
    }

    fn push_history(&mut self, execution: Execution) {
        if self.config.history_len == 0 {
            return;
        }
        while self.history.len() >= self.config.history_len {
            self.history.pop_front();
        }
        self.history.push_back(execution);
    }
}

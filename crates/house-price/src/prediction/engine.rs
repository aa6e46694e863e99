use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use tracing::{debug, info, warn};

use super::algorithms::{standard_algorithms, AlgorithmSet};
use super::cache::PredictionCache;
use super::domain::{Algorithm, PredictionResult};
use super::pool::{ShutdownOutcome, WorkerPool};
use crate::config::EngineConfig;
use crate::property::{current_year, Property, PropertyId};

/// Lifecycle of an engine instance. Only `Running` accepts predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Running,
    ShuttingDown,
    Stopped,
}

impl EngineState {
    pub fn label(self) -> &'static str {
        match self {
            EngineState::Running => "running",
            EngineState::ShuttingDown => "shutting_down",
            EngineState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a `predict` call produced no results. The cache is untouched in every case.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("{algorithm} prediction did not complete within {timeout:?}")]
    Timeout {
        algorithm: Algorithm,
        timeout: Duration,
    },
    #[error("{algorithm} prediction failed: {cause}")]
    Failure { algorithm: Algorithm, cause: String },
    #[error("prediction engine is shut down")]
    Closed,
}

/// Fans each prediction out to every pricing algorithm on a shared worker pool.
pub struct PricePredictionEngine {
    config: EngineConfig,
    algorithms: AlgorithmSet,
    pool: WorkerPool,
    cache: PredictionCache,
    state: Mutex<EngineState>,
}

impl fmt::Debug for PricePredictionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PricePredictionEngine")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl PricePredictionEngine {
    pub fn new(config: EngineConfig) -> io::Result<Self> {
        Self::with_algorithms(config, standard_algorithms())
    }

    /// Builds an engine around a custom strategy set; each algorithm tag must appear once.
    pub fn with_algorithms(config: EngineConfig, algorithms: AlgorithmSet) -> io::Result<Self> {
        let distinct: HashSet<Algorithm> = algorithms.iter().map(|a| a.algorithm()).collect();
        if distinct.len() != algorithms.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "each pricing algorithm tag must appear exactly once",
            ));
        }

        let pool = WorkerPool::new(config.worker_threads)?;
        info!(
            workers = pool.size(),
            timeout = ?config.task_timeout,
            "prediction engine started"
        );

        Ok(Self {
            config,
            algorithms,
            pool,
            cache: PredictionCache::new(),
            state: Mutex::new(EngineState::Running),
        })
    }

    fn state_guard(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> EngineState {
        *self.state_guard()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn reference_year(&self) -> i32 {
        self.config.reference_year.unwrap_or_else(current_year)
    }

    /// Runs every algorithm against a snapshot of `property` and blocks until all finish.
    ///
    /// All-or-nothing: results reach the cache only when every task reported in time.
    pub fn predict(&self, property: &Property) -> Result<Vec<PredictionResult>, PredictionError> {
        if self.state() != EngineState::Running {
            return Err(PredictionError::Closed);
        }

        let snapshot = Arc::new(property.clone());
        let reference_year = self.reference_year();
        let started = Instant::now();
        let deadline = started + self.config.task_timeout;

        let mut pending = Vec::with_capacity(self.algorithms.len());
        for algorithm in &self.algorithms {
            let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
            let tag = algorithm.algorithm();
            let algorithm = Arc::clone(algorithm);
            let snapshot = Arc::clone(&snapshot);

            self.pool
                .submit(move || {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        algorithm.predict(&snapshot, reference_year)
                    }))
                    .map_err(|payload| panic_message(&*payload));
                    // The caller may have timed out and dropped the receiver.
                    let _ = reply_tx.send(outcome);
                })
                .map_err(|_| PredictionError::Closed)?;
            pending.push((tag, reply_rx));
        }

        let mut results = Vec::with_capacity(pending.len());
        for (algorithm, reply) in pending {
            match reply.recv_deadline(deadline) {
                Ok(Ok(result)) => results.push(result),
                Ok(Err(cause)) => {
                    warn!(property_id = %property.id, %algorithm, %cause, "prediction task failed");
                    return Err(PredictionError::Failure { algorithm, cause });
                }
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        property_id = %property.id,
                        %algorithm,
                        timeout = ?self.config.task_timeout,
                        "prediction task timed out"
                    );
                    return Err(PredictionError::Timeout {
                        algorithm,
                        timeout: self.config.task_timeout,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    if self.state() != EngineState::Running {
                        return Err(PredictionError::Closed);
                    }
                    return Err(PredictionError::Failure {
                        algorithm,
                        cause: "task was dropped before reporting".to_string(),
                    });
                }
            }
        }

        self.cache.append_all(&results);
        debug!(
            property_id = %property.id,
            elapsed = ?started.elapsed(),
            "predictions cached"
        );
        Ok(results)
    }

    /// Every cached result for `property_id`, oldest call first.
    pub fn cached_predictions(&self, property_id: PropertyId) -> Vec<PredictionResult> {
        self.cache.for_property(property_id)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        let dropped = self.cache.clear();
        info!(dropped, "prediction cache cleared");
    }

    pub fn queued_tasks(&self) -> usize {
        self.pool.queued()
    }

    /// Stops accepting work and drains the pool within the configured grace period.
    ///
    /// Safe to call repeatedly; only the first call waits.
    pub fn shutdown(&self) {
        {
            let mut state = self.state_guard();
            if *state != EngineState::Running {
                return;
            }
            *state = EngineState::ShuttingDown;
        }

        match self.pool.shutdown(self.config.shutdown_grace) {
            ShutdownOutcome::Drained => info!("prediction engine drained"),
            ShutdownOutcome::Forced { abandoned } => {
                warn!(abandoned, "prediction engine forced shutdown")
            }
            ShutdownOutcome::AlreadyStopped => {}
        }

        *self.state_guard() = EngineState::Stopped;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

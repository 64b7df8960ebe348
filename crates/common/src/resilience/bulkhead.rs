//! Bulkhead pattern for limiting concurrent operations
//!
//! Callers submit as many operations as they like; at most
//! `max_concurrent` of them run at any instant, the rest wait for a
//! permit. The bulkhead tracks peak concurrency so callers can assert the
//! bound in tests.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

/// Configuration error for [`BulkheadConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_concurrent must be greater than 0")]
    ZeroConcurrency,
}

/// Configuration for bulkhead behavior
#[derive(Debug, Clone)]
pub struct BulkheadConfig {
    /// Maximum number of concurrent operations allowed
    pub max_concurrent: usize,
}

impl Default for BulkheadConfig {
    fn default() -> Self {
        Self { max_concurrent: 10 }
    }
}

impl BulkheadConfig {
    /// Create a configuration with the given concurrency limit.
    pub fn new(max_concurrent: usize) -> Self {
        Self { max_concurrent }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(())
    }
}

/// Snapshot of bulkhead counters
#[derive(Debug, Clone)]
pub struct BulkheadMetrics {
    /// Total number of operations executed
    pub total_operations: u64,
    /// Highest number of operations observed running at once
    pub peak_concurrent: usize,
    /// Current number of running operations
    pub current_concurrent: usize,
    /// Configured concurrency limit
    pub max_concurrent: usize,
}

impl BulkheadMetrics {
    /// Current utilization in the range 0.0 to 1.0
    pub fn utilization(&self) -> f64 {
        self.current_concurrent as f64 / self.max_concurrent as f64
    }
}

/// Bulkhead limiting the number of concurrently running operations.
///
/// Cloneable handle; clones share the same permit pool and counters.
pub struct Bulkhead {
    config: BulkheadConfig,
    semaphore: Arc<Semaphore>,
    total_operations: Arc<AtomicU64>,
    peak_concurrent: Arc<AtomicUsize>,
    current_concurrent: Arc<AtomicUsize>,
}

impl Bulkhead {
    /// Create a new bulkhead with the given configuration.
    pub fn new(config: BulkheadConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
            total_operations: Arc::new(AtomicU64::new(0)),
            peak_concurrent: Arc::new(AtomicUsize::new(0)),
            current_concurrent: Arc::new(AtomicUsize::new(0)),
            config,
        })
    }

    /// Run an operation once a permit is available, waiting if necessary.
    ///
    /// The permit is held for the duration of the operation and released
    /// when it settles. Infallible with respect to the bulkhead itself:
    /// the semaphore is never closed, so the only outcome is the
    /// operation's own output.
    pub async fn run<F, Fut, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        // Semaphore lives as long as self, acquire cannot fail.
        let permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(_closed) => unreachable!("bulkhead semaphore is never closed"),
        };

        self.total_operations.fetch_add(1, Ordering::Relaxed);
        let running = self.current_concurrent.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_concurrent.fetch_max(running, Ordering::SeqCst);
        debug!(running, limit = self.config.max_concurrent, "bulkhead: operation started");

        let output = operation().await;

        self.current_concurrent.fetch_sub(1, Ordering::SeqCst);
        drop(permit);
        output
    }

    /// Get the current number of running operations
    pub fn current_concurrent(&self) -> usize {
        self.current_concurrent.load(Ordering::SeqCst)
    }

    /// Get a snapshot of the bulkhead counters
    pub fn metrics(&self) -> BulkheadMetrics {
        BulkheadMetrics {
            total_operations: self.total_operations.load(Ordering::Acquire),
            peak_concurrent: self.peak_concurrent.load(Ordering::Acquire),
            current_concurrent: self.current_concurrent(),
            max_concurrent: self.config.max_concurrent,
        }
    }
}

impl Clone for Bulkhead {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            semaphore: Arc::clone(&self.semaphore),
            total_operations: Arc::clone(&self.total_operations),
            peak_concurrent: Arc::clone(&self.peak_concurrent),
            current_concurrent: Arc::clone(&self.current_concurrent),
        }
    }
}

impl fmt::Debug for Bulkhead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bulkhead")
            .field("max_concurrent", &self.config.max_concurrent)
            .field("current_concurrent", &self.current_concurrent())
            .finish()
    }
}

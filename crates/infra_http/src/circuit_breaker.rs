//! Circuit breaker for calls to the CRM service
//!
//! ```text
//! Closed --(failure_threshold consecutive failures)--> Open
//! Open --(reset timeout elapsed)--> HalfOpen
//! HalfOpen --(success_threshold successes)--> Closed
//! HalfOpen --(any failure)--> Open
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

use core_kernel::{CircuitBreakerConfig, PortError};

/// Observable breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Circuit breaker state for fault tolerance
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    is_open: AtomicBool,
    opened_at: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            is_open: AtomicBool::new(false),
            opened_at: RwLock::new(None),
        }
    }

    pub async fn state(&self) -> CircuitState {
        if !self.is_open.load(Ordering::Relaxed) {
            return CircuitState::Closed;
        }

        let reset_after = Duration::from_secs(self.config.reset_timeout_secs);
        match *self.opened_at.read().await {
            Some(opened) if opened.elapsed() >= reset_after => CircuitState::HalfOpen,
            _ => CircuitState::Open,
        }
    }

    /// Returns true when a call may be attempted
    pub async fn is_available(&self) -> bool {
        self.state().await != CircuitState::Open
    }

    /// Fails fast while the circuit is open
    pub async fn check(&self, service: &str) -> Result<(), PortError> {
        if self.is_available().await {
            Ok(())
        } else {
            Err(PortError::ServiceUnavailable {
                service: format!("{service} (circuit open)"),
                message: None,
            })
        }
    }

    pub fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        if !self.is_open.load(Ordering::Relaxed) {
            return;
        }

        let successes = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= u64::from(self.config.success_threshold) {
            self.is_open.store(false, Ordering::Relaxed);
            self.success_count.store(0, Ordering::Relaxed);
            info!("Circuit breaker closed");
        }
    }

    pub async fn record_failure(&self) {
        self.success_count.store(0, Ordering::Relaxed);

        if self.is_open.load(Ordering::Relaxed) {
            // A failed trial call re-opens the circuit for a full period
            *self.opened_at.write().await = Some(Instant::now());
            return;
        }

        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= u64::from(self.config.failure_threshold) {
            self.is_open.store(true, Ordering::Relaxed);
            *self.opened_at.write().await = Some(Instant::now());
            warn!(failures, "Circuit breaker opened");
        }
    }
}

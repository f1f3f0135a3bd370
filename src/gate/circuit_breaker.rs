//! Circuit breaker
//!
//! Pauses real execution after a run of consecutive failures. A success
//! resets the count; an open breaker closes itself once the cooldown
//! elapses. Simulation signals never touch the breaker.

use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct BreakerState {
    failures: u32,
    tripped_at: Option<Instant>,
}

/// Consecutive-failure breaker with timed cooldown.
pub struct CircuitBreaker {
    max_failures: u32,
    cooldown: Duration,
    state: RwLock<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(max_failures: u32, cooldown: Duration) -> Self {
        Self {
            max_failures,
            cooldown,
            state: RwLock::new(BreakerState::default()),
        }
    }

    /// Whether a trade may proceed. Resets an open breaker whose cooldown
    /// has elapsed.
    pub async fn allow_trade(&self) -> bool {
        let mut state = self.state.write().await;
        let Some(tripped_at) = state.tripped_at else {
            return true;
        };

        if tripped_at.elapsed() >= self.cooldown {
            tracing::info!("Circuit breaker cooldown elapsed, resetting");
            *state = BreakerState::default();
            return true;
        }

        let remaining = self.cooldown - tripped_at.elapsed();
        tracing::warn!(
            remaining_secs = remaining.as_secs(),
            "Circuit breaker open, trade suppressed"
        );
        false
    }

    pub async fn record_success(&self) {
        let mut state = self.state.write().await;
        *state = BreakerState::default();
    }

    pub async fn record_failure(&self) {
        let mut state = self.state.write().await;
        state.failures += 1;
        if state.failures >= self.max_failures && state.tripped_at.is_none() {
            state.tripped_at = Some(Instant::now());
            tracing::error!(
                failures = state.failures,
                "Circuit breaker tripped, pausing real execution"
            );
        }
    }

    /// Consecutive failures recorded since the last success or reset.
    pub async fn consecutive_failures(&self) -> u32 {
        self.state.read().await.failures
    }
}

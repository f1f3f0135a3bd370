//! Duplicate-signal suppression
//!
//! The monitor occasionally re-emits the signal it just fired. Repeats of
//! the same `(token, amount)` pair inside the window are suppressed rather
//! than re-executed. A zero window disables suppression entirely.

use alloy::primitives::{Address, U256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Recent-signal window keyed on `(token, amount_in)`.
pub struct DedupWindow {
    window: Duration,
    seen: RwLock<HashMap<(Address, U256), Instant>>,
}

impl DedupWindow {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seen: RwLock::new(HashMap::new()),
        }
    }

    /// Returns `true` when the signal is fresh, recording it; `false` when
    /// an identical signal was already seen inside the window.
    pub async fn check_and_record(&self, token: Address, amount_in: U256) -> bool {
        if self.window.is_zero() {
            return true;
        }

        let mut seen = self.seen.write().await;
        seen.retain(|_, at| at.elapsed() < self.window);

        let key = (token, amount_in);
        if seen.contains_key(&key) {
            return false;
        }
        seen.insert(key, Instant::now());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const TOKEN: Address = address!("ed24fc36d5ee211ea25a80239fb8c4cfd80f12ee");

    #[tokio::test]
    async fn suppresses_repeat_within_window() {
        let dedup = DedupWindow::new(Duration::from_secs(60));
        let amount = U256::from(50_000_000_000_000_000u64);

        assert!(dedup.check_and_record(TOKEN, amount).await);
        assert!(!dedup.check_and_record(TOKEN, amount).await);
    }

    #[tokio::test]
    async fn distinct_signals_pass() {
        let dedup = DedupWindow::new(Duration::from_secs(60));

        assert!(dedup.check_and_record(TOKEN, U256::from(1u64)).await);
        assert!(dedup.check_and_record(TOKEN, U256::from(2u64)).await);
        assert!(
            dedup
                .check_and_record(Address::ZERO, U256::from(1u64))
                .await
        );
    }

    #[tokio::test]
    async fn zero_window_disables_suppression() {
        let dedup = DedupWindow::new(Duration::ZERO);
        let amount = U256::from(1u64);

        assert!(dedup.check_and_record(TOKEN, amount).await);
        assert!(dedup.check_and_record(TOKEN, amount).await);
    }

    #[tokio::test]
    async fn expired_entries_are_forgotten() {
        let dedup = DedupWindow::new(Duration::from_millis(20));
        let amount = U256::from(1u64);

        assert!(dedup.check_and_record(TOKEN, amount).await);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(dedup.check_and_record(TOKEN, amount).await);
    }
}

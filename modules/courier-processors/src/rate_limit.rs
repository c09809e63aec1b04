use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use courier_executor::{Processor, StateAccessor};
use courier_types::{ChainError, Item};

struct Window {
    started_at: Instant,
    count: u64,
}

/// Fixed-window counter: at most `limit` items pass within each
/// `window`-long slice of wall-clock time.
pub struct RateLimit {
    limit: u64,
    window: Duration,
    state: Mutex<Window>,
}

impl RateLimit {
    pub fn new(limit: u64, window: Duration) -> Self {
        Self {
            limit,
            window,
            state: Mutex::new(Window {
                started_at: Instant::now(),
                count: 0,
            }),
        }
    }
}

#[async_trait]
impl Processor for RateLimit {
    fn name(&self) -> &str {
        "rate_limit"
    }

    fn depends_on(&self) -> &[String] {
        &[]
    }

    async fn process(&self, _state: &StateAccessor, _item: &Item) -> Result<(), ChainError> {
        let mut window = self.state.lock().expect("rate limit window poisoned");
        if window.started_at.elapsed() >= self.window {
            window.started_at = Instant::now();
            window.count = 0;
        }
        if window.count >= self.limit {
            return Err(ChainError::filtered(self.name(), "rate limit exceeded for current window"));
        }
        window.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn an_item() -> Item {
        Item::new("id", "src", Utc::now(), json!({}))
    }

    #[tokio::test]
    async fn allows_up_to_limit_within_window() {
        let limiter = RateLimit::new(2, Duration::from_secs(60));
        let state = StateAccessor::default();
        assert!(limiter.process(&state, &an_item()).await.is_ok());
        assert!(limiter.process(&state, &an_item()).await.is_ok());
    }

    #[tokio::test]
    async fn drops_once_limit_reached() {
        let limiter = RateLimit::new(1, Duration::from_secs(60));
        let state = StateAccessor::default();
        assert!(limiter.process(&state, &an_item()).await.is_ok());
        let err = limiter.process(&state, &an_item()).await.unwrap_err();
        assert!(err.is_filtered());
    }

    #[tokio::test]
    async fn resets_after_window_elapses() {
        let limiter = RateLimit::new(1, Duration::from_millis(10));
        let state = StateAccessor::default();
        assert!(limiter.process(&state, &an_item()).await.is_ok());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(limiter.process(&state, &an_item()).await.is_ok());
    }
}

use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use courier_executor::{Processor, StateAccessor};
use courier_types::{ChainError, Item};

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Tokens refill by `elapsed / refill_rate` (seconds of elapsed time per
/// token `refill_rate` represents), capped at `capacity`; each item
/// costs one token.
pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    bucket: Mutex<Bucket>,
}

impl TokenBucket {
    pub fn new(capacity: f64, refill_rate: f64) -> Self {
        Self {
            capacity,
            refill_rate,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }
}

#[async_trait]
impl Processor for TokenBucket {
    fn name(&self) -> &str {
        "token_bucket"
    }

    fn depends_on(&self) -> &[String] {
        &[]
    }

    async fn process(&self, _state: &StateAccessor, _item: &Item) -> Result<(), ChainError> {
        let mut bucket = self.bucket.lock().expect("token bucket poisoned");
        let elapsed = bucket.last_refill.elapsed().as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed / self.refill_rate).min(self.capacity);
        bucket.last_refill = Instant::now();

        if bucket.tokens < 1.0 {
            return Err(ChainError::filtered(self.name(), "token bucket empty"));
        }
        bucket.tokens -= 1.0;
        Ok(())
    }
}

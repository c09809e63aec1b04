use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use courier_executor::{Processor, StateAccessor};
use courier_types::{ChainError, Item};
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

fn hash_of(item: &Item) -> String {
    let mut hasher = Sha256::new();
    hasher.update(item.id().as_bytes());
    hasher.update(item.content().to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// SHA-256 over `{id, content}`, first-seen timestamps kept for `ttl`
/// before a background sweeper reclaims them. This is the `dedupe`
/// processor other filters declare as a dependency.
pub struct TtlDedup {
    ttl: Duration,
    seen: Mutex<HashMap<String, Instant>>,
}

impl TtlDedup {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    fn sweep(&self) {
        let mut seen = self.seen.lock().expect("ttl dedup set poisoned");
        let before = seen.len();
        let ttl = self.ttl;
        seen.retain(|_, first_seen| first_seen.elapsed() < ttl);
        let evicted = before - seen.len();
        if evicted > 0 {
            debug!(evicted, "ttl dedup sweep reclaimed entries");
        }
    }

    pub fn spawn_sweeper(self: Arc<Self>, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => self.sweep(),
                    _ = token.cancelled() => break,
                }
            }
        })
    }
}

#[async_trait]
impl Processor for TtlDedup {
    fn name(&self) -> &str {
        "dedupe"
    }

    fn depends_on(&self) -> &[String] {
        &[]
    }

    async fn process(&self, _state: &StateAccessor, item: &Item) -> Result<(), ChainError> {
        let hash = hash_of(item);
        let is_new = {
            let mut seen = self.seen.lock().expect("ttl dedup set poisoned");
            if seen.contains_key(&hash) {
                false
            } else {
                seen.insert(hash, Instant::now());
                true
            }
        };
        if is_new {
            Ok(())
        } else {
            Err(ChainError::filtered(self.name(), "duplicate content within ttl window"))
        }
    }
}

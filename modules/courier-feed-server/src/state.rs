use std::sync::Arc;

use courier_cache::TtlCache;
use courier_scheduler::BotState;
use courier_store::Store;
use tokio::sync::watch;

#[derive(Clone)]
pub struct AppState {
    /// Also the cache-key prefix for rendered feed bodies; must match
    /// the feed target's configured name so its publish-time
    /// invalidation hits the same keys this server writes.
    pub name: String,
    pub home_url: String,
    pub store: Arc<Store>,
    pub cache: Arc<TtlCache<String>>,
    pub feed_size: i64,
    pub max_items: usize,
    pub per_page: u32,
    pub bot_state: Option<watch::Receiver<BotState>>,
}

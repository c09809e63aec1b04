//! The scheduler ("Bot"): drives a [`Pipeline`] either once (`run_once`)
//! or on a fixed-interval ticker, exposing its lifecycle state over a
//! `watch` channel so other components (e.g. the feed server's health
//! endpoint) can observe it without polling.

use std::sync::Arc;
use std::time::Duration;

use courier_executor::StateAccessor;
use courier_pipeline::{Pipeline, ShutdownReport};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Hard deadline for shutdown: any component that
/// doesn't finish within this window is logged and abandoned.
const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(30);

/// A per-tick run is bounded by the ticker interval minus this much
/// slack, so a run that overshoots its own tick still yields before the
/// next one would have started.
const RUN_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

/// Wraps a [`Pipeline`] with the `idle -> running -> stopping -> stopped`
/// lifecycle. Cloning a `Bot` shares the same underlying
/// pipeline and state channel.
pub struct Bot {
    pipeline: Arc<Pipeline>,
    state_tx: watch::Sender<BotState>,
    token: CancellationToken,
}

impl Bot {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        let (state_tx, _) = watch::channel(BotState::Idle);
        Self {
            pipeline,
            state_tx,
            token: CancellationToken::new(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<BotState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> BotState {
        *self.state_tx.borrow()
    }

    /// Requests a graceful stop. Cancels the in-flight run's context (if
    /// any) and lets the caller's `start`/`run_once` call return.
    pub fn stop(&self) {
        self.state_tx.send_replace(BotState::Stopping);
        self.token.cancel();
    }

    /// Executes exactly one pipeline run and returns, per `run_once`
    /// mode. `state` is threaded through to every processor/source via
    /// the pipeline.
    pub async fn run_once(&self, state: StateAccessor, timeout: Duration) -> anyhow::Result<()> {
        self.state_tx.send_replace(BotState::Running);
        self.pipeline.initialize().await?;
        let result = self.pipeline.run(state, timeout, self.token.clone()).await;
        self.shutdown().await;
        result.map_err(anyhow::Error::from)
    }

    /// Continuous mode: runs immediately, then on every `interval` tick
    /// thereafter, with no overlap — if a run overshoots `interval` the
    /// next tick fires immediately once it returns (`MissedTickBehavior::Delay`).
    /// Stops when `stop()` is called or the process receives a
    /// cancellation via the token passed at construction time.
    pub async fn start(&self, state: StateAccessor, interval: Duration) -> anyhow::Result<()> {
        self.pipeline.initialize().await?;
        self.state_tx.send_replace(BotState::Running);

        let run_timeout = interval.checked_sub(RUN_TIMEOUT_SLACK).unwrap_or(interval).max(Duration::from_secs(1));

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.token.is_cancelled() {
                        break;
                    }
                    match self.pipeline.run(state.clone(), run_timeout, self.token.clone()).await {
                        Ok(()) => {}
                        Err(e) => warn!(error = %e, "pipeline run failed for this tick"),
                    }
                }
                _ = self.token.cancelled() => break,
            }
        }

        self.shutdown().await;
        Ok(())
    }

    async fn shutdown(&self) {
        self.state_tx.send_replace(BotState::Stopping);
        let report = tokio::time::timeout(SHUTDOWN_DEADLINE, self.pipeline.shutdown()).await;
        match report {
            Ok(ShutdownReport { errors }) if errors.is_empty() => {
                info!("pipeline shutdown completed cleanly");
            }
            Ok(ShutdownReport { errors }) => {
                for (name, err) in errors {
                    warn!(component = name, error = %err, "component failed to shut down cleanly");
                }
            }
            Err(_) => warn!("pipeline shutdown did not complete within the deadline, abandoning"),
        }
        self.state_tx.send_replace(BotState::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use courier_dispatch::{Dispatcher, Target};
    use courier_executor::ProcessorChain;
    use courier_pipeline::{Source, SourceRoute};
    use courier_store::Store;
    use courier_types::{Item, PublishResult, SourceError};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::{mpsc, oneshot};

    struct CountingSource {
        count: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Source for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch(
            &self,
            _token: CancellationToken,
            _state: StateAccessor,
        ) -> (mpsc::Receiver<Item>, oneshot::Receiver<Option<SourceError>>) {
            self.count.fetch_add(1, Ordering::SeqCst);
            let (item_tx, item_rx) = mpsc::channel(1);
            let (err_tx, err_rx) = oneshot::channel();
            drop(item_tx);
            let _ = err_tx.send(None);
            (item_rx, err_rx)
        }
    }

    struct NoopTarget;

    #[async_trait]
    impl Target for NoopTarget {
        fn name(&self) -> &str {
            "noop"
        }

        async fn publish(&self, item: &Item) -> PublishResult {
            PublishResult::ok("noop", item.id())
        }
    }

    async fn test_pipeline(count: Arc<AtomicUsize>) -> Pipeline {
        let store = Arc::new(Store::connect("sqlite::memory:").await.unwrap());
        store.migrate().await.unwrap();
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&store)));
        let chain = Arc::new(ProcessorChain::new());
        chain.build().unwrap();
        let route = SourceRoute::new(
            "r",
            Arc::new(CountingSource { count }),
            vec![Arc::new(NoopTarget) as Arc<dyn Target>],
            chain,
            store,
            dispatcher,
        );
        Pipeline::new(vec![route])
    }

    #[tokio::test]
    async fn run_once_transitions_idle_to_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Arc::new(test_pipeline(Arc::clone(&count)).await);
        let bot = Bot::new(pipeline);
        assert_eq!(bot.state(), BotState::Idle);

        bot.run_once(StateAccessor::default(), Duration::from_secs(5)).await.unwrap();

        assert_eq!(bot.state(), BotState::Stopped);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn continuous_mode_ticks_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Arc::new(test_pipeline(Arc::clone(&count)).await);
        let bot = Arc::new(Bot::new(pipeline));

        let bot_clone = Arc::clone(&bot);
        let handle = tokio::spawn(async move {
            bot_clone.start(StateAccessor::default(), Duration::from_millis(20)).await.unwrap();
        });

        tokio::time::sleep(Duration::from_millis(75)).await;
        bot.stop();
        handle.await.unwrap();

        assert_eq!(bot.state(), BotState::Stopped);
        assert!(count.load(Ordering::SeqCst) >= 2, "expected multiple ticks, got {}", count.load(Ordering::SeqCst));
    }
}

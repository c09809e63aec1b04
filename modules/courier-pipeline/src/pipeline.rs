use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use courier_executor::StateAccessor;
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::route::SourceRoute;

/// Owns the route list and enforces that only one `run` is in flight at
/// a time. Each route gets its own task per tick; the pipeline waits
/// for all of them before returning.
pub struct Pipeline {
    routes: Vec<Arc<SourceRoute>>,
    running: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(routes: Vec<SourceRoute>) -> Self {
        Self {
            routes: routes.into_iter().map(Arc::new).collect(),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Initializes every source, and every unique target exactly once
    /// (targets may be shared across routes).
    pub async fn initialize(&self) -> anyhow::Result<()> {
        let mut initialized_targets = HashSet::new();
        for route in &self.routes {
            route.source.initialize().await?;
            for target in &route.targets {
                if initialized_targets.insert(target.name().to_string()) {
                    target.initialize().await?;
                }
            }
        }
        Ok(())
    }

    /// Runs one tick across all routes concurrently, bounded by
    /// `timeout`. Refuses a second concurrent run. `parent_token`
    /// lets a caller (e.g. the scheduler, on shutdown) cancel an
    /// in-flight run from outside.
    pub async fn run(
        &self,
        state: StateAccessor,
        timeout: Duration,
        parent_token: CancellationToken,
    ) -> Result<(), PipelineError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PipelineError::AlreadyRunning);
        }

        let result = self.run_inner(state, timeout, parent_token).await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_inner(
        &self,
        state: StateAccessor,
        timeout: Duration,
        parent_token: CancellationToken,
    ) -> Result<(), PipelineError> {
        let token = parent_token.child_token();
        let timeout_guard = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                token.cancel();
            })
        };

        let handles: Vec<_> = self
            .routes
            .iter()
            .map(|route| {
                let route = Arc::clone(route);
                let token = token.clone();
                let state = state.clone();
                tokio::spawn(async move { (route.name.clone(), route.run_tick(token, state).await) })
            })
            .collect();

        let results = join_all(handles).await;
        timeout_guard.abort();

        for result in results {
            match result {
                Ok((route_name, Ok(()))) => info!(route = route_name, "route completed"),
                Ok((route_name, Err(e))) => warn!(route = route_name, error = %e, "route failed for this tick"),
                Err(join_error) => warn!(error = %join_error, "route task panicked"),
            }
        }

        Ok(())
    }

    /// Calls `shutdown` on every source and every unique target
    /// (targets may be shared across routes), collecting rather than
    /// short-circuiting on individual failures.
    pub async fn shutdown(&self) -> ShutdownReport {
        let mut errors = Vec::new();
        let mut shut_down_targets = HashSet::new();

        for route in &self.routes {
            if let Err(e) = route.source.shutdown().await {
                errors.push((route.source.name().to_string(), e));
            }
            for target in &route.targets {
                if shut_down_targets.insert(target.name().to_string()) {
                    if let Err(e) = target.shutdown().await {
                        errors.push((target.name().to_string(), e));
                    }
                }
            }
        }

        ShutdownReport { errors }
    }
}

/// The outcome of [`Pipeline::shutdown`]: every component that failed
/// to shut down cleanly, keyed by its name.
#[derive(Default)]
pub struct ShutdownReport {
    pub errors: Vec<(String, anyhow::Error)>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

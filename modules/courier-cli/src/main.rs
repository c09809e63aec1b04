use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use courier_cache::TtlCache;
use courier_dispatch::{Dispatcher, Target};
use courier_executor::{ProcessorChain, StateAccessor};
use courier_pipeline::{Pipeline, SourceRoute};
use courier_scheduler::Bot;
use courier_store::Store;
use tracing_subscriber::EnvFilter;

mod factory;

#[derive(Parser)]
#[command(name = "courier", about = "Ingests items from sources, filters/transforms them through a processor chain, and dispatches them to targets")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Emit structured JSON logs instead of the default text format.
    #[arg(long)]
    json_logs: bool,

    /// Increase log verbosity (-v for debug, -vv for trace). Ignored if RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs, cli.verbose)?;

    tracing::info!(config = %cli.config.display(), "loading config");
    let config = courier_config::load_config(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    let store = Arc::new(Store::connect(&format!("sqlite://{}", config.store.path)).await?);
    store.migrate().await?;
    tracing::info!("migrations applied");

    let cache = Arc::new(TtlCache::<String>::new(Duration::from_secs(3600)));
    let evictor_token = tokio_util::sync::CancellationToken::new();
    cache.clone().spawn_evictor(evictor_token.clone());

    let mut built_targets = std::collections::HashMap::new();
    for target_config in &config.targets {
        let target = factory::build_target(target_config, Arc::clone(&store), Arc::clone(&cache))
            .with_context(|| format!("building target '{}'", target_config.name))?;
        built_targets.insert(target_config.name.clone(), target);
    }

    let chain = Arc::new(ProcessorChain::new());
    for processor_config in &config.processors {
        let processor = factory::build_processor(processor_config)
            .with_context(|| format!("building processor '{}'", processor_config.name))?;
        chain.with(processor_config.name.clone(), processor);
    }
    chain.build().context("building processor chain")?;

    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&store)));

    let mut routes = Vec::with_capacity(config.sources.len());
    for source_config in &config.sources {
        let source = factory::build_source(source_config)
            .with_context(|| format!("building source '{}'", source_config.name))?;
        let targets: Vec<Arc<dyn Target>> = source_config
            .targets
            .iter()
            .map(|name| Arc::clone(built_targets.get(name).expect("validated config references only declared targets")))
            .collect();
        routes.push(SourceRoute::new(
            source_config.name.clone(),
            source,
            targets,
            Arc::clone(&chain),
            Arc::clone(&store),
            Arc::clone(&dispatcher),
        ));
    }

    let pipeline = Arc::new(Pipeline::new(routes));
    let bot = Arc::new(Bot::new(Arc::clone(&pipeline)));

    // The feed server caches rendered bodies under this name, and
    // `FeedTarget::publish` invalidates the same prefix on insert, so
    // both sides must agree on the feed target's configured name.
    let feed_name = config
        .targets
        .iter()
        .find(|t| t.kind == "feed")
        .map(|t| t.name.clone())
        .unwrap_or_else(|| "courier".to_string());

    let feed_state = Arc::new(courier_feed_server::AppState {
        name: feed_name,
        home_url: format!("http://localhost:{}", config.feed_server.port),
        store: Arc::clone(&store),
        cache: Arc::clone(&cache),
        feed_size: config.feed_server.feed_size,
        max_items: config.feed_server.max_items,
        per_page: config.feed_server.per_page,
        bot_state: Some(bot.subscribe()),
    });
    let feed_server_port = config.feed_server.port;

    let exit_code = if config.scheduler.run_once {
        run_once(bot).await
    } else {
        run_continuous(bot, feed_state, feed_server_port, config.scheduler.interval).await
    };

    evictor_token.cancel();
    std::process::exit(exit_code);
}

async fn run_once(bot: Arc<Bot>) -> i32 {
    match bot.run_once(StateAccessor::default(), Duration::from_secs(300)).await {
        Ok(()) => {
            tracing::info!("run-once completed");
            0
        }
        Err(e) => {
            tracing::error!(error = %e, "run-once failed");
            1
        }
    }
}

async fn run_continuous(
    bot: Arc<Bot>,
    feed_state: Arc<courier_feed_server::AppState>,
    feed_server_port: u16,
    interval: Duration,
) -> i32 {
    let feed_server = tokio::spawn(async move {
        if let Err(e) = courier_feed_server::serve(feed_state, feed_server_port).await {
            tracing::error!(error = %e, "feed server exited with an error");
        }
    });

    let bot_clone = Arc::clone(&bot);
    let scheduler = tokio::spawn(async move { bot_clone.start(StateAccessor::default(), interval).await });

    if let Err(e) = wait_for_shutdown_signal().await {
        tracing::warn!(error = %e, "error waiting for shutdown signal, stopping anyway");
    }
    tracing::info!("shutdown signal received, stopping");
    bot.stop();

    let result = scheduler.await;
    feed_server.abort();

    match result {
        Ok(Ok(())) => 0,
        Ok(Err(e)) => {
            tracing::error!(error = %e, "scheduler exited with an error");
            1
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler task panicked");
            1
        }
    }
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}

fn init_tracing(json: bool, verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

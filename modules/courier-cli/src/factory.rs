//! Builds concrete `Source`/`Processor`/`Target` instances from parsed
//! config entries, keyed by the `type` string. Grounded on
//! `rootsignal-domains::scraping::adapters::build_ingestor`'s
//! match-on-adapter-name shape; unknown types are rejected up front by
//! `courier-config::validate`, so the catch-all arms here are
//! unreachable in practice, not a second line of defense.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use courier_cache::TtlCache;
use courier_config::{ProcessorConfig, SourceConfig, TargetConfig};
use courier_dispatch::Target;
use courier_executor::Processor;
use courier_pipeline::Source;
use courier_processors::{
    ContentDedup, ExtractText, HashSource, KeywordFilter, KeywordMode, PublishedAtFilter,
    RateLimit, ScoreFilter, SummaryClamp, TokenBucket, TtlDedup,
};
use courier_sources::{NewsAggregatorSource, RssSource, ScriptedScraperSource};
use courier_store::Store;
use courier_targets::{ChatWebhookTarget, FeedTarget};

pub fn build_source(config: &SourceConfig) -> Result<Arc<dyn Source>> {
    match config.kind.as_str() {
        "news_aggregator" => {
            let list_url = config
                .get_str("list_url")
                .ok_or_else(|| anyhow!("source '{}' missing required field 'list_url'", config.name))?;
            let item_url_template = config.get_str("item_url_template").ok_or_else(|| {
                anyhow!("source '{}' missing required field 'item_url_template'", config.name)
            })?;
            let limit = config.get_int("limit").unwrap_or(30).max(1) as usize;
            Ok(Arc::new(NewsAggregatorSource::new(
                config.name.clone(),
                list_url,
                item_url_template,
                limit,
            )))
        }
        "rss" => {
            let feed_url = config
                .get_str("feed_url")
                .ok_or_else(|| anyhow!("source '{}' missing required field 'feed_url'", config.name))?;
            Ok(Arc::new(RssSource::new(config.name.clone(), feed_url)))
        }
        "scripted_scraper" => {
            let script_path = config.get_str("script_path").unwrap_or_default();
            Ok(Arc::new(ScriptedScraperSource::new(config.name.clone(), script_path)))
        }
        other => Err(anyhow!("unknown source type '{other}'")),
    }
}

pub fn build_processor(config: &ProcessorConfig) -> Result<Arc<dyn Processor>> {
    match config.kind.as_str() {
        "score_filter" => {
            let minimum = config.get_int("minimum").unwrap_or(0);
            Ok(Arc::new(ScoreFilter::new(minimum)))
        }
        "keyword_filter" => {
            let keywords = config.get_str_list("keywords");
            let exact_keywords = config.get_str_list("exact_keywords");
            let mode = match config.get_str("mode").as_deref() {
                Some("exclude") => KeywordMode::Exclude,
                _ => KeywordMode::Include,
            };
            let threshold = config.get_float("threshold").unwrap_or(0.1);
            Ok(Arc::new(KeywordFilter::new(keywords, exact_keywords, mode, threshold)))
        }
        "published_at_filter" => {
            let after = parse_rfc3339(config.get_str("after"))
                .with_context(|| format!("processor '{}' field 'after'", config.name))?;
            let before = parse_rfc3339(config.get_str("before"))
                .with_context(|| format!("processor '{}' field 'before'", config.name))?;
            Ok(Arc::new(PublishedAtFilter::new(after, before)))
        }
        "content_dedup" => {
            let source = match config.get_str("field") {
                Some(field) => HashSource::MetadataField(field),
                None => HashSource::CanonicalContent,
            };
            Ok(Arc::new(ContentDedup::new(source)))
        }
        "dedup_ttl" => {
            let ttl = config
                .get_duration("ttl")
                .transpose()
                .map_err(|e| anyhow!("processor '{}' field 'ttl': {e}", config.name))?
                .unwrap_or(Duration::from_secs(24 * 3600));
            Ok(Arc::new(TtlDedup::new(ttl)))
        }
        "rate_limit" => {
            let limit = config.get_int("limit").unwrap_or(0).max(0) as u64;
            let window = config
                .get_duration("window")
                .transpose()
                .map_err(|e| anyhow!("processor '{}' field 'window': {e}", config.name))?
                .ok_or_else(|| anyhow!("processor '{}' missing required field 'window'", config.name))?;
            Ok(Arc::new(RateLimit::new(limit, window)))
        }
        "token_bucket" => {
            let capacity = config
                .get_float("capacity")
                .ok_or_else(|| anyhow!("processor '{}' missing required field 'capacity'", config.name))?;
            let refill_rate = config
                .get_float("refill_rate")
                .ok_or_else(|| anyhow!("processor '{}' missing required field 'refill_rate'", config.name))?;
            Ok(Arc::new(TokenBucket::new(capacity, refill_rate)))
        }
        "extract_text" => {
            let fields = config.get_str_list("fields");
            Ok(Arc::new(ExtractText::new(fields)))
        }
        "summary_clamp" => {
            let max_chars = config.get_int("max_chars").unwrap_or(280).max(0) as usize;
            Ok(Arc::new(SummaryClamp::new(max_chars)))
        }
        other => Err(anyhow!("unknown processor type '{other}'")),
    }
}

pub fn build_target(
    config: &TargetConfig,
    store: Arc<Store>,
    cache: Arc<TtlCache<String>>,
) -> Result<Arc<dyn Target>> {
    match config.kind.as_str() {
        "feed" => Ok(Arc::new(FeedTarget::new(config.name.clone(), store, cache))),
        "chat_webhook" => {
            let webhook_url = config
                .get_str("webhook_url")
                .ok_or_else(|| anyhow!("target '{}' missing required field 'webhook_url'", config.name))?;
            let mut target = ChatWebhookTarget::new(config.name.clone(), webhook_url);
            if let Some(pace) = config
                .get_duration("pace")
                .transpose()
                .map_err(|e| anyhow!("target '{}' field 'pace': {e}", config.name))?
            {
                target = target.with_pace(pace);
            }
            Ok(Arc::new(target))
        }
        other => Err(anyhow!("unknown target type '{other}'")),
    }
}

fn parse_rfc3339(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    match value {
        None => Ok(None),
        Some(s) => Ok(Some(DateTime::parse_from_rfc3339(&s)?.with_timezone(&Utc))),
    }
}

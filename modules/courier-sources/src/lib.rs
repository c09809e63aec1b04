mod news_aggregator;
mod rss_source;
mod scripted_scraper;

pub use news_aggregator::NewsAggregatorSource;
pub use rss_source::RssSource;
pub use scripted_scraper::ScriptedScraperSource;

#[cfg(test)]
mod tests {
    use courier_executor::StateAccessor;
    use courier_pipeline::Source;
    use tokio_util::sync::CancellationToken;

    use super::*;

    #[tokio::test]
    async fn scripted_scraper_reports_not_implemented_on_the_error_channel() {
        let source = ScriptedScraperSource::new("custom", "scripts/custom.lua");
        let (mut items, errors) = source.fetch(CancellationToken::new(), StateAccessor::default()).await;

        assert!(items.recv().await.is_none());
        let err = errors.await.unwrap();
        assert!(err.is_some());
        assert!(err.unwrap().0.contains("scripts/custom.lua"));
    }
}

mod content_dedup;
mod extract_text;
mod keyword_filter;
mod published_at_filter;
mod rate_limit;
mod score_filter;
mod summary;
mod token_bucket;
mod ttl_dedup;

pub use content_dedup::{ContentDedup, HashSource};
pub use extract_text::ExtractText;
pub use keyword_filter::{KeywordFilter, Mode as KeywordMode};
pub use published_at_filter::PublishedAtFilter;
pub use rate_limit::RateLimit;
pub use score_filter::ScoreFilter;
pub use summary::SummaryClamp;
pub use token_bucket::TokenBucket;
pub use ttl_dedup::TtlDedup;

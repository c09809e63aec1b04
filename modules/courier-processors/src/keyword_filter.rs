use std::sync::LazyLock;

use async_trait::async_trait;
use courier_executor::{Processor, StateAccessor};
use courier_types::{ChainError, Item};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Include,
    Exclude,
}

/// Stems a string into its lowercase word roots with the English
/// Snowball algorithm. Used for both keyword matching and tokenizing
/// title/content text.
fn stem_words(text: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    WORD_RE
        .find_iter(text)
        .map(|m| stemmer.stem(&m.as_str().to_lowercase()).to_string())
        .collect()
}

/// Text-analyzes an item's title and extracted content against a
/// configured keyword set, passing matches through in `include` mode
/// and dropping them in `exclude` mode.
pub struct KeywordFilter {
    keywords: Vec<String>,
    exact_keywords: Vec<String>,
    mode: Mode,
    threshold: f64,
    depends_on: Vec<String>,
}

impl KeywordFilter {
    pub fn new(keywords: Vec<String>, exact_keywords: Vec<String>, mode: Mode, threshold: f64) -> Self {
        Self {
            keywords,
            exact_keywords,
            mode,
            threshold,
            depends_on: vec!["extract_text".to_string()],
        }
    }

    fn exact_hit(&self, title: &str, content: &str) -> bool {
        let title_lower = title.to_lowercase();
        let content_lower = content.to_lowercase();
        self.exact_keywords.iter().any(|k| {
            let k = k.to_lowercase();
            title_lower.contains(&k) || content_lower.contains(&k)
        })
    }

    fn coverage_hit(&self, title: &str, content: &str) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let stemmed_keywords: Vec<String> = self.keywords.iter().map(|k| stem_words(k).join(" ")).collect();
        let title_tokens = stem_words(title);
        let content_tokens = stem_words(content);

        let title_matches = stemmed_keywords
            .iter()
            .filter(|k| title_tokens.iter().any(|t| t == *k))
            .count();
        let content_matches = stemmed_keywords
            .iter()
            .filter(|k| content_tokens.iter().any(|t| t == *k))
            .count();

        let coverage = (content_matches as f64 / self.keywords.len() as f64) * (1.0 + 0.10 * title_matches as f64);
        if coverage > self.threshold {
            return true;
        }

        if title_tokens.is_empty() || title_matches < 2 {
            return false;
        }
        let density = title_matches as f64 / title_tokens.len() as f64;
        density > 0.30
    }

    fn matches(&self, title: &str, content: &str) -> bool {
        self.exact_hit(title, content) || self.coverage_hit(title, content)
    }
}

#[async_trait]
impl Processor for KeywordFilter {
    fn name(&self) -> &str {
        "keyword_filter"
    }

    fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    async fn process(&self, _state: &StateAccessor, item: &Item) -> Result<(), ChainError> {
        let title = item
            .get_metadata("title")
            .await
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let content = item.text_content().await;

        let matched = self.matches(&title, &content);
        let passes = match self.mode {
            Mode::Include => matched,
            Mode::Exclude => !matched,
        };

        if passes {
            Ok(())
        } else {
            Err(ChainError::filtered(self.name(), "keyword rules did not pass"))
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    async fn item(title: &str, content: &str) -> Item {
        let item = Item::new("id", "source", Utc::now(), json!({}));
        item.set_metadata("title", title).await;
        item.set_text_content(content).await;
        item
    }

    #[tokio::test]
    async fn exact_keyword_match_passes_in_include_mode() {
        let filter = KeywordFilter::new(vec![], vec!["urgent".to_string()], Mode::Include, 0.5);
        let item = item("News update", "this is urgent news").await;
        let state = StateAccessor::default();
        assert!(filter.process(&state, &item).await.is_ok());
    }

    #[tokio::test]
    async fn coverage_above_threshold_passes() {
        let filter = KeywordFilter::new(
            vec!["system".to_string()],
            vec![],
            Mode::Include,
            0.1,
        );
        let item = item("Systems paper", "a paper about distributed systems design").await;
        let state = StateAccessor::default();
        assert!(filter.process(&state, &item).await.is_ok());
    }

    #[tokio::test]
    async fn no_match_is_filtered_in_include_mode() {
        let filter = KeywordFilter::new(vec!["rust".to_string()], vec![], Mode::Include, 0.9);
        let item = item("Cooking tips", "how to bake bread").await;
        let state = StateAccessor::default();
        let err = filter.process(&state, &item).await.unwrap_err();
        assert!(err.is_filtered());
    }

    #[tokio::test]
    async fn exclude_mode_drops_matches() {
        let filter = KeywordFilter::new(vec![], vec!["spoiler".to_string()], Mode::Exclude, 0.5);
        let item = item("Movie review", "huge spoiler inside").await;
        let state = StateAccessor::default();
        let err = filter.process(&state, &item).await.unwrap_err();
        assert!(err.is_filtered());
    }

    #[tokio::test]
    async fn exclude_mode_passes_non_matches() {
        let filter = KeywordFilter::new(vec![], vec!["spoiler".to_string()], Mode::Exclude, 0.5);
        let item = item("Movie review", "no reveals here").await;
        let state = StateAccessor::default();
        assert!(filter.process(&state, &item).await.is_ok());
    }

    #[test]
    fn stemming_is_case_insensitive_and_consistent() {
        assert_eq!(stem_words("Systems"), stem_words("systems"));
        assert_eq!(stem_words("hello world").len(), 2);
    }
}

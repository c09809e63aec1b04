use std::path::Path;

use crate::error::ConfigError;
use crate::model::RootConfig;
use crate::validate::validate;

/// Read, parse, and validate the config file at `path`. Validation
/// failures are fatal.
pub fn load_config(path: &Path) -> Result<RootConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config: RootConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_validates_a_well_formed_config() {
        let toml = r#"
            [store]
            path = "courier.db"

            [scheduler]
            interval = "5m"
            run_once = false

            [[sources]]
            name = "hn_front_page"
            type = "news_aggregator"
            targets = ["feed", "chat"]
            list_url = "https://hn.example/topstories.json"
            item_url_template = "https://hn.example/item/{id}.json"
            limit = 30

            [[processors]]
            name = "dedupe"
            type = "dedup_ttl"
            depends_on = []
            ttl = "24h"

            [[targets]]
            name = "feed"
            type = "feed"

            [[targets]]
            name = "chat"
            type = "chat_webhook"
            webhook_url = "https://example.invalid/hook"
        "#;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, toml).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].get_int("limit"), Some(30));
        assert_eq!(
            config.targets[1].get_str("webhook_url").as_deref(),
            Some("https://example.invalid/hook")
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_config(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

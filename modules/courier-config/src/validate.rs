//! Config validation:
//! missing referenced targets, unknown component types, and cyclic
//! processor dependencies are all fatal at startup, before a single
//! `Processor`/`Source`/`Target` instance exists.

use std::collections::{HashMap, HashSet};

use crate::error::ConfigError;
use crate::model::RootConfig;

pub const KNOWN_SOURCE_TYPES: &[&str] = &["news_aggregator", "rss", "scripted_scraper"];

pub const KNOWN_PROCESSOR_TYPES: &[&str] = &[
    "score_filter",
    "keyword_filter",
    "published_at_filter",
    "content_dedup",
    "dedup_ttl",
    "rate_limit",
    "token_bucket",
    "extract_text",
    "summary_clamp",
];

pub const KNOWN_TARGET_TYPES: &[&str] = &["feed", "chat_webhook"];

pub fn validate(config: &RootConfig) -> Result<(), ConfigError> {
    check_duplicate_names("source", config.sources.iter().map(|s| s.name.as_str()))?;
    check_duplicate_names("processor", config.processors.iter().map(|p| p.name.as_str()))?;
    check_duplicate_names("target", config.targets.iter().map(|t| t.name.as_str()))?;

    let known_targets: HashSet<&str> = config.targets.iter().map(|t| t.name.as_str()).collect();
    for target in &config.targets {
        if !KNOWN_TARGET_TYPES.contains(&target.kind.as_str()) {
            return Err(ConfigError::UnknownTargetType(target.kind.clone()));
        }
    }

    for source in &config.sources {
        if !KNOWN_SOURCE_TYPES.contains(&source.kind.as_str()) {
            return Err(ConfigError::UnknownSourceType(source.kind.clone()));
        }
        for target_name in &source.targets {
            if !known_targets.contains(target_name.as_str()) {
                return Err(ConfigError::UndefinedTarget {
                    source: source.name.clone(),
                    target: target_name.clone(),
                });
            }
        }
    }

    for processor in &config.processors {
        if !KNOWN_PROCESSOR_TYPES.contains(&processor.kind.as_str()) {
            return Err(ConfigError::UnknownProcessorType(processor.kind.clone()));
        }
    }

    check_processor_graph(&config.processors)?;

    Ok(())
}

fn check_duplicate_names<'a>(
    kind: &'static str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Validates that every `depends_on` entry names a declared processor
/// and that the dependency graph has no cycle, using a plain
/// three-color DFS over names only (no `Processor` instances exist yet
/// at config-validation time, unlike `courier_executor::ProcessorGraph`).
fn check_processor_graph(processors: &[crate::model::ProcessorConfig]) -> Result<(), ConfigError> {
    let names: HashSet<&str> = processors.iter().map(|p| p.name.as_str()).collect();
    let deps: HashMap<&str, &[String]> = processors
        .iter()
        .map(|p| (p.name.as_str(), p.depends_on.as_slice()))
        .collect();

    for processor in processors {
        for dep in &processor.depends_on {
            if !names.contains(dep.as_str()) {
                return Err(ConfigError::UnknownProcessorDependency {
                    processor: processor.name.clone(),
                    dependency: dep.clone(),
                });
            }
        }
    }

    #[derive(Copy, Clone, PartialEq, Eq)]
    enum Color {
        White,
        Gray,
        Black,
    }

    let mut color: HashMap<&str, Color> = names.iter().map(|n| (*n, Color::White)).collect();
    let mut path: Vec<&str> = Vec::new();

    fn visit<'a>(
        name: &'a str,
        deps: &HashMap<&'a str, &'a [String]>,
        color: &mut HashMap<&'a str, Color>,
        path: &mut Vec<&'a str>,
    ) -> Result<(), ConfigError> {
        match color[name] {
            Color::Black => return Ok(()),
            Color::Gray => {
                let start = path.iter().position(|n| *n == name).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(name.to_string());
                return Err(ConfigError::CyclicProcessorDependency(cycle.join(" -> ")));
            }
            Color::White => {}
        }

        color.insert(name, Color::Gray);
        path.push(name);

        if let Some(node_deps) = deps.get(name) {
            for dep in node_deps.iter() {
                visit(dep.as_str(), deps, color, path)?;
            }
        }

        path.pop();
        color.insert(name, Color::Black);
        Ok(())
    }

    for name in names.iter() {
        if color[name] == Color::White {
            visit(name, &deps, &mut color, &mut path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeedServerConfig, ProcessorConfig, SchedulerConfig, SourceConfig, StoreConfig, TargetConfig};
    use std::time::Duration;

    fn processor(name: &str, depends_on: &[&str]) -> ProcessorConfig {
        ProcessorConfig {
            name: name.to_string(),
            kind: "rate_limit".to_string(),
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            settings: toml::Table::new(),
        }
    }

    fn base_config() -> RootConfig {
        RootConfig {
            store: StoreConfig { path: "courier.db".to_string() },
            scheduler: SchedulerConfig { interval: Duration::from_secs(300), run_once: false },
            feed_server: FeedServerConfig::default(),
            sources: Vec::new(),
            processors: Vec::new(),
            targets: Vec::new(),
        }
    }

    #[test]
    fn cyclic_dependency_is_rejected() {
        let mut config = base_config();
        config.processors = vec![processor("a", &["b"]), processor("b", &["a"])];
        let err = validate(&config).unwrap_err();
        match err {
            ConfigError::CyclicProcessorDependency(msg) => {
                assert!(msg.contains('a'));
                assert!(msg.contains('b'));
            }
            other => panic!("expected cycle error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_dependency_is_rejected() {
        let mut config = base_config();
        config.processors = vec![processor("a", &["ghost"])];
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProcessorDependency { .. }));
    }

    #[test]
    fn undefined_target_reference_is_rejected() {
        let mut config = base_config();
        config.sources = vec![SourceConfig {
            name: "hn".to_string(),
            kind: "news_aggregator".to_string(),
            targets: vec!["missing".to_string()],
            settings: toml::Table::new(),
        }];
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::UndefinedTarget { .. }));
    }

    #[test]
    fn valid_config_passes() {
        let mut config = base_config();
        config.targets = vec![TargetConfig {
            name: "feed".to_string(),
            kind: "feed".to_string(),
            settings: toml::Table::new(),
        }];
        config.sources = vec![SourceConfig {
            name: "hn".to_string(),
            kind: "news_aggregator".to_string(),
            targets: vec!["feed".to_string()],
            settings: toml::Table::new(),
        }];
        config.processors = vec![processor("dedupe", &[]), processor("score_filter", &["dedupe"])];
        assert!(validate(&config).is_ok());
    }
}

use std::path::PathBuf;

/// Configuration errors are fatal at startup: a bad config file never
/// reaches the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: Box<toml::de::Error>,
    },

    #[error("invalid duration '{0}'")]
    InvalidDuration(String),

    #[error("source '{source}' references undefined target '{target}'")]
    UndefinedTarget { source: String, target: String },

    #[error("unknown source type '{0}'")]
    UnknownSourceType(String),

    #[error("unknown processor type '{0}'")]
    UnknownProcessorType(String),

    #[error("unknown target type '{0}'")]
    UnknownTargetType(String),

    #[error("processor '{processor}' depends on unknown processor '{dependency}'")]
    UnknownProcessorDependency { processor: String, dependency: String },

    #[error("cyclic processor dependency: {0}")]
    CyclicProcessorDependency(String),

    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: &'static str, name: String },
}

//! Config file loading and validation: a single TOML file
//! selecting storage path, scheduler interval, and the source/
//! processor/target declarations.

mod duration;
mod error;
mod load;
mod model;
mod validate;

pub use duration::parse_duration;
pub use error::ConfigError;
pub use load::load_config;
pub use model::{
    FeedServerConfig, ProcessorConfig, RootConfig, SchedulerConfig, SourceConfig, StoreConfig,
    TargetConfig,
};
pub use validate::{validate, KNOWN_PROCESSOR_TYPES, KNOWN_SOURCE_TYPES, KNOWN_TARGET_TYPES};

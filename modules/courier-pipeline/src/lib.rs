mod error;
mod pipeline;
mod route;
mod source;

pub use error::PipelineError;
pub use pipeline::{Pipeline, ShutdownReport};
pub use route::SourceRoute;
pub use source::Source;

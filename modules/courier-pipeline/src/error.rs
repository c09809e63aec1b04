/// Programmer-level errors — things that should never happen given a
/// correctly driven caller, returned rather than panicked on.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("pipeline is already running")]
    AlreadyRunning,

    #[error("route '{route}' source fetch failed: {source}")]
    SourceFailed {
        route: String,
        #[source]
        source: courier_types::SourceError,
    },
}

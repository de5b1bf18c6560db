use thiserror::Error;

/// Failures a whole pipeline refresh can end in.
///
/// Individual adapter failures are not errors at this level; they are
/// reported in the response metadata. Only a refresh that produced nothing
/// usable surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Every configured source failed; there is no partial result to serve.
    #[error("all {count} configured sources failed")]
    AllSourcesFailed { count: usize },
}

//! Hook error types

use crate::store::StoreError;
use thiserror::Error;

/// Failure of a single hook invocation
///
/// Never propagated past the dispatcher; reported per invocation instead.
#[derive(Debug, Error)]
pub enum HookError {
    /// Log or snapshot store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    /// Direct file access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Options could not be parsed into the hook's settings
    #[error("Invalid options for {hook}: {source}")]
    InvalidOptions {
        hook: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

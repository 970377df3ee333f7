//! Error types for brisk-core

use brisk_router::RouteError;
use thiserror::Error;

/// Result type alias for brisk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the route dispatcher
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected route pattern or unknown method name
    #[error(transparent)]
    Route(#[from] RouteError),
}

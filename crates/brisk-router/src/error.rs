//! Error types for brisk-router

use thiserror::Error;

/// Registration-time errors raised by the route tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// A parameter already occupies this tree position under another name
    #[error("Conflicting parameter name in {path}: ':{requested}' clashes with existing ':{existing}'")]
    ConflictingParameterName {
        path: String,
        existing: String,
        requested: String,
    },

    /// `:` with nothing after it
    #[error("Empty parameter name in route: {path}")]
    EmptyParameterName { path: String },

    /// `*` followed by more segments
    #[error("Wildcard must be the last segment: {path}")]
    WildcardNotLast { path: String },

    /// Invalid HTTP method
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),
}

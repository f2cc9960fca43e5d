//! Workspace base error type.
//!
//! Sub-crates define their own error enums (`GraphError`, `SearchError`,
//! `SessionError`) and wrap `PfError` where a core failure can surface.

use thiserror::Error;

/// Errors raised by `pf-core` itself.
#[derive(Debug, Error)]
pub enum PfError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `pf-core`.
pub type PfResult<T> = Result<T, PfError>;

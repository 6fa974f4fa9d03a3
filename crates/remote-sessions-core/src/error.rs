//! Error types for descriptor construction, remote queries and the
//! local repository.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::SessionId;

/// Descriptor construction error.
///
/// Raised eagerly at build time, before any connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("invalid authentication combination: {0}")]
    InvalidAuthenticationCombination(String),
}

/// Per-target query error.
///
/// These never propagate as a fault out of the coordinator; each one is
/// converted into a single stream entry for its target.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryError {
    #[error("target unreachable: {detail}")]
    TargetUnreachable { detail: String },
    #[error("authentication rejected: {detail}")]
    AuthenticationRejected { detail: String },
    #[error("protocol error: {detail}")]
    ProtocolError { detail: String },
    /// The query was in flight when a stop was requested.
    #[error("query cancelled")]
    Cancelled,
}

/// Local session repository error.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("session not found: {0}")]
    NotFound(SessionId),
    #[error("repository error: {0}")]
    Internal(String),
}

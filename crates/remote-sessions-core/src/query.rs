//! Per-target query outcomes and the stream entry union.

use serde::{Deserialize, Serialize};

use crate::descriptor::ConnectionDescriptor;
use crate::error::QueryError;
use crate::session::Session;

/// Failure record for one target's query attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFailure {
    /// The descriptor the failed query was dialed with.
    pub descriptor: ConnectionDescriptor,
    /// What went wrong.
    pub error: QueryError,
}

/// One entry in the result stream: a discovered session or a deferred
/// per-target failure to replay as diagnostic output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StreamEntry {
    Session(Session),
    Failure(QueryFailure),
}

impl StreamEntry {
    #[must_use]
    pub const fn is_session(&self) -> bool {
        matches!(self, Self::Session(_))
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }
}

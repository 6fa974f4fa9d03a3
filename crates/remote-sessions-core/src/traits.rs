//! Trait seams between the engine and its collaborators.

use async_trait::async_trait;

use crate::descriptor::ConnectionDescriptor;
use crate::error::{QueryError, RepositoryError};
use crate::filter::FilterCriteria;
use crate::query::StreamEntry;
use crate::session::Session;

/// Read access to the sessions already tracked by the current process, plus
/// the insertion step that merges remote discoveries back in.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Every tracked session.
    async fn list_all(&self) -> Result<Vec<Session>, RepositoryError>;

    /// Tracked sessions matching `criteria`.
    async fn find_matching(&self, criteria: &FilterCriteria)
    -> Result<Vec<Session>, RepositoryError>;

    /// Insert or replace by instance id. A freshly discovered remote session
    /// replaces a local entry with the same id.
    async fn upsert(&self, session: Session) -> Result<(), RepositoryError>;
}

/// A remote execution endpoint that can report its disconnected/known
/// sessions. The wire protocol behind this call is opaque to the engine.
#[async_trait]
pub trait RemoteEndpoint: Send + Sync {
    /// One blocking network round-trip asking `descriptor`'s target for its
    /// sessions. Within one target's reply, session order is preserved.
    async fn query_disconnected_sessions(
        &self,
        descriptor: &ConnectionDescriptor,
        filter: &FilterCriteria,
    ) -> Result<Vec<Session>, QueryError>;
}

/// The caller-visible output channel the facade replays stream entries into.
pub trait OutputSink: Send {
    fn emit(&mut self, entry: StreamEntry);
}

/// Collects entries into a vector. Handy as a default sink.
#[derive(Debug, Default)]
pub struct VecSink {
    entries: Vec<StreamEntry>,
}

impl VecSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions emitted so far, in emission order.
    #[must_use]
    pub fn sessions(&self) -> Vec<&Session> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                StreamEntry::Session(s) => Some(s),
                StreamEntry::Failure(_) => None,
            })
            .collect()
    }

    /// Failures emitted so far, in emission order.
    #[must_use]
    pub fn failures(&self) -> Vec<&crate::query::QueryFailure> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                StreamEntry::Failure(f) => Some(f),
                StreamEntry::Session(_) => None,
            })
            .collect()
    }

    #[must_use]
    pub fn entries(&self) -> &[StreamEntry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<StreamEntry> {
        self.entries
    }
}

impl OutputSink for VecSink {
    fn emit(&mut self, entry: StreamEntry) {
        self.entries.push(entry);
    }
}

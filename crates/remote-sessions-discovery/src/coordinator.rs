//! Throttled remote query coordinator.
//!
//! Fans one query per connection descriptor out across worker tasks, caps
//! in-flight queries with a semaphore, and writes results to the shared
//! `ResultStream` in completion order. A failure on one target never affects
//! the others; cancellation is cooperative and polled before every dispatch.

use std::sync::Arc;

use remote_sessions_core::{
    ConnectionDescriptor, FilterCriteria, QueryError, QueryFailure, RemoteEndpoint, Session,
    StreamEntry,
};
use tokio::{sync::Semaphore, task::JoinSet};
use tokio_util::sync::CancellationToken;

use crate::stream::ResultStream;

/// Concurrency cap used when the caller passes a throttle limit of zero.
pub const DEFAULT_THROTTLE_LIMIT: usize = 32;

/// Coordinates concurrent disconnected-session queries against one endpoint
/// implementation.
pub struct DiscoveryCoordinator<E> {
    endpoint: Arc<E>,
}

impl<E: RemoteEndpoint + 'static> DiscoveryCoordinator<E> {
    #[must_use]
    pub fn new(endpoint: Arc<E>) -> Self {
        Self { endpoint }
    }

    /// Query every descriptor's target for its sessions, writing matching
    /// sessions and per-target failures into `stream` as they complete.
    ///
    /// At most `throttle_limit` queries run concurrently (zero selects
    /// [`DEFAULT_THROTTLE_LIMIT`]); a limit of one runs strictly
    /// sequentially in input order. The stream is closed exactly once, after
    /// every worker has finished or acknowledged cancellation, so no write
    /// can race the close.
    pub async fn discover_remote_sessions(
        &self,
        descriptors: Vec<ConnectionDescriptor>,
        filter: FilterCriteria,
        throttle_limit: usize,
        cancel: CancellationToken,
        stream: Arc<ResultStream>,
    ) {
        let limit = if throttle_limit == 0 {
            DEFAULT_THROTTLE_LIMIT
        } else {
            throttle_limit
        };
        tracing::debug!(
            targets = descriptors.len(),
            limit,
            "dispatching remote session queries"
        );

        if limit == 1 {
            for descriptor in descriptors {
                if cancel.is_cancelled() {
                    break;
                }
                run_target(self.endpoint.as_ref(), descriptor, &filter, &cancel, &stream).await;
            }
            stream.close();
            return;
        }

        let semaphore = Arc::new(Semaphore::new(limit));
        let mut workers = JoinSet::new();
        for descriptor in descriptors {
            let endpoint = Arc::clone(&self.endpoint);
            let filter = filter.clone();
            let cancel = cancel.clone();
            let stream = Arc::clone(&stream);
            let semaphore = Arc::clone(&semaphore);
            workers.spawn(async move {
                let permit = tokio::select! {
                    () = cancel.cancelled() => return,
                    permit = semaphore.acquire_owned() => {
                        let Ok(permit) = permit else { return };
                        permit
                    }
                };
                // Skipped entirely when a stop arrived while queued.
                if cancel.is_cancelled() {
                    drop(permit);
                    return;
                }
                run_target(endpoint.as_ref(), descriptor, &filter, &cancel, &stream).await;
                drop(permit);
            });
        }

        // The stream must stay open until no worker can still write to it.
        while workers.join_next().await.is_some() {}
        stream.close();
    }
}

async fn run_target<E: RemoteEndpoint + ?Sized>(
    endpoint: &E,
    descriptor: ConnectionDescriptor,
    filter: &FilterCriteria,
    cancel: &CancellationToken,
    stream: &ResultStream,
) {
    match query_one(endpoint, &descriptor, filter, cancel).await {
        Ok(sessions) => {
            tracing::debug!(
                target = %descriptor.address(),
                count = sessions.len(),
                "remote query completed"
            );
            for session in sessions {
                if filter.matches(&session) {
                    stream.write(StreamEntry::Session(session));
                }
            }
        }
        Err(error) => {
            tracing::warn!(target = %descriptor.address(), %error, "remote query failed");
            stream.write(StreamEntry::Failure(QueryFailure { descriptor, error }));
        }
    }
}

/// One query attempt with the descriptor's per-query timeout applied and the
/// cancellation token raced against the round-trip.
async fn query_one<E: RemoteEndpoint + ?Sized>(
    endpoint: &E,
    descriptor: &ConnectionDescriptor,
    filter: &FilterCriteria,
    cancel: &CancellationToken,
) -> Result<Vec<Session>, QueryError> {
    let attempt = async {
        let query = endpoint.query_disconnected_sessions(descriptor, filter);
        match descriptor.options().query_timeout {
            Some(limit) => match tokio::time::timeout(limit, query).await {
                Ok(result) => result,
                Err(_) => Err(QueryError::TargetUnreachable {
                    detail: "query timed out".into(),
                }),
            },
            None => query.await,
        }
    };

    tokio::select! {
        () = cancel.cancelled() => Err(QueryError::Cancelled),
        result = attempt => result,
    }
}

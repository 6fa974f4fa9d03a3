//! Session enumeration facade.
//!
//! Chooses one enumeration mode per invocation and replays results into the
//! caller's output sink, polling the cancellation token before every
//! emission.

use std::sync::Arc;

use remote_sessions_core::{
    AuthMechanism, ConnectionDescriptor, ConnectionDescriptorBuilder, DescriptorError,
    DiscoveryDefaults, FilterCriteria, OutputSink, PasswordCredential, RemoteEndpoint,
    RepositoryError, SessionOptions, SessionRepository, StreamEntry, TargetSelector,
};
use tokio_util::sync::CancellationToken;

use crate::coordinator::DiscoveryCoordinator;
use crate::stream::ResultStream;

/// Enumeration error. Per-target query failures are not errors at this
/// level; they are replayed through the sink as diagnostic entries.
#[derive(Debug, thiserror::Error)]
pub enum EnumerationError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Connection and filter settings shared by every target of one remote
/// query invocation.
#[derive(Debug, Clone, Default)]
pub struct RemoteQuerySettings {
    pub filter: FilterCriteria,
    /// Maximum concurrent queries; zero selects the system default.
    pub throttle_limit: usize,
    pub secure: bool,
    pub port: Option<u16>,
    pub application_name: Option<String>,
    pub shell_name: Option<String>,
    pub auth_mechanism: AuthMechanism,
    pub credential: Option<PasswordCredential>,
    pub certificate_thumbprint: Option<String>,
    /// Maximum redirect count; only honored for URI targets.
    pub allow_redirection: Option<u32>,
    pub options: SessionOptions,
}

/// One enumeration request. The mode is fixed for the whole invocation.
#[derive(Debug, Clone)]
pub enum EnumerationRequest {
    /// Every session in the local repository.
    AllLocal,
    /// Local repository sessions matching the criteria.
    FilteredLocal(FilterCriteria),
    /// Live queries against one or more remote targets.
    RemoteQuery {
        targets: Vec<TargetSelector>,
        settings: RemoteQuerySettings,
    },
}

/// Entry point joining the local repository and the remote query
/// coordinator behind one call.
pub struct SessionEnumerator<R, E> {
    repository: Arc<R>,
    endpoint: Arc<E>,
    defaults: DiscoveryDefaults,
}

impl<R, E> SessionEnumerator<R, E>
where
    R: SessionRepository,
    E: RemoteEndpoint + 'static,
{
    #[must_use]
    pub fn new(repository: Arc<R>, endpoint: Arc<E>, defaults: DiscoveryDefaults) -> Self {
        Self {
            repository,
            endpoint,
            defaults,
        }
    }

    /// Run one enumeration, emitting sessions and per-target diagnostics
    /// into `sink`. A stop request on `cancel` halts emission immediately,
    /// even when buffered entries remain.
    ///
    /// # Errors
    /// Returns an error for an invalid descriptor (reported before any
    /// query starts) or a repository failure. Per-target query failures are
    /// emitted as stream entries instead.
    pub async fn enumerate<S: OutputSink>(
        &self,
        request: EnumerationRequest,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> Result<(), EnumerationError> {
        match request {
            EnumerationRequest::AllLocal => {
                let sessions = self.repository.list_all().await?;
                emit_sessions(sessions, cancel, sink);
                Ok(())
            }
            EnumerationRequest::FilteredLocal(criteria) => {
                let sessions = self.repository.find_matching(&criteria).await?;
                emit_sessions(sessions, cancel, sink);
                Ok(())
            }
            EnumerationRequest::RemoteQuery { targets, settings } => {
                self.run_remote_query(&targets, settings, cancel, sink).await
            }
        }
    }

    async fn run_remote_query<S: OutputSink>(
        &self,
        targets: &[TargetSelector],
        settings: RemoteQuerySettings,
        cancel: &CancellationToken,
        sink: &mut S,
    ) -> Result<(), EnumerationError> {
        // Descriptor validation is eager: any invalid authentication
        // combination aborts before a single query is dispatched.
        let descriptors = targets
            .iter()
            .map(|target| build_descriptor(target, &settings, &self.defaults))
            .collect::<Result<Vec<_>, _>>()?;

        let stream = Arc::new(ResultStream::new());
        let coordinator = DiscoveryCoordinator::new(Arc::clone(&self.endpoint));
        let filter = settings.filter.clone();
        let throttle_limit = settings.throttle_limit;

        let driver = {
            let cancel = cancel.clone();
            let stream = Arc::clone(&stream);
            tokio::spawn(async move {
                coordinator
                    .discover_remote_sessions(descriptors, filter, throttle_limit, cancel, stream)
                    .await;
            })
        };

        'drain: loop {
            let entries = stream.wait_entries().await;
            if entries.is_empty() {
                break;
            }
            for entry in entries {
                if cancel.is_cancelled() {
                    tracing::debug!("enumeration stopped mid-drain");
                    break 'drain;
                }
                sink.emit(entry);
            }
        }

        // Workers abort promptly once the token fires; wait so no query is
        // left writing into a stream nobody owns.
        let _ = driver.await;
        Ok(())
    }
}

fn emit_sessions<S: OutputSink>(
    sessions: Vec<remote_sessions_core::Session>,
    cancel: &CancellationToken,
    sink: &mut S,
) {
    for session in sessions {
        if cancel.is_cancelled() {
            break;
        }
        sink.emit(StreamEntry::Session(session));
    }
}

fn build_descriptor(
    target: &TargetSelector,
    settings: &RemoteQuerySettings,
    defaults: &DiscoveryDefaults,
) -> Result<ConnectionDescriptor, DescriptorError> {
    let mut builder = ConnectionDescriptorBuilder::new()
        .secure(settings.secure)
        .auth_mechanism(settings.auth_mechanism)
        .options(settings.options.clone());

    if let Some(port) = settings.port {
        builder = builder.port(port);
    }
    if let Some(ref name) = settings.application_name {
        builder = builder.application_name(name.clone());
    }
    if let Some(ref name) = settings.shell_name {
        builder = builder.shell_name(name.clone());
    }
    if let Some(ref credential) = settings.credential {
        builder = builder.credential(credential.clone());
    }
    if let Some(ref thumbprint) = settings.certificate_thumbprint {
        builder = builder.certificate_thumbprint(thumbprint.clone());
    }
    if let Some(max) = settings.allow_redirection {
        builder = builder.allow_redirection(max);
    }

    builder.build(target, defaults)
}

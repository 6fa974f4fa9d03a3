//! Demo: enumerate local and remote sessions against a scripted endpoint.
//!
//! Run with `RUST_LOG=debug cargo run -p discovery-cli` to watch the
//! coordinator dispatch and complete queries.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use remote_sessions_core::{
    ConnectionDescriptor, ConnectionDescriptorBuilder, DiscoveryDefaults, FilterCriteria,
    OutputSink, QueryError, RemoteEndpoint, Session, SessionRepository, SessionState, StreamEntry,
    TargetAddress, TargetSelector,
};
use remote_sessions_discovery::{EnumerationRequest, RemoteQuerySettings, SessionEnumerator};
use remote_sessions_repository::MemoryRepository;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Endpoint answering from a fixed host table, with a small artificial
/// round-trip delay.
struct ScriptedEndpoint {
    hosts: HashMap<String, Vec<Session>>,
}

#[async_trait]
impl RemoteEndpoint for ScriptedEndpoint {
    async fn query_disconnected_sessions(
        &self,
        descriptor: &ConnectionDescriptor,
        _filter: &FilterCriteria,
    ) -> Result<Vec<Session>, QueryError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let host = match descriptor.address() {
            TargetAddress::HostPort { host, .. } => host.clone(),
            other => other.to_string(),
        };
        self.hosts
            .get(&host)
            .cloned()
            .ok_or_else(|| QueryError::TargetUnreachable {
                detail: format!("{host}: connection refused"),
            })
    }
}

/// Sink printing each entry as it is emitted.
struct PrintSink;

impl OutputSink for PrintSink {
    fn emit(&mut self, entry: StreamEntry) {
        match entry {
            StreamEntry::Session(session) => println!(
                "  {} {:12} {} (via {})",
                session.instance_id,
                session.state.to_string(),
                session.name,
                session.connection.address()
            ),
            StreamEntry::Failure(failure) => {
                eprintln!("  error: {}: {}", failure.descriptor.address(), failure.error);
            }
        }
    }
}

fn scripted_session(host: &str, name: &str, defaults: &DiscoveryDefaults) -> Session {
    let connection = ConnectionDescriptorBuilder::new()
        .build(
            &TargetSelector::ComputerName { name: host.into() },
            defaults,
        )
        .expect("anonymous descriptor is always valid");
    Session::new(name, SessionState::Disconnected, connection)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let defaults = DiscoveryDefaults::default();

    let mut hosts = HashMap::new();
    hosts.insert(
        "build-01".to_string(),
        vec![
            scripted_session("build-01", "nightly", &defaults),
            scripted_session("build-01", "release", &defaults),
        ],
    );
    hosts.insert(
        "build-02".to_string(),
        vec![scripted_session("build-02", "nightly", &defaults)],
    );
    let endpoint = Arc::new(ScriptedEndpoint { hosts });

    let repository = Arc::new(MemoryRepository::new());
    repository
        .upsert(scripted_session("localhost", "scratch", &defaults))
        .await?;

    let enumerator = SessionEnumerator::new(
        Arc::clone(&repository),
        endpoint,
        defaults,
    );
    let cancel = CancellationToken::new();

    println!("local sessions:");
    enumerator
        .enumerate(EnumerationRequest::AllLocal, &cancel, &mut PrintSink)
        .await?;

    println!("remote disconnected sessions:");
    enumerator
        .enumerate(
            EnumerationRequest::RemoteQuery {
                targets: vec![
                    TargetSelector::ComputerName {
                        name: "build-01".into(),
                    },
                    TargetSelector::ComputerName {
                        name: "build-02".into(),
                    },
                    TargetSelector::ComputerName {
                        name: "build-03".into(),
                    },
                ],
                settings: RemoteQuerySettings {
                    filter: FilterCriteria::new().with_state(SessionState::Disconnected),
                    throttle_limit: 2,
                    ..RemoteQuerySettings::default()
                },
            },
            &cancel,
            &mut PrintSink,
        )
        .await?;

    Ok(())
}

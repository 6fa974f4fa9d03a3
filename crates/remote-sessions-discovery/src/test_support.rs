//! Shared endpoint mock for coordinator and facade tests.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use remote_sessions_core::{
    ConnectionDescriptor, ConnectionDescriptorBuilder, DiscoveryDefaults, FilterCriteria,
    QueryError, RemoteEndpoint, Session, SessionOptions, SessionState, TargetAddress,
    TargetSelector,
};

enum Response {
    Sessions {
        sessions: Vec<Session>,
        delay: Option<Duration>,
    },
    Fail(QueryError),
    Hang,
}

/// Scripted endpoint keyed by bare hostname. Counts calls and observes the
/// number of concurrently running queries.
pub struct MockEndpoint {
    responses: Mutex<HashMap<String, Response>>,
    pub calls: AtomicUsize,
    current: AtomicUsize,
    pub max_concurrent: AtomicUsize,
}

impl MockEndpoint {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            current: AtomicUsize::new(0),
            max_concurrent: AtomicUsize::new(0),
        }
    }

    pub fn ok(&self, host: &str, sessions: Vec<Session>) {
        self.responses.lock().unwrap().insert(
            host.into(),
            Response::Sessions {
                sessions,
                delay: None,
            },
        );
    }

    pub fn ok_after(&self, host: &str, delay: Duration, sessions: Vec<Session>) {
        self.responses.lock().unwrap().insert(
            host.into(),
            Response::Sessions {
                sessions,
                delay: Some(delay),
            },
        );
    }

    pub fn fail(&self, host: &str, error: QueryError) {
        self.responses
            .lock()
            .unwrap()
            .insert(host.into(), Response::Fail(error));
    }

    /// The query for `host` never completes on its own.
    pub fn hang(&self, host: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(host.into(), Response::Hang);
    }
}

fn host_key(address: &TargetAddress) -> String {
    match address {
        TargetAddress::HostPort { host, .. } => host.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl RemoteEndpoint for MockEndpoint {
    async fn query_disconnected_sessions(
        &self,
        descriptor: &ConnectionDescriptor,
        _filter: &FilterCriteria,
    ) -> Result<Vec<Session>, QueryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let running = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_concurrent.fetch_max(running, Ordering::SeqCst);

        let key = host_key(descriptor.address());
        let outcome = {
            let responses = self.responses.lock().unwrap();
            match responses.get(&key) {
                Some(Response::Sessions { sessions, delay }) => Ok((sessions.clone(), *delay)),
                Some(Response::Fail(error)) => Err(Some(error.clone())),
                Some(Response::Hang) => Err(None),
                None => Err(Some(QueryError::TargetUnreachable {
                    detail: format!("unknown host {key}"),
                })),
            }
        };

        let result = match outcome {
            Ok((sessions, delay)) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(sessions)
            }
            Err(Some(error)) => Err(error),
            Err(None) => {
                self.current.fetch_sub(1, Ordering::SeqCst);
                std::future::pending().await
            }
        };

        self.current.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub fn descriptor(host: &str) -> ConnectionDescriptor {
    ConnectionDescriptorBuilder::new()
        .build(
            &TargetSelector::ComputerName { name: host.into() },
            &DiscoveryDefaults::default(),
        )
        .unwrap()
}

pub fn descriptor_with(host: &str, options: SessionOptions) -> ConnectionDescriptor {
    ConnectionDescriptorBuilder::new()
        .options(options)
        .build(
            &TargetSelector::ComputerName { name: host.into() },
            &DiscoveryDefaults::default(),
        )
        .unwrap()
}

pub fn session(name: &str, state: SessionState, connection: &ConnectionDescriptor) -> Session {
    Session::new(name, state, connection.clone())
}

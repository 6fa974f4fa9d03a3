//! Core abstractions for remote session discovery.
//!
//! This crate provides the fundamental building blocks:
//! - `Session` / `SessionState` - The session data model
//! - `FilterCriteria` - Name/instance-id/state predicates
//! - `ConnectionDescriptor` - Fully-resolved per-target connection parameters
//! - `DiscoveryDefaults` - Process-wide defaults resolved at the facade boundary
//! - Repository, endpoint and sink traits

pub mod config;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod query;
pub mod session;
pub mod traits;

pub use config::DiscoveryDefaults;
pub use descriptor::{
    AuthMechanism, ConnectionDescriptor, ConnectionDescriptorBuilder, Credentials,
    PasswordCredential, SessionOptions, TargetAddress, TargetSelector, TransportScheme,
};
pub use error::{DescriptorError, QueryError, RepositoryError};
pub use filter::FilterCriteria;
pub use query::{QueryFailure, StreamEntry};
pub use session::{Session, SessionId, SessionState};
pub use traits::{OutputSink, RemoteEndpoint, SessionRepository, VecSink};

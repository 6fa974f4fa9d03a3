//! Remote session discovery engine.
//!
//! Provides:
//! - `ResultStream` - Buffer decoupling query workers from the consumer
//! - `DiscoveryCoordinator` - Throttled, cancellable query fan-out
//! - `SessionEnumerator` - AllLocal / FilteredLocal / RemoteQuery facade

pub mod coordinator;
pub mod facade;
pub mod stream;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::{DEFAULT_THROTTLE_LIMIT, DiscoveryCoordinator};
pub use facade::{EnumerationError, EnumerationRequest, RemoteQuerySettings, SessionEnumerator};
pub use stream::ResultStream;

//! Process-wide discovery defaults.
//!
//! Resolved once at the facade boundary and passed down explicitly; nothing
//! in the engine reads configuration from the environment.

use serde::{Deserialize, Serialize};

/// Defaults applied when the caller leaves a descriptor field unspecified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryDefaults {
    /// Application endpoint name for hostname targets.
    pub application_name: String,
    /// Shell/configuration name.
    pub shell_name: String,
    /// Port for the plain transport scheme.
    pub plain_port: u16,
    /// Port for the secure transport scheme.
    pub secure_port: u16,
    /// Concurrency cap used when the caller passes a throttle limit of zero.
    pub throttle_limit: usize,
}

impl Default for DiscoveryDefaults {
    fn default() -> Self {
        Self {
            application_name: "wsman".into(),
            shell_name: "default".into(),
            plain_port: 5985,
            secure_port: 5986,
            throttle_limit: 32,
        }
    }
}

impl DiscoveryDefaults {
    /// Default port for `scheme`.
    #[must_use]
    pub const fn port_for(&self, scheme: crate::descriptor::TransportScheme) -> u16 {
        match scheme {
            crate::descriptor::TransportScheme::Plain => self.plain_port,
            crate::descriptor::TransportScheme::Secure => self.secure_port,
        }
    }
}

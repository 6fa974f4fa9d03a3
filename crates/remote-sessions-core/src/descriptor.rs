//! Connection descriptors and their builder.
//!
//! A `ConnectionDescriptor` carries every parameter needed to dial one
//! target. Descriptors are immutable once built; all resolution of defaults
//! and validation of authentication parameters happens in
//! `ConnectionDescriptorBuilder::build`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::DiscoveryDefaults;
use crate::error::DescriptorError;

/// Transport scheme for a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportScheme {
    Plain,
    Secure,
}

/// How the caller identified one remote target.
///
/// Resolved once at the facade boundary; each variant maps to exactly one
/// connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetSelector {
    /// A bare hostname; scheme, port and endpoint names come from defaults.
    ComputerName { name: String },
    /// A full connection URI, used verbatim.
    ConnectionUri { uri: String },
    /// A container identifier.
    ContainerId { id: String },
    /// A virtual machine identifier.
    VmId { id: String },
}

/// Fully-resolved target address of a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetAddress {
    HostPort { host: String, port: u16 },
    Uri { uri: String },
    Container { id: String },
    Vm { id: String },
}

impl std::fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HostPort { host, port } => write!(f, "{host}:{port}"),
            Self::Uri { uri } => f.write_str(uri),
            Self::Container { id } => write!(f, "container:{id}"),
            Self::Vm { id } => write!(f, "vm:{id}"),
        }
    }
}

/// Authentication mechanism requested for a connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMechanism {
    /// Let the transport negotiate.
    #[default]
    Default,
    Basic,
    Negotiate,
    Kerberos,
    /// Client certificate only; incompatible with password credentials.
    Certificate,
}

impl AuthMechanism {
    /// Whether this mechanism authenticates with a client certificate
    /// rather than a password credential.
    #[must_use]
    pub const fn is_certificate_based(self) -> bool {
        matches!(self, Self::Certificate)
    }
}

/// A username/password credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordCredential {
    pub username: String,
    pub password: String,
}

/// Resolved authentication material.
///
/// The enum makes the credential/thumbprint exclusivity structural: a built
/// descriptor can never carry both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
    Anonymous,
    Password { credential: PasswordCredential },
    CertificateThumbprint { thumbprint: String },
}

/// Session-level tuning options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionOptions {
    /// Per-query timeout. Applied to each target independently.
    pub query_timeout: Option<Duration>,
    /// Receive buffer size hint, in bytes.
    pub receive_buffer_size: Option<usize>,
    /// Send buffer size hint, in bytes.
    pub send_buffer_size: Option<usize>,
}

/// Immutable, fully-resolved connection parameters for one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    scheme: TransportScheme,
    address: TargetAddress,
    application_name: String,
    shell_name: String,
    auth_mechanism: AuthMechanism,
    credentials: Credentials,
    max_redirections: u32,
    options: SessionOptions,
}

impl ConnectionDescriptor {
    #[must_use]
    pub const fn scheme(&self) -> TransportScheme {
        self.scheme
    }

    #[must_use]
    pub const fn address(&self) -> &TargetAddress {
        &self.address
    }

    #[must_use]
    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    #[must_use]
    pub fn shell_name(&self) -> &str {
        &self.shell_name
    }

    #[must_use]
    pub const fn auth_mechanism(&self) -> AuthMechanism {
        self.auth_mechanism
    }

    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Maximum redirect count; zero unless built from a URI target with
    /// redirection explicitly allowed.
    #[must_use]
    pub const fn max_redirections(&self) -> u32 {
        self.max_redirections
    }

    #[must_use]
    pub const fn options(&self) -> &SessionOptions {
        &self.options
    }
}

/// Builder producing one `ConnectionDescriptor` per target.
///
/// Authentication parameters are validated eagerly in [`Self::build`], before
/// any connection is attempted.
#[derive(Debug, Clone, Default)]
pub struct ConnectionDescriptorBuilder {
    secure: bool,
    port: Option<u16>,
    application_name: Option<String>,
    shell_name: Option<String>,
    auth_mechanism: AuthMechanism,
    credential: Option<PasswordCredential>,
    certificate_thumbprint: Option<String>,
    allowed_redirections: Option<u32>,
    options: SessionOptions,
}

impl ConnectionDescriptorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the secure transport scheme for hostname targets.
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Override the port for hostname targets.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    #[must_use]
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn shell_name(mut self, name: impl Into<String>) -> Self {
        self.shell_name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn auth_mechanism(mut self, mechanism: AuthMechanism) -> Self {
        self.auth_mechanism = mechanism;
        self
    }

    #[must_use]
    pub fn credential(mut self, credential: PasswordCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    #[must_use]
    pub fn certificate_thumbprint(mut self, thumbprint: impl Into<String>) -> Self {
        self.certificate_thumbprint = Some(thumbprint.into());
        self
    }

    /// Allow up to `max` redirects. Only effective for URI targets; the
    /// built descriptor forces the count to zero otherwise.
    #[must_use]
    pub const fn allow_redirection(mut self, max: u32) -> Self {
        self.allowed_redirections = Some(max);
        self
    }

    #[must_use]
    pub fn options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the descriptor for `selector`, resolving unspecified fields
    /// from `defaults`.
    ///
    /// # Errors
    /// Returns `DescriptorError::InvalidAuthenticationCombination` when both
    /// a credential and a certificate thumbprint are supplied, or when the
    /// requested mechanism is incompatible with the supplied material.
    pub fn build(
        self,
        selector: &TargetSelector,
        defaults: &DiscoveryDefaults,
    ) -> Result<ConnectionDescriptor, DescriptorError> {
        let credentials = Self::resolve_credentials(
            self.auth_mechanism,
            self.credential,
            self.certificate_thumbprint,
        )?;

        let scheme = match selector {
            TargetSelector::ConnectionUri { uri } => {
                if uri.starts_with("https://") {
                    TransportScheme::Secure
                } else {
                    TransportScheme::Plain
                }
            }
            _ if self.secure => TransportScheme::Secure,
            _ => TransportScheme::Plain,
        };

        let address = match selector {
            TargetSelector::ComputerName { name } => TargetAddress::HostPort {
                host: name.clone(),
                port: self.port.unwrap_or_else(|| defaults.port_for(scheme)),
            },
            TargetSelector::ConnectionUri { uri } => TargetAddress::Uri { uri: uri.clone() },
            TargetSelector::ContainerId { id } => TargetAddress::Container { id: id.clone() },
            TargetSelector::VmId { id } => TargetAddress::Vm { id: id.clone() },
        };

        // Redirection is only meaningful when the caller named the endpoint
        // by URI and opted in.
        let max_redirections = match (&address, self.allowed_redirections) {
            (TargetAddress::Uri { .. }, Some(max)) => max,
            _ => 0,
        };

        Ok(ConnectionDescriptor {
            scheme,
            address,
            application_name: self
                .application_name
                .unwrap_or_else(|| defaults.application_name.clone()),
            shell_name: self
                .shell_name
                .unwrap_or_else(|| defaults.shell_name.clone()),
            auth_mechanism: self.auth_mechanism,
            credentials,
            max_redirections,
            options: self.options,
        })
    }

    fn resolve_credentials(
        mechanism: AuthMechanism,
        credential: Option<PasswordCredential>,
        thumbprint: Option<String>,
    ) -> Result<Credentials, DescriptorError> {
        match (credential, thumbprint) {
            (Some(_), Some(_)) => Err(DescriptorError::InvalidAuthenticationCombination(
                "a credential and a certificate thumbprint cannot both be supplied".into(),
            )),
            (Some(_), None) if mechanism.is_certificate_based() => {
                Err(DescriptorError::InvalidAuthenticationCombination(
                    "certificate authentication does not accept a password credential".into(),
                ))
            }
            (None, Some(_))
                if !mechanism.is_certificate_based() && mechanism != AuthMechanism::Default =>
            {
                Err(DescriptorError::InvalidAuthenticationCombination(format!(
                    "a certificate thumbprint cannot be used with {mechanism:?} authentication"
                )))
            }
            (None, None) if mechanism.is_certificate_based() => {
                Err(DescriptorError::InvalidAuthenticationCombination(
                    "certificate authentication requires a thumbprint".into(),
                ))
            }
            (Some(credential), None) => Ok(Credentials::Password { credential }),
            (None, Some(thumbprint)) => Ok(Credentials::CertificateThumbprint { thumbprint }),
            (None, None) => Ok(Credentials::Anonymous),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> DiscoveryDefaults {
        DiscoveryDefaults::default()
    }

    fn host(name: &str) -> TargetSelector {
        TargetSelector::ComputerName { name: name.into() }
    }

    fn credential() -> PasswordCredential {
        PasswordCredential {
            username: "admin".into(),
            password: "hunter2".into(),
        }
    }

    #[test]
    fn hostname_defaults_to_plain_scheme_and_port() {
        let descriptor = ConnectionDescriptorBuilder::new()
            .build(&host("server-a"), &defaults())
            .unwrap();

        assert_eq!(descriptor.scheme(), TransportScheme::Plain);
        assert_eq!(
            descriptor.address(),
            &TargetAddress::HostPort {
                host: "server-a".into(),
                port: defaults().plain_port,
            }
        );
        assert_eq!(descriptor.application_name(), defaults().application_name);
        assert_eq!(descriptor.credentials(), &Credentials::Anonymous);
    }

    #[test]
    fn secure_flag_switches_default_port() {
        let descriptor = ConnectionDescriptorBuilder::new()
            .secure(true)
            .build(&host("server-a"), &defaults())
            .unwrap();

        assert_eq!(descriptor.scheme(), TransportScheme::Secure);
        assert!(matches!(
            descriptor.address(),
            TargetAddress::HostPort { port, .. } if *port == defaults().secure_port
        ));
    }

    #[test]
    fn uri_scheme_is_taken_from_the_uri() {
        let selector = TargetSelector::ConnectionUri {
            uri: "https://server-a:5986/endpoint".into(),
        };
        let descriptor = ConnectionDescriptorBuilder::new()
            .build(&selector, &defaults())
            .unwrap();

        assert_eq!(descriptor.scheme(), TransportScheme::Secure);
    }

    #[test]
    fn redirection_is_forced_to_zero_for_hostname_targets() {
        let descriptor = ConnectionDescriptorBuilder::new()
            .allow_redirection(5)
            .build(&host("server-a"), &defaults())
            .unwrap();

        assert_eq!(descriptor.max_redirections(), 0);
    }

    #[test]
    fn redirection_is_kept_for_uri_targets_when_allowed() {
        let selector = TargetSelector::ConnectionUri {
            uri: "http://server-a:5985/endpoint".into(),
        };
        let allowed = ConnectionDescriptorBuilder::new()
            .allow_redirection(5)
            .build(&selector, &defaults())
            .unwrap();
        let not_allowed = ConnectionDescriptorBuilder::new()
            .build(&selector, &defaults())
            .unwrap();

        assert_eq!(allowed.max_redirections(), 5);
        assert_eq!(not_allowed.max_redirections(), 0);
    }

    #[test]
    fn credential_and_thumbprint_together_are_rejected() {
        let err = ConnectionDescriptorBuilder::new()
            .credential(credential())
            .certificate_thumbprint("AB12CD")
            .build(&host("server-a"), &defaults())
            .unwrap_err();

        assert!(matches!(
            err,
            DescriptorError::InvalidAuthenticationCombination(_)
        ));
    }

    #[test]
    fn certificate_mechanism_rejects_password_credential() {
        let err = ConnectionDescriptorBuilder::new()
            .auth_mechanism(AuthMechanism::Certificate)
            .credential(credential())
            .build(&host("server-a"), &defaults())
            .unwrap_err();

        assert!(matches!(
            err,
            DescriptorError::InvalidAuthenticationCombination(_)
        ));
    }

    #[test]
    fn password_mechanism_rejects_thumbprint() {
        let err = ConnectionDescriptorBuilder::new()
            .auth_mechanism(AuthMechanism::Basic)
            .certificate_thumbprint("AB12CD")
            .build(&host("server-a"), &defaults())
            .unwrap_err();

        assert!(matches!(
            err,
            DescriptorError::InvalidAuthenticationCombination(_)
        ));
    }

    #[test]
    fn certificate_mechanism_requires_thumbprint() {
        let err = ConnectionDescriptorBuilder::new()
            .auth_mechanism(AuthMechanism::Certificate)
            .build(&host("server-a"), &defaults())
            .unwrap_err();

        assert!(matches!(
            err,
            DescriptorError::InvalidAuthenticationCombination(_)
        ));
    }

    #[test]
    fn thumbprint_with_default_mechanism_is_accepted() {
        let descriptor = ConnectionDescriptorBuilder::new()
            .certificate_thumbprint("AB12CD")
            .build(&host("server-a"), &defaults())
            .unwrap();

        assert_eq!(
            descriptor.credentials(),
            &Credentials::CertificateThumbprint {
                thumbprint: "AB12CD".into()
            }
        );
    }
}

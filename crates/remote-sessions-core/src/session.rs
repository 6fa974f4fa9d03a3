//! Session data model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::descriptor::ConnectionDescriptor;

/// Globally unique session instance identifier.
pub type SessionId = Uuid;

/// Session state as reported by its endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Session is being established.
    Connecting,
    /// Session is connected and usable.
    Opened,
    /// Transport link is closed but remote-side state is preserved.
    Disconnected,
    /// Session was closed cleanly.
    Closed,
    /// Session is in an unrecoverable error state.
    Broken,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Connecting => "connecting",
            Self::Opened => "opened",
            Self::Disconnected => "disconnected",
            Self::Closed => "closed",
            Self::Broken => "broken",
        };
        f.write_str(s)
    }
}

/// One remote or local session.
///
/// The instance id is globally unique; the name is only unique within the
/// connection scope it originated from. The descriptor records the connection
/// the session was reached through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Globally unique instance identifier.
    pub instance_id: SessionId,
    /// Human-assigned name, unique per originating connection scope.
    pub name: String,
    /// Current state.
    pub state: SessionState,
    /// Connection the session was reached through.
    pub connection: ConnectionDescriptor,
}

impl Session {
    /// Create a session with a fresh instance id.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        state: SessionState,
        connection: ConnectionDescriptor,
    ) -> Self {
        Self {
            instance_id: Uuid::new_v4(),
            name: name.into(),
            state,
            connection,
        }
    }

    /// Create a session with a known instance id, e.g. one reported by a
    /// remote endpoint.
    #[must_use]
    pub fn with_instance_id(
        instance_id: SessionId,
        name: impl Into<String>,
        state: SessionState,
        connection: ConnectionDescriptor,
    ) -> Self {
        Self {
            instance_id,
            name: name.into(),
            state,
            connection,
        }
    }
}

//! In-memory session repository.

use std::{collections::HashMap, sync::RwLock};

use async_trait::async_trait;
use remote_sessions_core::{
    FilterCriteria, RepositoryError, Session, SessionId, SessionRepository,
};

/// In-memory repository implementation.
///
/// Useful for single-process deployments. Contents are lost on restart.
pub struct MemoryRepository {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemoryRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of tracked sessions.
    ///
    /// # Errors
    /// Returns error if the internal lock is poisoned.
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self
            .sessions
            .read()
            .map_err(|e| RepositoryError::Internal(e.to_string()))?
            .len())
    }

    /// Whether the repository tracks no sessions.
    ///
    /// # Errors
    /// Returns error if the internal lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionRepository for MemoryRepository {
    async fn list_all(&self) -> Result<Vec<Session>, RepositoryError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;

        let mut result: Vec<Session> = sessions.values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn find_matching(
        &self,
        criteria: &FilterCriteria,
    ) -> Result<Vec<Session>, RepositoryError> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;

        let mut result: Vec<Session> = sessions
            .values()
            .filter(|s| criteria.matches(s))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn upsert(&self, session: Session) -> Result<(), RepositoryError> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| RepositoryError::Internal(e.to_string()))?;

        if sessions.insert(session.instance_id, session).is_some() {
            tracing::debug!("replaced existing session entry");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote_sessions_core::{
        ConnectionDescriptorBuilder, DiscoveryDefaults, SessionState, TargetSelector,
    };

    fn session(name: &str, state: SessionState) -> Session {
        let connection = ConnectionDescriptorBuilder::new()
            .build(
                &TargetSelector::ComputerName {
                    name: "server-a".into(),
                },
                &DiscoveryDefaults::default(),
            )
            .unwrap();
        Session::new(name, state, connection)
    }

    #[tokio::test]
    async fn list_all_returns_every_session() {
        let repo = MemoryRepository::new();
        repo.upsert(session("b", SessionState::Opened)).await.unwrap();
        repo.upsert(session("a", SessionState::Disconnected))
            .await
            .unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "a");
        assert_eq!(all[1].name, "b");
    }

    #[tokio::test]
    async fn find_matching_applies_criteria() {
        let repo = MemoryRepository::new();
        repo.upsert(session("build-1", SessionState::Disconnected))
            .await
            .unwrap();
        repo.upsert(session("deploy-1", SessionState::Disconnected))
            .await
            .unwrap();

        let criteria = FilterCriteria::new().with_name("build-*");
        let found = repo.find_matching(&criteria).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "build-1");
    }

    // Merge rule assumption: a remote result replaces the local entry with
    // the same instance id.
    #[tokio::test]
    async fn upsert_replaces_same_instance_id() {
        let repo = MemoryRepository::new();
        let original = session("agent", SessionState::Opened);
        let id = original.instance_id;
        repo.upsert(original.clone()).await.unwrap();

        let mut refreshed = original;
        refreshed.state = SessionState::Disconnected;
        repo.upsert(refreshed).await.unwrap();

        assert_eq!(repo.len().unwrap(), 1);
        let criteria = FilterCriteria::new().with_instance_id(id);
        let found = repo.find_matching(&criteria).await.unwrap();
        assert_eq!(found[0].state, SessionState::Disconnected);
    }
}

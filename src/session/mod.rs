//! The current-user session.
//!
//! One store holds at most one session; logging in replaces it.

use std::sync::Arc;

use crate::errors::AppError;
use crate::models::{SessionUser, User};
use crate::store::{keys, KeyValueStore};

#[derive(Debug, Clone)]
pub struct SessionState {
    store: Arc<dyn KeyValueStore>,
}

impl SessionState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Make `user` the current session, replacing any previous one.
    pub async fn login(&self, user: &User) -> Result<SessionUser, AppError> {
        let session = SessionUser::from(user);
        self.store
            .set(keys::CURRENT_USER, serde_json::to_value(&session)?)
            .await?;
        tracing::info!(user_id = %session.id, "Session started");
        Ok(session)
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.store.remove(keys::CURRENT_USER).await
    }

    pub async fn current(&self) -> Result<Option<SessionUser>, AppError> {
        match self.store.get(keys::CURRENT_USER).await? {
            Some(serde_json::Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    /// The current session, or `Unauthorized` when nobody is logged in.
    pub async fn require(&self) -> Result<SessionUser, AppError> {
        self.current()
            .await?
            .ok_or_else(|| AppError::Unauthorized("You need to be logged in".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Utc;

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@x.com", name.to_lowercase()),
            password: "Passw0rd".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_login_replaces_previous_session() {
        let session = SessionState::new(Arc::new(MemoryStore::new()));
        assert_eq!(session.current().await.unwrap(), None);

        session.login(&user("1", "Ana")).await.unwrap();
        session.login(&user("2", "Ben")).await.unwrap();

        let current = session.current().await.unwrap().unwrap();
        assert_eq!(current.id, "2");
        assert_eq!(current.email, "ben@x.com");
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let session = SessionState::new(Arc::new(MemoryStore::new()));
        session.login(&user("1", "Ana")).await.unwrap();
        session.logout().await.unwrap();

        assert_eq!(session.current().await.unwrap(), None);
        assert!(matches!(
            session.require().await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_session_omits_password() {
        let store = Arc::new(MemoryStore::new());
        let session = SessionState::new(store.clone());
        session.login(&user("1", "Ana")).await.unwrap();

        let raw = store.get(keys::CURRENT_USER).await.unwrap().unwrap();
        assert!(raw.get("password").is_none());
    }
}

//! Key-value persistence.
//!
//! Every table the application keeps (users, session, progress, leaderboard)
//! is a single JSON value under a well-known key. Read-modify-write cycles go
//! through [`update`], which holds the store's writer lock, so concurrent
//! updates on one store never lose each other's changes.

#[cfg(test)]
mod memory;
mod sqlite;

#[cfg(test)]
pub use memory::MemoryStore;
pub use sqlite::{init_database, SqliteStore};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::errors::AppError;

/// Well-known keys of the persisted state.
pub mod keys {
    pub const USERS: &str = "users";
    pub const CURRENT_USER: &str = "currentUser";
    pub const USER_PROGRESS: &str = "userProgress";
    pub const LEADERBOARD: &str = "leaderboard";
    pub const CONTACT_MESSAGES: &str = "contactMessages";
}

/// Persistent mapping from string keys to JSON values.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    /// Get a value by key. Returns `None` if the key is absent.
    async fn get(&self, key: &str) -> Result<Option<Value>, AppError>;

    /// Insert or replace the value under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<(), AppError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), AppError>;

    /// The single writer lock of this store.
    ///
    /// Hold it across every read-modify-write. It is not reentrant.
    fn writer(&self) -> &Mutex<()>;
}

/// Read and decode the value under `key`, falling back to `T::default()` when absent.
pub async fn read<T>(store: &dyn KeyValueStore, key: &str) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    match store.get(key).await? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(T::default()),
    }
}

/// Encode `value` and store it under `key`.
pub async fn write<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), AppError>
where
    T: Serialize + ?Sized,
{
    store.set(key, serde_json::to_value(value)?).await
}

/// Read the value under `key`, let `apply` change it, and write it back, all
/// under the writer lock. Nothing is written if `apply` fails.
pub async fn update<T, R, F>(store: &dyn KeyValueStore, key: &str, apply: F) -> Result<R, AppError>
where
    T: DeserializeOwned + Serialize + Default,
    F: FnOnce(&mut T) -> Result<R, AppError>,
{
    let _writer = store.writer().lock().await;

    let mut value: T = read(store, key).await?;
    let outcome = apply(&mut value)?;
    write(store, key, &value).await?;
    Ok(outcome)
}

/// Seed the tables that must always exist with empty containers.
pub async fn seed_defaults(store: &dyn KeyValueStore) -> Result<(), AppError> {
    let _writer = store.writer().lock().await;
    let defaults = [
        (keys::USERS, Value::Array(Vec::new())),
        (keys::USER_PROGRESS, Value::Object(Default::default())),
        (keys::LEADERBOARD, Value::Array(Vec::new())),
    ];

    for (key, empty) in defaults {
        if store.get(key).await?.is_none() {
            tracing::debug!("Seeding empty {}", key);
            store.set(key, empty).await?;
        }
    }

    Ok(())
}

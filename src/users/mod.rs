//! User directory over the `users` key.

use std::sync::Arc;

use chrono::Utc;
use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::models::User;
use crate::store::{self, keys, KeyValueStore};

/// Registration and lookup of user records.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    store: Arc<dyn KeyValueStore>,
}

impl UserDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// List all users in registration order.
    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        store::read(self.store.as_ref(), keys::USERS).await
    }

    /// Get a user by ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.list().await?.into_iter().find(|u| u.id == id))
    }

    /// Whether an account already uses this email.
    pub async fn email_taken(&self, email: &str) -> Result<bool, AppError> {
        let email = email.trim();
        Ok(self.list().await?.iter().any(|u| same_email(&u.email, email)))
    }

    /// Create a new user. Fails with `DuplicateEmail` if the address is taken.
    ///
    /// The duplicate check and the insert happen under the store's writer lock.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let email = email.trim();

        let user = store::update(self.store.as_ref(), keys::USERS, |users: &mut Vec<User>| {
            if users.iter().any(|u| same_email(&u.email, email)) {
                return Err(AppError::DuplicateEmail);
            }

            let now = Utc::now();
            let mut id = now.timestamp_millis();
            while users.iter().any(|u| u.id == id.to_string()) {
                id += 1;
            }

            let user = User {
                id: id.to_string(),
                name: name.trim().to_string(),
                email: email.to_string(),
                password: password.to_string(),
                created_at: now,
            };
            users.push(user.clone());
            Ok(user)
        })
        .await?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Find the user with this email and password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim();
        self.list()
            .await?
            .into_iter()
            .find(|u| same_email(&u.email, email) && passwords_match(&u.password, password))
            .ok_or(AppError::InvalidCredentials)
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Constant-time comparison of the stored plaintext password.
fn passwords_match(stored: &str, provided: &str) -> bool {
    stored.as_bytes().ct_eq(provided.as_bytes()).into()
}

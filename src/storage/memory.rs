//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::aliases::Alias;
use crate::users::User;

use super::CreateAliasValues;
use super::CreateUserValues;
use super::Error;
use super::Result;
use super::Storage;
use super::UpdateAliasValues;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
///
/// The aliases map is keyed by code and every operation runs under a single
/// lock acquisition, which is what makes the collision check and the counter
/// adjustment atomic per code
#[derive(Clone, Debug)]
pub struct Memory {
    /// All users in storage
    users: Arc<Mutex<HashMap<Uuid, User>>>,

    /// All aliases in storage, keyed by code
    aliases: Arc<Mutex<HashMap<String, Alias>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
            aliases: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl Storage for Memory {
    async fn find_single_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.email == email && user.deleted_at.is_none())
            .cloned())
    }

    async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        let mut users = self.users.lock().await;

        // emails are never reused, soft-deleted users count too
        if users.values().any(|user| user.email == values.email) {
            return Err(Error::Conflict(format!(
                "Email already exists: {}",
                values.email
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: values.email.to_string(),
            hashed_password: values.hashed_password.to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
            deleted_at: None,
        };

        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_all_aliases(&self, owner: Option<&str>) -> Result<Vec<Alias>> {
        Ok(self
            .aliases
            .lock()
            .await
            .values()
            .filter(|alias| alias.deleted_at.is_none())
            .filter(|alias| owner.is_none_or(|owner| alias.owner.as_deref() == Some(owner)))
            .cloned()
            .collect())
    }

    async fn find_single_alias_by_code(&self, code: &str) -> Result<Option<Alias>> {
        Ok(self
            .aliases
            .lock()
            .await
            .get(code)
            .filter(|alias| alias.deleted_at.is_none())
            .cloned())
    }

    async fn create_alias(&self, values: &CreateAliasValues<'_>) -> Result<Alias> {
        let mut aliases = self.aliases.lock().await;

        // codes are never reused, soft-deleted aliases count too
        if aliases.contains_key(values.code) {
            return Err(Error::Conflict(format!(
                "Code already exists: {}",
                values.code
            )));
        }

        let alias = Alias {
            id: Uuid::new_v4(),
            code: values.code.to_string(),
            target: values.target.to_string(),
            owner: values.owner.map(ToString::to_string),
            access_count: 0,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
            deleted_at: None,
        };

        aliases.insert(alias.code.clone(), alias.clone());

        Ok(alias)
    }

    async fn update_alias(
        &self,
        code: &str,
        values: &UpdateAliasValues<'_>,
    ) -> Result<Option<Alias>> {
        Ok(self
            .aliases
            .lock()
            .await
            .get_mut(code)
            .filter(|alias| alias.deleted_at.is_none())
            .map(|alias| {
                alias.target = values.target.to_string();
                alias.updated_at = Utc::now().naive_utc();

                alias.clone()
            }))
    }

    async fn delete_alias(&self, code: &str) -> Result<Option<Alias>> {
        Ok(self
            .aliases
            .lock()
            .await
            .get_mut(code)
            .filter(|alias| alias.deleted_at.is_none())
            .map(|alias| {
                // `updated_at` is left alone, `deleted_at` records the moment
                alias.deleted_at = Some(Utc::now().naive_utc());

                alias.clone()
            }))
    }

    async fn record_access(&self, code: &str) -> Result<Option<Alias>> {
        Ok(self
            .aliases
            .lock()
            .await
            .get_mut(code)
            .filter(|alias| alias.deleted_at.is_none())
            .map(|alias| {
                alias.access_count += 1;
                alias.updated_at = Utc::now().naive_utc();

                alias.clone()
            }))
    }
}

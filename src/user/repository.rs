use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::{UserId, UserProfile};
use crate::shared::AppError;

/// Read side of the account subsystem, as seen by the ranking service.
///
/// The ranking service only ever needs to resolve the caller's current
/// display profile; account creation and authentication live elsewhere.
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    async fn profile(&self, user_id: UserId) -> Result<Option<UserProfile>, AppError>;

    /// Registers or replaces a profile. Used by wiring and tests; in a
    /// deployment this data arrives from the account subsystem.
    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), AppError>;
}

/// In-memory implementation of UserProfileRepository for development and testing.
#[derive(Debug, Default)]
pub struct InMemoryUserProfileRepository {
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl InMemoryUserProfileRepository {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl UserProfileRepository for InMemoryUserProfileRepository {
    async fn profile(&self, user_id: UserId) -> Result<Option<UserProfile>, AppError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &UserProfile) -> Result<(), AppError> {
        debug!(user_id = profile.user_id, nickname = %profile.nickname, "Storing user profile");
        let mut profiles = self.profiles.write().await;
        profiles.insert(profile.user_id, profile.clone());
        Ok(())
    }
}

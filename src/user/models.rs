use serde::{Deserialize, Serialize};

/// Identifier handed out by the (external) account subsystem.
pub type UserId = u64;

/// Display profile for a user, resolved from the account subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: UserId,
    pub nickname: String,
    /// Avatar category tag rendered by the client (e.g. "CAT", "DOG").
    pub profile_image: String,
}

impl UserProfile {
    pub fn new(user_id: UserId, nickname: impl Into<String>, profile_image: impl Into<String>) -> Self {
        Self {
            user_id,
            nickname: nickname.into(),
            profile_image: profile_image.into(),
        }
    }
}

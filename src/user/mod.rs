pub mod models;
pub mod repository;

pub use models::{UserId, UserProfile};
pub use repository::{InMemoryUserProfileRepository, UserProfileRepository};

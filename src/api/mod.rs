//! G-Click API access.
//!
//! Authentication, the owners listing and the paginated task listing. The
//! pipeline talks to the API through the [`TaskSource`] trait so it can also
//! be driven by an in-memory source.

mod auth;
mod client;
mod error;
mod types;

pub use auth::{AccessToken, Session, TokenPolicy, TokenProvider};
pub use client::{GClickClient, PAGE_SIZE};
pub use error::{AuthError, FetchError};
pub use types::{Listing, OwnedTask, Task, TaskCategory, User};

use async_trait::async_trait;

/// Source of owners and their tasks.
#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Users who own tasks, deduplicated by id.
    async fn list_owners(&self) -> Result<Vec<User>, FetchError>;

    /// All tasks of one category assigned to one user.
    async fn list_tasks(
        &self,
        owner_id: i64,
        category: TaskCategory,
    ) -> Result<Vec<Task>, FetchError>;
}

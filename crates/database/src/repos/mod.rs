//! Store abstraction and its SQLite implementation

pub mod user_repository;

pub use user_repository::UserRepository;

use async_trait::async_trait;

use crate::entities::{NewUser, User, UserPatch};
use crate::types::StoreResult;

/// Data access for the `users` table.
///
/// Handlers hold this as `Arc<dyn UserStore>`; every failure comes back as a
/// [`StoreError`](crate::types::StoreError).
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user and return it with its assigned id.
    async fn create(&self, user: &NewUser) -> StoreResult<User>;

    /// Every user, ordered by id.
    async fn find_all(&self) -> StoreResult<Vec<User>>;

    async fn find_by_id(&self, id: i64) -> StoreResult<User>;

    async fn find_by_username(&self, username: &str) -> StoreResult<User>;

    /// Apply the non-blank fields of `patch`. Fails with `NotFound` when no
    /// row has this id.
    async fn update_by_id(&self, id: i64, patch: &UserPatch) -> StoreResult<User>;

    async fn update_by_username(&self, username: &str, patch: &UserPatch) -> StoreResult<User>;

    async fn delete_by_id(&self, id: i64) -> StoreResult<()>;

    /// Resolves the row first, so a missing user is reported before any delete runs.
    async fn delete_by_username(&self, username: &str) -> StoreResult<()>;

    /// Round-trip to the backend without touching any row.
    async fn ping(&self) -> StoreResult<()>;
}

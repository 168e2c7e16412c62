//! Port abstraction for user record persistence and its errors.
use async_trait::async_trait;

use crate::domain::{Role, Tier, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
    }
}

/// Storage for user records. Users are never deleted.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Store `user` unless a record with the same id exists.
    ///
    /// Returns `true` when the record was created.
    async fn insert_if_absent(&self, user: &User) -> Result<bool, UserPersistenceError>;

    /// All user records, ordered by email.
    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Overwrite only `tier` and `role` on an existing record.
    ///
    /// Returns `false` when no record matched `id`.
    async fn update_access(
        &self,
        id: &UserId,
        tier: Tier,
        role: Role,
    ) -> Result<bool, UserPersistenceError>;
}

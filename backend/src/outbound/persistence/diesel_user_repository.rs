//! PostgreSQL-backed `UserRepository` adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{AccountStatus, Email, Role, Tier, User, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserAccessUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

/// Rebuild a domain user, parsing role, tier and status leniently so an
/// unknown stored value grants the least access.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let id = UserId::new(&row.id).map_err(|err| {
        UserPersistenceError::query(format!("stored user id is invalid: {err}"))
    })?;
    let email = Email::new(&row.email).map_err(|err| {
        UserPersistenceError::query(format!("stored email for {id} is invalid: {err}"))
    })?;
    let role = Role::parse_lenient(&row.role);
    if role.as_str() != row.role {
        warn!(user_id = %id, stored = %row.role, "unrecognised stored role");
    }
    User::new(
        id,
        email,
        role,
        Tier::parse_lenient(&row.tier),
        AccountStatus::parse_lenient(&row.status),
        row.revenue,
    )
    .map_err(|err| UserPersistenceError::query(format!("stored user is invalid: {err}")))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn insert_if_absent(&self, user: &User) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: user.id().as_ref(),
            email: user.email().as_ref(),
            role: user.role().as_str(),
            tier: user.tier().as_str(),
            status: user.status().as_str(),
            revenue: user.revenue(),
        };
        let inserted = diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(inserted == 1)
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<UserRow> = users::table
            .order(users::email.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }

    async fn update_access(
        &self,
        id: &UserId,
        tier: Tier,
        role: Role,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.filter(users::id.eq(id.as_ref())))
            .set(&UserAccessUpdate {
                tier: tier.as_str(),
                role: role.as_str(),
            })
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(role: &str, tier: &str, revenue: f64) -> UserRow {
        UserRow {
            id: "uid-7".to_owned(),
            email: "Seven@Example.com".to_owned(),
            role: role.to_owned(),
            tier: tier.to_owned(),
            status: "active".to_owned(),
            revenue,
        }
    }

    #[rstest]
    fn unknown_role_and_tier_fall_back_to_least_access() {
        let user = row_to_user(row("superuser", "diamond", 0.0)).expect("user");
        assert_eq!(user.role(), Role::Customer);
        assert_eq!(user.tier(), Tier::Free);
        assert_eq!(user.email().as_ref(), "seven@example.com");
    }

    #[rstest]
    fn negative_revenue_is_a_query_error() {
        let err = row_to_user(row("admin", "gold", -1.0)).expect_err("invalid");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}

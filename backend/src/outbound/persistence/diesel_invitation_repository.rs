//! PostgreSQL-backed `InvitationRepository` adapter.

use async_trait::async_trait;
use diesel_async::RunQueryDsl;

use crate::domain::Invitation;
use crate::domain::ports::{InvitationRepository, InvitationRepositoryError};

use super::diesel_basic_error_mapping::{
    is_unique_violation, map_basic_diesel_error, map_basic_pool_error,
};
use super::models::NewInvitationRow;
use super::pool::{DbPool, PoolError};
use super::schema::invitations;

/// Diesel implementation of [`InvitationRepository`].
#[derive(Clone)]
pub struct DieselInvitationRepository {
    pool: DbPool,
}

impl DieselInvitationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> InvitationRepositoryError {
    map_basic_pool_error(error, InvitationRepositoryError::connection)
}

#[async_trait]
impl InvitationRepository for DieselInvitationRepository {
    async fn insert(&self, invitation: &Invitation) -> Result<(), InvitationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewInvitationRow {
            code: invitation.code.as_ref(),
            email: invitation.email.as_ref(),
            tier: invitation.tier.as_str(),
            coupon_code: invitation.coupon_code.as_deref(),
            discount_percentage: invitation.discount_percentage.map(i16::from),
            created_by: invitation.created_by.as_ref(),
            created_at: invitation.created_at,
        };
        diesel::insert_into(invitations::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    InvitationRepositoryError::duplicate_code(invitation.code.as_ref())
                } else {
                    map_basic_diesel_error(
                        err,
                        InvitationRepositoryError::query,
                        InvitationRepositoryError::connection,
                    )
                }
            })?;
        Ok(())
    }
}

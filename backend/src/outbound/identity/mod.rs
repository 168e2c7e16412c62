//! Identity provider outbound adapters.

mod dto;
mod firebase_provider;
mod fixture_provider;

pub use firebase_provider::{FirebaseConfig, FirebaseIdentityProvider};
pub use fixture_provider::{
    FIXTURE_ADMIN_EMAIL, FIXTURE_ADMIN_PASSWORD, FIXTURE_ADMIN_UID, FixtureIdentityProvider,
    fixture_admin_user,
};

//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// User records keyed by the identity provider's uid.
    users (id) {
        id -> Varchar,
        email -> Varchar,
        /// `customer`, `masseur` or `admin`.
        role -> Varchar,
        /// `free`, `silver`, `gold` or `platinum`.
        tier -> Varchar,
        status -> Varchar,
        revenue -> Float8,
        created_at -> Timestamptz,
        /// Maintained by the `users_touch_updated_at` trigger.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reviews, one per reviewer/reviewee pair.
    reviews (id) {
        /// Hex SHA-256 of the reviewer/reviewee pair.
        id -> Varchar,
        reviewer_id -> Varchar,
        reviewee_id -> Varchar,
        rating -> Int2,
        comment -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Marketplace listings.
    service_listings (id) {
        id -> Uuid,
        provider_id -> Varchar,
        service_type -> Varchar,
        description -> Text,
        rate -> Float8,
        location -> Varchar,
        instagram_url -> Nullable<Text>,
        image_url -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Admin-issued sign-up invitations.
    invitations (code) {
        code -> Varchar,
        email -> Varchar,
        tier -> Varchar,
        coupon_code -> Nullable<Varchar>,
        discount_percentage -> Nullable<Int2>,
        created_by -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(reviews -> users (reviewee_id));
diesel::joinable!(service_listings -> users (provider_id));

diesel::allow_tables_to_appear_in_same_query!(users, reviews, service_listings, invitations);

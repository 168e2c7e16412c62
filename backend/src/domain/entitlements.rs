//! Entitlement resolution: which features a tier and role unlock.
//!
//! [`resolve_access`] is the single source of truth for feature gating. Every
//! gated use-case calls [`FeatureSet::require`] instead of comparing tiers
//! itself.

use std::fmt;

use serde::Serialize;
use utoipa::ToSchema;

use super::{Error, Role, Tier};

/// A gated product feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Dashboard and demand heatmap.
    Dashboard,
    /// AI pricing and itinerary planner.
    Planner,
    /// Multi-city road trip planner.
    RoadTrip,
    /// Provider-to-provider lodging listings.
    Masseurbnb,
    /// Safety check-ins while travelling.
    Safety,
    /// Revenue tracking.
    Revenue,
    /// Client book.
    Clients,
    /// Provider community board.
    Community,
    /// Admin panel.
    Admin,
}

impl Feature {
    /// Every feature, in display order.
    pub const ALL: [Self; 9] = [
        Self::Dashboard,
        Self::Planner,
        Self::RoadTrip,
        Self::Masseurbnb,
        Self::Safety,
        Self::Revenue,
        Self::Clients,
        Self::Community,
        Self::Admin,
    ];

    /// Wire name of the feature flag.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Planner => "planner",
            Self::RoadTrip => "roadTrip",
            Self::Masseurbnb => "masseurbnb",
            Self::Safety => "safety",
            Self::Revenue => "revenue",
            Self::Clients => "clients",
            Self::Community => "community",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved feature flags for one tier/role pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub dashboard: bool,
    pub planner: bool,
    pub road_trip: bool,
    pub masseurbnb: bool,
    pub safety: bool,
    pub revenue: bool,
    pub clients: bool,
    pub community: bool,
    pub admin: bool,
}

impl FeatureSet {
    /// Whether `feature` is granted.
    pub const fn allows(&self, feature: Feature) -> bool {
        match feature {
            Feature::Dashboard => self.dashboard,
            Feature::Planner => self.planner,
            Feature::RoadTrip => self.road_trip,
            Feature::Masseurbnb => self.masseurbnb,
            Feature::Safety => self.safety,
            Feature::Revenue => self.revenue,
            Feature::Clients => self.clients,
            Feature::Community => self.community,
            Feature::Admin => self.admin,
        }
    }

    /// Fail with `forbidden` unless `feature` is granted.
    ///
    /// # Examples
    /// ```
    /// use masseurpro::domain::{resolve_access, ErrorCode, Feature, Role, Tier};
    ///
    /// let features = resolve_access(Tier::Silver, Role::Customer);
    /// assert!(features.require(Feature::Safety).is_ok());
    /// let err = features.require(Feature::Planner).unwrap_err();
    /// assert_eq!(err.code(), ErrorCode::Forbidden);
    /// ```
    pub fn require(&self, feature: Feature) -> Result<(), Error> {
        if self.allows(feature) {
            Ok(())
        } else {
            Err(Error::forbidden("Access Denied")
                .with_details(serde_json::json!({ "feature": feature.as_str() })))
        }
    }

    /// Names of granted features, in display order.
    pub fn granted(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|feature| self.allows(*feature))
            .collect()
    }
}

/// Map a tier and role to the features they unlock.
///
/// Admins are treated as platinum and additionally receive the admin panel.
/// The function is total: unknown stored values never reach it because
/// parsing at the store boundary falls back to `free` and `customer`.
pub const fn resolve_access(tier: Tier, role: Role) -> FeatureSet {
    let is_admin = matches!(role, Role::Admin);
    let tier = if is_admin { Tier::Platinum } else { tier };
    let silver_up = !matches!(tier, Tier::Free);
    let gold_up = matches!(tier, Tier::Gold | Tier::Platinum);
    let platinum = matches!(tier, Tier::Platinum);

    FeatureSet {
        dashboard: true,
        planner: gold_up,
        road_trip: platinum,
        masseurbnb: platinum,
        safety: silver_up,
        revenue: platinum,
        clients: platinum,
        community: platinum,
        admin: is_admin,
    }
}

#[cfg(test)]
mod tests {
    //! The full tier/role matrix is covered by `tests/entitlements_bdd.rs`;
    //! these cases pin the boundaries.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Tier::Free, &[Feature::Dashboard])]
    #[case(Tier::Silver, &[Feature::Dashboard, Feature::Safety])]
    #[case(Tier::Gold, &[Feature::Dashboard, Feature::Planner, Feature::Safety])]
    #[case(
        Tier::Platinum,
        &[
            Feature::Dashboard,
            Feature::Planner,
            Feature::RoadTrip,
            Feature::Masseurbnb,
            Feature::Safety,
            Feature::Revenue,
            Feature::Clients,
            Feature::Community,
        ]
    )]
    fn customers_get_tier_features(#[case] tier: Tier, #[case] expected: &[Feature]) {
        assert_eq!(resolve_access(tier, Role::Customer).granted(), expected);
    }

    #[rstest]
    #[case(Tier::Free)]
    #[case(Tier::Gold)]
    fn providers_match_customers(#[case] tier: Tier) {
        assert_eq!(
            resolve_access(tier, Role::Provider),
            resolve_access(tier, Role::Customer)
        );
    }

    #[rstest]
    #[case(Tier::Free)]
    #[case(Tier::Silver)]
    #[case(Tier::Gold)]
    #[case(Tier::Platinum)]
    fn admins_get_everything_regardless_of_tier(#[case] tier: Tier) {
        assert_eq!(resolve_access(tier, Role::Admin).granted(), Feature::ALL);
    }

    #[rstest]
    fn platinum_customer_is_not_admin() {
        let features = resolve_access(Tier::Platinum, Role::Customer);
        for feature in [
            Feature::Revenue,
            Feature::Clients,
            Feature::Community,
            Feature::RoadTrip,
            Feature::Masseurbnb,
        ] {
            assert!(features.allows(feature), "{feature} should be granted");
        }
        assert!(!features.allows(Feature::Admin));
    }

    #[rstest]
    fn require_reports_denied_feature() {
        let err = resolve_access(Tier::Gold, Role::Customer)
            .require(Feature::RoadTrip)
            .expect_err("road trip is platinum only");
        assert_eq!(err.message(), "Access Denied");
        assert_eq!(
            err.details().and_then(|d| d.get("feature")).and_then(|v| v.as_str()),
            Some("roadTrip")
        );
    }

    #[rstest]
    fn serialises_camel_case_flags() {
        let value = serde_json::to_value(resolve_access(Tier::Free, Role::Customer)).expect("json");
        assert_eq!(value["roadTrip"], false);
        assert_eq!(value["dashboard"], true);
    }
}

//! Users and their roles.

use candid::{CandidType, Deserialize, Principal};
use serde::Serialize;

use crate::enums::text_variants;

/// Role a registered user plays in the supply chain.
#[derive(CandidType, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UserRole {
    Manufacturer,
    LogisticsProvider,
    Retailer,
    QualityAssurance,
    SupplyChainManager,
    Admin,
    Consumer,
}

text_variants!(UserRole, "user role", {
    Manufacturer => "manufacturer",
    LogisticsProvider => "logistics_provider",
    Retailer => "retailer",
    QualityAssurance => "quality_assurance",
    SupplyChainManager => "supply_chain_manager",
    Admin => "admin",
    Consumer => "consumer",
});

/// Capabilities the canister derived from a user's role.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserPermissions {
    pub can_register_products: bool,
    pub can_update_supply_chain: bool,
    pub can_manage_partners: bool,
    pub can_view_analytics: bool,
    pub can_verify_users: bool,
}

/// A registered user, keyed by the principal that registered.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug)]
pub struct User {
    pub id: Principal,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub role: UserRole,
    /// Nanoseconds since the Unix epoch.
    pub created_at: u64,
    pub is_verified: bool,
    pub permissions: UserPermissions,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payload of `register_user`.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug)]
pub struct UserRegistration {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_both_spellings() {
        assert_eq!(
            "supply_chain_manager".parse::<UserRole>().unwrap(),
            UserRole::SupplyChainManager
        );
        assert_eq!(
            "SupplyChainManager".parse::<UserRole>().unwrap(),
            UserRole::SupplyChainManager
        );
        assert_eq!(
            "logistics-provider".parse::<UserRole>().unwrap(),
            UserRole::LogisticsProvider
        );
    }

    #[test]
    fn test_role_rejects_unknown() {
        let err = "janitor".parse::<UserRole>().unwrap_err();
        assert_eq!(err.kind, "user role");
        assert!(err.to_string().contains("quality_assurance"));
    }

    #[test]
    fn test_role_display_round_trips_all() {
        for role in UserRole::ALL {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), *role);
        }
    }
}

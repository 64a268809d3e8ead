//! Canister operations, grouped by domain.
//!
//! Each file adds methods to [`RemoteServiceProxy`](crate::RemoteServiceProxy).
//! Method names match the canister's Candid interface one to one.

mod events;
mod partners;
mod products;
mod system;
mod users;

/// Canister method names.
pub mod methods {
    pub const REGISTER_USER: &str = "register_user";
    pub const GET_USER: &str = "get_user";
    pub const UPDATE_USER_VERIFICATION: &str = "update_user_verification";
    pub const REGISTER_PRODUCT: &str = "register_product";
    pub const GET_PRODUCT: &str = "get_product";
    pub const SEARCH_PRODUCTS: &str = "search_products";
    pub const ADD_SUPPLY_CHAIN_EVENT: &str = "add_supply_chain_event";
    pub const GET_SUPPLY_CHAIN_EVENTS: &str = "get_supply_chain_events";
    pub const REGISTER_PARTNER: &str = "register_partner";
    pub const GET_PARTNERS: &str = "get_partners";
    pub const GET_ANALYTICS: &str = "get_analytics";
    pub const GET_CANISTER_STATUS: &str = "get_canister_status";
}

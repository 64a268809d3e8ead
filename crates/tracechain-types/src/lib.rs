//! Candid schema of the TraceChain supply-chain canister.
//!
//! These types mirror the canister's `service.did` field for field and
//! variant for variant. They must stay byte-compatible with the deployed
//! interface. Field order is irrelevant on the wire; field names and types
//! are not.
//!
//! Every fallible canister method replies with `variant { Ok: T; Err: text }`,
//! which Candid maps onto [`std::result::Result<T, String>`]; see
//! [`RemoteResult`].

mod enums;
pub mod partner;
pub mod product;
pub mod supply_chain;
pub mod system;
pub mod user;

pub use enums::ParseVariantError;
pub use partner::{Partner, PartnerRegistration, PartnerType};
pub use product::{Product, ProductRegistration, ProductSearchQuery, ProductStatus, ProductWithHistory};
pub use supply_chain::{EventStatus, SupplyChainEvent, SupplyChainEventInput, SupplyChainStage};
pub use system::{AnalyticsData, CanisterStatus};
pub use user::{User, UserPermissions, UserRegistration, UserRole};

pub use candid::Principal;

/// The `variant { Ok: T; Err: text }` envelope returned by fallible methods.
///
/// `Err` carries the canister's business-level rejection reason.
pub type RemoteResult<T> = std::result::Result<T, String>;

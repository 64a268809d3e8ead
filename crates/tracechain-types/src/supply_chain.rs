//! Supply-chain events recorded against a product.

use std::collections::BTreeMap;

use candid::{CandidType, Deserialize, Principal};
use serde::Serialize;

use crate::enums::text_variants;

/// Stage of the journey an event belongs to.
#[derive(CandidType, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SupplyChainStage {
    RawMaterialSourcing,
    Manufacturing,
    QualityControl,
    Packaging,
    Shipping,
    Distribution,
    Retail,
}

text_variants!(SupplyChainStage, "supply chain stage", {
    RawMaterialSourcing => "raw_material_sourcing",
    Manufacturing => "manufacturing",
    QualityControl => "quality_control",
    Packaging => "packaging",
    Shipping => "shipping",
    Distribution => "distribution",
    Retail => "retail",
});

/// Progress of a single event.
#[derive(CandidType, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

text_variants!(EventStatus, "event status", {
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
    Failed => "failed",
});

/// An event as recorded by the canister.
///
/// `metadata` travels as `vec record { text; text }`.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug)]
pub struct SupplyChainEvent {
    pub id: String,
    pub product_id: String,
    pub stage: SupplyChainStage,
    pub location: String,
    pub timestamp: u64,
    pub actor: String,
    pub actor_id: Principal,
    pub status: EventStatus,
    pub details: String,
    pub certifications: Vec<String>,
    pub estimated_arrival: Option<u64>,
    pub metadata: BTreeMap<String, String>,
}

/// Payload of `add_supply_chain_event`.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug)]
pub struct SupplyChainEventInput {
    pub product_id: String,
    pub stage: SupplyChainStage,
    pub location: String,
    pub status: EventStatus,
    pub details: String,
    pub certifications: Vec<String>,
    pub estimated_arrival: Option<u64>,
    pub metadata: BTreeMap<String, String>,
}

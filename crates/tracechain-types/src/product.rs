//! Products and product search.

use candid::{CandidType, Deserialize, Principal};
use serde::Serialize;

use crate::enums::text_variants;
use crate::supply_chain::SupplyChainEvent;

/// Where a product currently is in its lifecycle.
#[derive(CandidType, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductStatus {
    Manufacturing,
    InTransit,
    Delivered,
    Recalled,
}

text_variants!(ProductStatus, "product status", {
    Manufacturing => "manufacturing",
    InTransit => "in_transit",
    Delivered => "delivered",
    Recalled => "recalled",
});

/// A product as stored by the canister.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug)]
pub struct Product {
    /// Canister-assigned tracking id, e.g. `CT-2024-001234`.
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub manufacturer: String,
    pub manufacturer_id: Principal,
    pub batch_number: Option<String>,
    pub production_date: u64,
    pub raw_materials: Vec<String>,
    pub certifications: Vec<String>,
    pub sustainability_score: Option<f64>,
    pub estimated_value: Option<f64>,
    pub current_status: ProductStatus,
    pub current_location: String,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Payload of `register_product`.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug)]
pub struct ProductRegistration {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub batch_number: Option<String>,
    pub production_date: u64,
    pub manufacturing_location: String,
    pub raw_materials: Vec<String>,
    pub certifications: Vec<String>,
    pub sustainability_score: Option<f64>,
    pub estimated_value: Option<f64>,
}

/// Reply of `get_product`: the product plus its recorded journey.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug)]
pub struct ProductWithHistory {
    pub product: Product,
    pub supply_chain_events: Vec<SupplyChainEvent>,
    pub ethical_score: f64,
}

/// Filter for `search_products`. Unset fields match everything.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default)]
pub struct ProductSearchQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub status: Option<ProductStatus>,
    pub limit: Option<u32>,
}

impl ProductSearchQuery {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ProductStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

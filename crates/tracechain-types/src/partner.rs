//! Supply-chain partners.

use candid::{CandidType, Deserialize, Principal};
use serde::Serialize;

use crate::enums::text_variants;

#[derive(CandidType, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartnerType {
    Manufacturer,
    Supplier,
    LogisticsProvider,
    Distributor,
    Retailer,
    CertificationBody,
}

text_variants!(PartnerType, "partner type", {
    Manufacturer => "manufacturer",
    Supplier => "supplier",
    LogisticsProvider => "logistics_provider",
    Distributor => "distributor",
    Retailer => "retailer",
    CertificationBody => "certification_body",
});

#[derive(CandidType, Serialize, Deserialize, Clone, Debug)]
pub struct Partner {
    pub id: Principal,
    pub company_name: String,
    pub partner_type: PartnerType,
    pub contact_email: String,
    pub contact_person: String,
    pub certifications: Vec<String>,
    pub verified: bool,
    pub created_at: u64,
    pub reputation_score: u32,
}

/// Payload of `register_partner`.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug)]
pub struct PartnerRegistration {
    pub company_name: String,
    pub partner_type: PartnerType,
    pub contact_email: String,
    pub contact_person: String,
    pub certifications: Vec<String>,
}

//! Canister-wide statistics.

use candid::{CandidType, Deserialize};
use serde::Serialize;

/// Reply of `get_analytics`.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AnalyticsData {
    pub total_products: u64,
    pub active_shipments: u64,
    pub completed_deliveries: u64,
    pub average_ethical_score: f64,
    pub total_partners: u64,
    pub total_users: u64,
}

/// Reply of `get_canister_status`.
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct CanisterStatus {
    pub version: String,
    pub total_products: u64,
    pub total_users: u64,
    pub total_events: u64,
    /// Nanoseconds since the canister was installed.
    pub uptime: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RemoteResult;

    #[test]
    fn test_status_accepts_newer_canister_fields() {
        // A newer canister may add fields; records decode by field name.
        #[derive(CandidType)]
        struct NewerStatus {
            version: String,
            total_products: u64,
            total_users: u64,
            total_events: u64,
            uptime: u64,
            cycles: u64,
        }
        let bytes = candid::encode_one(NewerStatus {
            version: "1.1.0".to_string(),
            total_products: 3,
            total_users: 2,
            total_events: 9,
            uptime: 42,
            cycles: 1_000_000,
        })
        .unwrap();

        let status: CanisterStatus = candid::decode_one(&bytes).unwrap();
        assert_eq!(status.version, "1.1.0");
        assert_eq!(status.total_events, 9);
    }

    #[test]
    fn test_err_envelope_decodes_as_rejection() {
        let bytes =
            candid::encode_one(RemoteResult::<String>::Err("validation failed".into())).unwrap();
        let decoded: RemoteResult<String> = candid::decode_one(&bytes).unwrap();
        assert_eq!(decoded, Err("validation failed".to_string()));
    }

    #[test]
    fn test_mismatched_reply_fails_to_decode() {
        let bytes = candid::encode_one("not a status").unwrap();
        assert!(candid::decode_one::<CanisterStatus>(&bytes).is_err());
    }

    #[test]
    fn test_analytics_serializes_to_json() {
        let analytics = AnalyticsData {
            total_products: 10,
            average_ethical_score: 87.5,
            ..Default::default()
        };
        let json = serde_json::to_value(&analytics).unwrap();
        assert_eq!(json["total_products"], 10);
        assert_eq!(json["average_ethical_score"], 87.5);
    }
}

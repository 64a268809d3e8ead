//! Analytics and canister status.

use tracechain_types::{AnalyticsData, CanisterStatus};

use super::methods;
use crate::error::Result;
use crate::proxy::RemoteServiceProxy;
use crate::transport::CallKind;

impl RemoteServiceProxy {
    pub async fn get_analytics(&self) -> Result<AnalyticsData> {
        self.call(CallKind::Query, methods::GET_ANALYTICS, ())
            .await
    }

    pub async fn get_canister_status(&self) -> Result<CanisterStatus> {
        self.call(CallKind::Query, methods::GET_CANISTER_STATUS, ())
            .await
    }

    /// Simple connectivity check - returns true if the canister answers.
    pub async fn test_connection(&self) -> bool {
        match self.get_canister_status().await {
            Ok(status) => {
                tracing::info!(
                    version = %status.version,
                    products = status.total_products,
                    users = status.total_users,
                    events = status.total_events,
                    uptime = status.uptime,
                    "Canister reachable"
                );
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Canister connection test failed");
                false
            }
        }
    }
}

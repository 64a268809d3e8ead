//! Supply-chain event operations.

use tracechain_types::{SupplyChainEvent, SupplyChainEventInput};

use super::methods;
use crate::error::Result;
use crate::proxy::RemoteServiceProxy;
use crate::transport::CallKind;

impl RemoteServiceProxy {
    /// Record an event against a product. Returns the new event id.
    pub async fn add_supply_chain_event(&self, event: SupplyChainEventInput) -> Result<String> {
        self.call_result(CallKind::Update, methods::ADD_SUPPLY_CHAIN_EVENT, (event,))
            .await
    }

    pub async fn get_supply_chain_events(&self, product_id: &str) -> Result<Vec<SupplyChainEvent>> {
        self.call_result(
            CallKind::Query,
            methods::GET_SUPPLY_CHAIN_EVENTS,
            (product_id,),
        )
        .await
    }
}

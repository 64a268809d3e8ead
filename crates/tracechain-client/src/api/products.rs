//! Product operations.

use tracechain_types::{Product, ProductRegistration, ProductSearchQuery, ProductWithHistory};

use super::methods;
use crate::error::Result;
use crate::proxy::RemoteServiceProxy;
use crate::transport::CallKind;

impl RemoteServiceProxy {
    /// Register a product. Returns the id the canister assigned.
    pub async fn register_product(&self, registration: ProductRegistration) -> Result<String> {
        self.call_result(CallKind::Update, methods::REGISTER_PRODUCT, (registration,))
            .await
    }

    /// A product with its supply-chain history and ethical score.
    pub async fn get_product(&self, product_id: &str) -> Result<ProductWithHistory> {
        self.call_result(CallKind::Query, methods::GET_PRODUCT, (product_id,))
            .await
    }

    /// Products matching every set field of `query`.
    pub async fn search_products(&self, query: ProductSearchQuery) -> Result<Vec<Product>> {
        self.call(CallKind::Query, methods::SEARCH_PRODUCTS, (query,))
            .await
    }
}

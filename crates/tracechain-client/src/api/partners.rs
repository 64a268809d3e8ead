//! Partner operations.

use tracechain_types::{Partner, PartnerRegistration};

use super::methods;
use crate::error::Result;
use crate::proxy::RemoteServiceProxy;
use crate::transport::CallKind;

impl RemoteServiceProxy {
    /// Register the calling principal as a partner.
    pub async fn register_partner(&self, registration: PartnerRegistration) -> Result<()> {
        self.call_result(CallKind::Update, methods::REGISTER_PARTNER, (registration,))
            .await
    }

    pub async fn get_partners(&self) -> Result<Vec<Partner>> {
        self.call(CallKind::Query, methods::GET_PARTNERS, ())
            .await
    }
}

//! User operations.

use candid::Principal;
use tracechain_types::{User, UserRegistration};

use super::methods;
use crate::error::Result;
use crate::proxy::RemoteServiceProxy;
use crate::transport::CallKind;

impl RemoteServiceProxy {
    /// Register the calling principal as a user.
    pub async fn register_user(&self, registration: UserRegistration) -> Result<User> {
        self.call_result(CallKind::Update, methods::REGISTER_USER, (registration,))
            .await
    }

    /// The calling principal's user record.
    pub async fn get_user(&self) -> Result<User> {
        self.call_result(CallKind::Query, methods::GET_USER, ())
            .await
    }

    /// Grant or revoke verification for a user. Requires the caller to be
    /// allowed to verify users.
    pub async fn update_user_verification(&self, user: Principal, verified: bool) -> Result<()> {
        self.call_result(
            CallKind::Update,
            methods::UPDATE_USER_VERIFICATION,
            (user, verified),
        )
        .await
    }
}

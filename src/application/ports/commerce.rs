use async_trait::async_trait;

use crate::{
    app_error::AppResult,
    domain::entities::subscription_contract::SubscriptionContract,
};

/// Port for the commerce platform's Customer Account API — the authoritative
/// system for subscription status and billing.
///
/// Every call acts on behalf of the logged-in customer and therefore takes
/// their access token. GraphQL `userErrors` surface as `InvalidInput` with
/// the platform's own user-facing message; transport failures surface as
/// `Upstream`.
#[async_trait]
pub trait CommerceSubscriptionsPort: Send + Sync {
    async fn get_contract(
        &self,
        access_token: &str,
        contract_gid: &str,
    ) -> AppResult<SubscriptionContract>;

    async fn pause_contract(&self, access_token: &str, contract_gid: &str) -> AppResult<()>;

    /// "Resume" in this service's vocabulary; the platform mutation is
    /// called "activate".
    async fn resume_contract(&self, access_token: &str, contract_gid: &str) -> AppResult<()>;

    async fn cancel_contract(&self, access_token: &str, contract_gid: &str) -> AppResult<()>;
}

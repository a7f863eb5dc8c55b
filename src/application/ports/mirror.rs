use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    app_error::AppResult,
    domain::entities::subscription_contract::IntervalUnit,
};

/// The next scheduled order on a mirror subscription, used by skip-delivery.
#[derive(Debug, Clone)]
pub struct UpcomingOrder {
    pub id: i64,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// A stored card as the mirror system reports it. Expiry year may be 2- or
/// 4-digit; normalization happens in the domain layer.
#[derive(Debug, Clone)]
pub struct MirrorPaymentMethod {
    pub id: i64,
    pub brand: String,
    pub last_digits: String,
    pub expiry_month: u32,
    pub expiry_year: i32,
}

/// Port for the subscription manager (Loop) — the best-effort operational
/// mirror. It also owns the operations the commerce platform's API cannot
/// perform: skip-next-delivery, frequency changes, and payment-method
/// update emails.
///
/// All subscription arguments are mirror IDs (`shopify-<n>` or bare Loop
/// IDs), already translated by the caller.
#[async_trait]
pub trait SubscriptionMirrorPort: Send + Sync {
    async fn pause(&self, mirror_id: &str) -> AppResult<()>;

    async fn resume(&self, mirror_id: &str) -> AppResult<()>;

    async fn cancel(
        &self,
        mirror_id: &str,
        reason: Option<&str>,
        comment: Option<&str>,
    ) -> AppResult<()>;

    /// Next scheduled/upcoming order for the subscription, if any.
    async fn get_upcoming_order(&self, mirror_id: &str) -> AppResult<Option<UpcomingOrder>>;

    /// Skip one concrete order (preferred skip path).
    async fn skip_order(&self, order_id: i64) -> AppResult<()>;

    /// Subscription-level skip, used when no upcoming order can be resolved.
    async fn skip_next(&self, mirror_id: &str) -> AppResult<()>;

    async fn change_frequency(
        &self,
        mirror_id: &str,
        unit: IntervalUnit,
        count: u32,
    ) -> AppResult<()>;

    /// Cards on file for a customer, keyed by the commerce platform's
    /// numeric customer ID.
    async fn list_payment_methods(&self, customer_id: &str)
    -> AppResult<Vec<MirrorPaymentMethod>>;

    /// Triggers an email with a secure self-service update link. Does not
    /// mutate the payment method.
    async fn send_payment_method_email(&self, payment_method_id: i64) -> AppResult<()>;
}

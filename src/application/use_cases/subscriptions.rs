//! Subscription command routing across the two backing systems.
//!
//! Shopify's Customer Account API is authoritative for subscription state;
//! Loop mirrors it for operations Shopify cannot perform. Dual-system writes
//! go to Shopify first, then to Loop best-effort: a mirror failure is logged
//! and reported in the diagnostic details but never changes the
//! caller-visible outcome. There is no rollback; a half-applied write heals
//! on the next successful mirror write for that subscription.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::{
        commerce::CommerceSubscriptionsPort,
        mirror::SubscriptionMirrorPort,
    },
    domain::entities::{
        contract_id::{to_commerce_gid, to_mirror_id},
        payment_method::PaymentMethod,
        subscription_contract::{Plan, SubscriptionContract},
    },
};

// ============================================================================
// Outcome types
// ============================================================================

/// One backing system's result, exposed for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct SystemOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SystemOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DualWriteDetails {
    pub shopify: SystemOutcome,
    #[serde(rename = "loop")]
    pub mirror: SystemOutcome,
}

/// Result of a dual-system command. `success` tracks the authoritative
/// system alone.
#[derive(Debug, Clone, Serialize)]
pub struct CommandOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub details: DualWriteDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DualAction {
    Pause,
    Resume,
    Cancel,
}

impl DualAction {
    fn as_str(&self) -> &'static str {
        match self {
            DualAction::Pause => "pause",
            DualAction::Resume => "resume",
            DualAction::Cancel => "cancel",
        }
    }
}

// ============================================================================
// Use cases
// ============================================================================

pub struct SubscriptionUseCases {
    commerce: Arc<dyn CommerceSubscriptionsPort>,
    /// Absent when no Loop API key is configured; dual writes then skip the
    /// mirror leg and mirror-only operations fail with a config error.
    mirror: Option<Arc<dyn SubscriptionMirrorPort>>,
}

impl SubscriptionUseCases {
    pub fn new(
        commerce: Arc<dyn CommerceSubscriptionsPort>,
        mirror: Option<Arc<dyn SubscriptionMirrorPort>>,
    ) -> Self {
        Self { commerce, mirror }
    }

    fn require_mirror(&self) -> AppResult<&Arc<dyn SubscriptionMirrorPort>> {
        self.mirror
            .as_ref()
            .ok_or_else(|| AppError::Config("Loop API key is not configured".into()))
    }

    /// Normalized contract read from the authoritative system.
    pub async fn get_contract(
        &self,
        access_token: &str,
        subscription_id: &str,
    ) -> AppResult<SubscriptionContract> {
        let gid = to_commerce_gid(subscription_id);
        self.commerce.get_contract(access_token, &gid).await
    }

    pub async fn pause(&self, access_token: &str, subscription_id: &str) -> CommandOutcome {
        self.dual_write(access_token, subscription_id, DualAction::Pause, None, None)
            .await
    }

    pub async fn resume(&self, access_token: &str, subscription_id: &str) -> CommandOutcome {
        self.dual_write(access_token, subscription_id, DualAction::Resume, None, None)
            .await
    }

    pub async fn cancel(
        &self,
        access_token: &str,
        subscription_id: &str,
        reason: Option<String>,
        comment: Option<String>,
    ) -> CommandOutcome {
        self.dual_write(
            access_token,
            subscription_id,
            DualAction::Cancel,
            reason,
            comment,
        )
        .await
    }

    /// The two-system write protocol: authoritative write first, mirror
    /// second and best-effort, issued sequentially so the authoritative
    /// result is known before committing to the best-effort leg.
    async fn dual_write(
        &self,
        access_token: &str,
        subscription_id: &str,
        action: DualAction,
        reason: Option<String>,
        comment: Option<String>,
    ) -> CommandOutcome {
        let gid = to_commerce_gid(subscription_id);
        let mirror_id = to_mirror_id(subscription_id);

        let shopify = match self.commerce_write(access_token, &gid, action).await {
            Ok(()) => SystemOutcome::ok(),
            Err(e) => {
                tracing::error!(
                    subscription = %gid,
                    action = action.as_str(),
                    error = %e,
                    "Authoritative subscription write failed"
                );
                SystemOutcome::failed(safe_message(&e))
            }
        };

        // Mirror write happens regardless of the authoritative outcome so a
        // transient Shopify failure does not leave Loop further behind.
        let mirror = match &self.mirror {
            Some(mirror) => {
                match self
                    .mirror_write(mirror, &mirror_id, action, reason.as_deref(), comment.as_deref())
                    .await
                {
                    Ok(()) => SystemOutcome::ok(),
                    Err(e) => {
                        tracing::warn!(
                            subscription = %mirror_id,
                            action = action.as_str(),
                            error = %e,
                            "Best-effort mirror write failed"
                        );
                        SystemOutcome::failed(safe_message(&e))
                    }
                }
            }
            None => {
                tracing::debug!(
                    subscription = %mirror_id,
                    action = action.as_str(),
                    "Mirror not configured, skipping mirror write"
                );
                SystemOutcome::failed("mirror not configured")
            }
        };

        let success = shopify.success;
        let message = if success {
            None
        } else {
            shopify.error.clone()
        };

        CommandOutcome {
            success,
            message,
            details: DualWriteDetails { shopify, mirror },
        }
    }

    async fn commerce_write(
        &self,
        access_token: &str,
        gid: &str,
        action: DualAction,
    ) -> AppResult<()> {
        match action {
            DualAction::Pause => self.commerce.pause_contract(access_token, gid).await,
            DualAction::Resume => self.commerce.resume_contract(access_token, gid).await,
            DualAction::Cancel => self.commerce.cancel_contract(access_token, gid).await,
        }
    }

    async fn mirror_write(
        &self,
        mirror: &Arc<dyn SubscriptionMirrorPort>,
        mirror_id: &str,
        action: DualAction,
        reason: Option<&str>,
        comment: Option<&str>,
    ) -> AppResult<()> {
        match action {
            DualAction::Pause => mirror.pause(mirror_id).await,
            DualAction::Resume => mirror.resume(mirror_id).await,
            DualAction::Cancel => mirror.cancel(mirror_id, reason, comment).await,
        }
    }

    // ========================================================================
    // Mirror-only operations
    // ========================================================================

    /// Skips the next delivery. Prefers skipping the concrete upcoming
    /// order; falls back to the subscription-level skip when the order
    /// schedule cannot be resolved.
    pub async fn skip_next_delivery(&self, subscription_id: &str) -> AppResult<()> {
        let mirror = self.require_mirror()?;
        let mirror_id = to_mirror_id(subscription_id);

        match mirror.get_upcoming_order(&mirror_id).await {
            Ok(Some(order)) => match mirror.skip_order(order.id).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        subscription = %mirror_id,
                        order_id = order.id,
                        error = %e,
                        "Order-level skip failed, falling back to subscription-level skip"
                    );
                }
            },
            Ok(None) => {
                tracing::debug!(
                    subscription = %mirror_id,
                    "No upcoming order found, using subscription-level skip"
                );
            }
            Err(e) => {
                tracing::warn!(
                    subscription = %mirror_id,
                    error = %e,
                    "Order schedule lookup failed, using subscription-level skip"
                );
            }
        }

        mirror.skip_next(&mirror_id).await
    }

    /// Changes the billing frequency to the plan's interval. Mirror-only;
    /// the commerce platform's API exposes no equivalent mutation.
    pub async fn change_plan(&self, subscription_id: &str, plan: Plan) -> AppResult<()> {
        let mirror = self.require_mirror()?;
        let mirror_id = to_mirror_id(subscription_id);
        let interval = plan.delivery_interval();
        mirror
            .change_frequency(&mirror_id, interval.unit, interval.value)
            .await
    }

    // ========================================================================
    // Payment methods
    // ========================================================================

    /// Cards on file with derived status, sorted safe → expiring_soon →
    /// expired.
    pub async fn list_payment_methods(
        &self,
        customer_id: &str,
        today: NaiveDate,
    ) -> AppResult<Vec<PaymentMethod>> {
        let mirror = self.require_mirror()?;
        let raw = mirror.list_payment_methods(customer_id).await?;

        let mut methods: Vec<PaymentMethod> = raw
            .into_iter()
            .map(|m| {
                PaymentMethod::with_derived_status(
                    m.id,
                    m.brand,
                    m.last_digits,
                    m.expiry_month,
                    m.expiry_year,
                    today,
                )
            })
            .collect();
        methods.sort_by_key(|m| m.status.rank());
        Ok(methods)
    }

    /// Emails the customer a secure payment-update link. The returned
    /// message is always user-safe; provider failures collapse to a generic
    /// "contact support" message.
    pub async fn request_payment_method_update(
        &self,
        payment_method_id: i64,
    ) -> AppResult<(bool, String)> {
        let mirror = self.require_mirror()?;
        match mirror.send_payment_method_email(payment_method_id).await {
            Ok(()) => Ok((
                true,
                "We've emailed you a secure link to update your payment method.".to_string(),
            )),
            Err(e) => {
                tracing::error!(
                    payment_method_id,
                    error = %e,
                    "Payment method update email failed"
                );
                Ok((
                    false,
                    "We couldn't send the update email right now. Please contact support."
                        .to_string(),
                ))
            }
        }
    }
}

/// Strips provider internals out of an error before it reaches the caller.
/// `InvalidInput` carries the platform's own user-facing validation message
/// and passes through verbatim.
fn safe_message(error: &AppError) -> String {
    match error {
        AppError::InvalidInput(msg) => msg.clone(),
        AppError::Config(_) => "service is not configured for this operation".to_string(),
        AppError::InvalidCredentials => "not signed in".to_string(),
        AppError::NotFound => "subscription not found".to_string(),
        AppError::Upstream(_) | AppError::Internal(_) => {
            "the subscription service is temporarily unavailable".to_string()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

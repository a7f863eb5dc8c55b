//! Subscription self-service routes: contract reads, the dual-system
//! pause/resume/cancel commands, mirror-only skip and plan changes, and
//! payment-method listing/update.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post, put},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, cookies},
    app_error::{AppError, AppResult},
    application::use_cases::customer_auth::read_session,
    application::use_cases::subscriptions::SubscriptionUseCases,
    domain::entities::subscription_contract::Plan,
};

// ============================================================================
// Types
// ============================================================================

#[derive(Deserialize, Default)]
struct CancelPayload {
    reason: Option<String>,
    comment: Option<String>,
}

/// Result of a mirror-only operation.
#[derive(Serialize)]
struct ActionResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionsPayload {
    action: String,
    subscription_id: String,
    plan: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/subscriptions/{id}
/// Normalized contract state from the authoritative system.
async fn get_contract(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let access_token = require_access_token(&jar)?;
    let subscriptions = require_subscriptions(&app_state)?;

    let contract = subscriptions.get_contract(&access_token, &id).await?;
    Ok(Json(contract))
}

/// POST /api/subscriptions/{id}/pause
async fn pause(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let access_token = require_access_token(&jar)?;
    let subscriptions = require_subscriptions(&app_state)?;

    let outcome = subscriptions.pause(&access_token, &id).await;
    Ok(Json(outcome))
}

/// POST /api/subscriptions/{id}/resume
async fn resume(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let access_token = require_access_token(&jar)?;
    let subscriptions = require_subscriptions(&app_state)?;

    let outcome = subscriptions.resume(&access_token, &id).await;
    Ok(Json(outcome))
}

/// POST /api/subscriptions/{id}/cancel
/// Optional body carries a reason code and free-text comment, forwarded to
/// the mirror system.
async fn cancel(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
    body: Option<Json<CancelPayload>>,
) -> AppResult<impl IntoResponse> {
    let access_token = require_access_token(&jar)?;
    let subscriptions = require_subscriptions(&app_state)?;

    let payload = body.map(|Json(p)| p).unwrap_or_default();
    let outcome = subscriptions
        .cancel(&access_token, &id, payload.reason, payload.comment)
        .await;
    Ok(Json(outcome))
}

/// POST /api/subscriptions/{id}/skip
async fn skip(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    require_access_token(&jar)?;
    let subscriptions = require_subscriptions(&app_state)?;

    subscriptions.skip_next_delivery(&id).await?;
    Ok(Json(ActionResponse {
        success: true,
        message: Some("Your next delivery has been skipped.".into()),
    }))
}

/// POST /api/subscriptions/actions
/// Unified dispatch used by the account UI's action menu.
async fn actions(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<ActionsPayload>,
) -> AppResult<impl IntoResponse> {
    require_access_token(&jar)?;
    let subscriptions = require_subscriptions(&app_state)?;

    match payload.action.as_str() {
        "skip" => {
            subscriptions
                .skip_next_delivery(&payload.subscription_id)
                .await?;
            Ok(Json(ActionResponse {
                success: true,
                message: Some("Your next delivery has been skipped.".into()),
            }))
        }
        "change-plan" => {
            let plan = payload
                .plan
                .as_deref()
                .and_then(Plan::parse)
                .ok_or_else(|| AppError::InvalidInput("Unknown plan".into()))?;
            subscriptions
                .change_plan(&payload.subscription_id, plan)
                .await?;
            Ok(Json(ActionResponse {
                success: true,
                message: Some("Your delivery schedule has been updated.".into()),
            }))
        }
        other => Err(AppError::InvalidInput(format!("Unknown action: {other}"))),
    }
}

/// GET /api/subscriptions/payment-methods
/// Cards on file, sorted safe → expiring_soon → expired.
async fn list_payment_methods(
    State(app_state): State<AppState>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    require_access_token(&jar)?;
    let subscriptions = require_subscriptions(&app_state)?;

    // The mirror keys cards by the commerce platform's numeric customer ID,
    // taken from the identity token.
    let session = read_session(&cookies::session_cookies(&jar), Utc::now());
    let customer_id = session
        .customer
        .as_ref()
        .and_then(|c| c.numeric_id().map(str::to_owned))
        .ok_or(AppError::InvalidCredentials)?;

    let methods = subscriptions
        .list_payment_methods(&customer_id, Utc::now().date_naive())
        .await?;
    Ok(Json(methods))
}

/// PUT /api/subscriptions/payment-methods/{id}
/// Triggers an email with a secure self-service update link; never mutates
/// the card directly.
async fn update_payment_method(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    require_access_token(&jar)?;
    let subscriptions = require_subscriptions(&app_state)?;

    let (success, message) = subscriptions.request_payment_method_update(id).await?;
    Ok(Json(ActionResponse {
        success,
        message: Some(message),
    }))
}

// ============================================================================
// Helpers
// ============================================================================

fn require_access_token(jar: &CookieJar) -> AppResult<String> {
    cookies::access_token(jar).ok_or(AppError::InvalidCredentials)
}

fn require_subscriptions(app_state: &AppState) -> AppResult<Arc<SubscriptionUseCases>> {
    app_state
        .subscriptions
        .clone()
        .ok_or_else(|| AppError::Config("Subscription commands are not configured".into()))
}

// ============================================================================
// Router
// ============================================================================

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/payment-methods", get(list_payment_methods))
        .route("/payment-methods/{id}", put(update_payment_method))
        .route("/actions", post(actions))
        .route("/{id}", get(get_contract))
        .route("/{id}/pause", post(pause))
        .route("/{id}/resume", post(resume))
        .route("/{id}/cancel", post(cancel))
        .route("/{id}/skip", post(skip))
}

// ============================================================================
// Tests
// ============================================================================

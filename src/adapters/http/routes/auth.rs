//! Customer login routes: hosted-login redirect, OAuth callback, session
//! check, logout.

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, cookies},
    app_error::{AppError, AppResult},
    application::use_cases::customer_auth::{
        CallbackFailure, CustomerAuthUseCases, PkceParams, build_authorization_url, read_session,
    },
    domain::entities::customer::CustomerProfile,
};

/// Where the browser lands after a successful login.
const ACCOUNT_PATH: &str = "/account";
/// Where failed login attempts are sent, with an `error` query parameter.
const LOGIN_PATH: &str = "/account/login";

// ============================================================================
// Types
// ============================================================================

#[derive(Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    authenticated: bool,
    customer: Option<CustomerProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expired: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/auth/authorize
/// Starts the login flow: stores PKCE material in transient cookies and
/// redirects to the identity provider's hosted login page. Single-shot.
async fn authorize(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> AppResult<impl IntoResponse> {
    let config = &app_state.config;
    let (Some(client_id), Some(shop_id)) = (&config.client_id, &config.shop_id) else {
        return Err(AppError::Config(
            "Customer account OAuth is not configured".into(),
        ));
    };

    let redirect_uri = callback_uri(&headers, &uri)?;
    let pkce = PkceParams::generate();

    let mut out = HeaderMap::new();
    cookies::set_transient_cookies(&mut out, &pkce, config.oauth_cookie_ttl_minutes)?;

    let auth_url = build_authorization_url(
        &config.identity_origin,
        shop_id,
        client_id,
        &redirect_uri,
        &pkce,
    );

    Ok((out, Redirect::to(auth_url.as_str())))
}

/// GET /api/auth/callback
/// OAuth redirect target. Every failure redirects back to the login page
/// with a distinguishing error code; no provider internals reach the
/// browser.
async fn callback(
    State(app_state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
    headers: HeaderMap,
    uri: Uri,
) -> Response {
    match run_callback(&app_state, query, &jar, &headers, &uri).await {
        Ok(response) => response,
        Err(failure) => {
            tracing::error!(
                code = failure.public_code(),
                detail = ?failure,
                "Login callback failed"
            );
            login_redirect(failure.public_code()).into_response()
        }
    }
}

async fn run_callback(
    app_state: &AppState,
    query: CallbackQuery,
    jar: &CookieJar,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<Response, CallbackFailure> {
    if let Some(provider_error) = query.error {
        return Err(CallbackFailure::Provider(provider_error));
    }

    let (Some(code), Some(state)) = (query.code, query.state) else {
        return Err(CallbackFailure::MissingParams);
    };

    let stored = cookies::stored_auth_state(jar);
    CustomerAuthUseCases::validate_callback(&state, &stored)?;

    let auth = app_state
        .auth
        .as_ref()
        .ok_or_else(|| CallbackFailure::Internal("OAuth is not configured".into()))?;

    let redirect_uri =
        callback_uri(headers, uri).map_err(|e| CallbackFailure::Internal(e.to_string()))?;

    let session = auth.exchange_code(&code, &redirect_uri, &stored).await?;

    let mut out = HeaderMap::new();
    cookies::set_session_cookies(&mut out, &session, app_state.config.refresh_token_ttl_days)
        .map_err(|e| CallbackFailure::Internal(e.to_string()))?;
    cookies::clear_transient_cookies(&mut out)
        .map_err(|e| CallbackFailure::Internal(e.to_string()))?;

    Ok((out, Redirect::to(ACCOUNT_PATH)).into_response())
}

/// GET /api/auth/session
/// The cheap, frequent login-state check the UI polls. Pure cookie read;
/// never fails, never refreshes.
async fn session(jar: CookieJar) -> impl IntoResponse {
    let view = read_session(&cookies::session_cookies(&jar), Utc::now());
    axum::Json(SessionResponse {
        authenticated: view.authenticated,
        customer: view.customer,
        expired: view.expired.then_some(true),
        expires_at: view.expires_at.filter(|_| view.authenticated),
    })
}

/// POST /api/auth/logout
/// Clears the session cookies. The transient PKCE cookies expire on their
/// own.
async fn logout() -> AppResult<impl IntoResponse> {
    let mut headers = HeaderMap::new();
    cookies::clear_session_cookies(&mut headers)?;
    Ok((StatusCode::OK, headers))
}

// ============================================================================
// Helpers
// ============================================================================

/// Callback URL derived from the current request's origin, so the same
/// deployment works across preview and production hosts.
fn callback_uri(headers: &HeaderMap, uri: &Uri) -> AppResult<String> {
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|a| a.to_string()))
        .ok_or_else(|| AppError::Internal("Cannot determine request host".into()))?;
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");
    Ok(format!("{proto}://{host}/api/auth/callback"))
}

fn login_redirect(error_code: &str) -> Redirect {
    Redirect::to(&format!(
        "{LOGIN_PATH}?error={}",
        urlencoding::encode(error_code)
    ))
}

// ============================================================================
// Router
// ============================================================================

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/authorize", get(authorize))
        .route("/callback", get(callback))
        .route("/session", get(session))
        .route("/logout", post(logout))
}

// ============================================================================
// Tests
// ============================================================================

//! Cookie names and construction for the auth flow.
//!
//! All cookie materialization lives here so the use-case layer stays pure
//! over plain values. Every cookie: path `/`, SameSite=Lax, Secure.

use axum::http::{HeaderMap, HeaderValue};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    app_error::AppError,
    application::use_cases::customer_auth::{
        EstablishedSession, PkceParams, SessionCookies, StoredAuthState,
    },
};

// Transient, scoped to one login attempt.
pub const OAUTH_CODE_VERIFIER: &str = "oauth_code_verifier";
pub const OAUTH_STATE: &str = "oauth_state";
pub const OAUTH_NONCE: &str = "oauth_nonce";

// Session, set on callback completion.
pub const CUSTOMER_ACCESS_TOKEN: &str = "customer_access_token";
pub const CUSTOMER_TOKEN_EXPIRES: &str = "customer_token_expires";
pub const CUSTOMER_REFRESH_TOKEN: &str = "customer_refresh_token";
pub const CUSTOMER_ID_TOKEN: &str = "customer_id_token";

/// Appends a cookie to the headers, handling parse errors gracefully.
pub(crate) fn append_cookie(headers: &mut HeaderMap, cookie: Cookie<'_>) -> Result<(), AppError> {
    let value = HeaderValue::from_str(&cookie.to_string())
        .map_err(|_| AppError::Internal("Failed to build cookie header".into()))?;
    headers.append("set-cookie", value);
    Ok(())
}

fn build_cookie(
    name: &'static str,
    value: String,
    http_only: bool,
    max_age: time::Duration,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(http_only)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

fn expire_cookie(headers: &mut HeaderMap, name: &'static str, http_only: bool) -> Result<(), AppError> {
    append_cookie(
        headers,
        build_cookie(name, String::new(), http_only, time::Duration::seconds(0)),
    )
}

// ============================================================================
// Transient PKCE/state/nonce cookies
// ============================================================================

pub(crate) fn set_transient_cookies(
    headers: &mut HeaderMap,
    pkce: &PkceParams,
    ttl_minutes: i64,
) -> Result<(), AppError> {
    let ttl = time::Duration::minutes(ttl_minutes);
    append_cookie(
        headers,
        build_cookie(OAUTH_CODE_VERIFIER, pkce.code_verifier.clone(), true, ttl),
    )?;
    append_cookie(headers, build_cookie(OAUTH_STATE, pkce.state.clone(), true, ttl))?;
    append_cookie(headers, build_cookie(OAUTH_NONCE, pkce.nonce.clone(), true, ttl))?;
    Ok(())
}

pub(crate) fn clear_transient_cookies(headers: &mut HeaderMap) -> Result<(), AppError> {
    expire_cookie(headers, OAUTH_CODE_VERIFIER, true)?;
    expire_cookie(headers, OAUTH_STATE, true)?;
    expire_cookie(headers, OAUTH_NONCE, true)?;
    Ok(())
}

pub(crate) fn stored_auth_state(jar: &CookieJar) -> StoredAuthState {
    StoredAuthState {
        state: jar.get(OAUTH_STATE).map(|c| c.value().to_owned()),
        code_verifier: jar.get(OAUTH_CODE_VERIFIER).map(|c| c.value().to_owned()),
        nonce: jar.get(OAUTH_NONCE).map(|c| c.value().to_owned()),
    }
}

// ============================================================================
// Session cookies
// ============================================================================

pub(crate) fn set_session_cookies(
    headers: &mut HeaderMap,
    session: &EstablishedSession,
    refresh_ttl_days: i64,
) -> Result<(), AppError> {
    let token_ttl = time::Duration::seconds(session.expires_in_secs.max(0));

    append_cookie(
        headers,
        build_cookie(
            CUSTOMER_ACCESS_TOKEN,
            session.access_token.clone(),
            true,
            token_ttl,
        ),
    )?;
    append_cookie(
        headers,
        build_cookie(
            CUSTOMER_TOKEN_EXPIRES,
            session.expires_at.to_rfc3339(),
            true,
            token_ttl,
        ),
    )?;
    if let Some(refresh_token) = &session.refresh_token {
        append_cookie(
            headers,
            build_cookie(
                CUSTOMER_REFRESH_TOKEN,
                refresh_token.clone(),
                true,
                time::Duration::days(refresh_ttl_days),
            ),
        )?;
    }
    // Intentionally readable by client script for lightweight UI use.
    append_cookie(
        headers,
        build_cookie(CUSTOMER_ID_TOKEN, session.id_token.clone(), false, token_ttl),
    )?;
    Ok(())
}

pub(crate) fn clear_session_cookies(headers: &mut HeaderMap) -> Result<(), AppError> {
    expire_cookie(headers, CUSTOMER_ACCESS_TOKEN, true)?;
    expire_cookie(headers, CUSTOMER_TOKEN_EXPIRES, true)?;
    expire_cookie(headers, CUSTOMER_REFRESH_TOKEN, true)?;
    expire_cookie(headers, CUSTOMER_ID_TOKEN, false)?;
    Ok(())
}

pub(crate) fn session_cookies(jar: &CookieJar) -> SessionCookies {
    SessionCookies {
        access_token: jar.get(CUSTOMER_ACCESS_TOKEN).map(|c| c.value().to_owned()),
        id_token: jar.get(CUSTOMER_ID_TOKEN).map(|c| c.value().to_owned()),
        expires_at: jar.get(CUSTOMER_TOKEN_EXPIRES).map(|c| c.value().to_owned()),
    }
}

pub(crate) fn access_token(jar: &CookieJar) -> Option<String> {
    jar.get(CUSTOMER_ACCESS_TOKEN).map(|c| c.value().to_owned())
}

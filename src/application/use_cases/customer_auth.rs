//! Customer authentication: PKCE parameter generation, authorization URL
//! construction, the callback validation/exchange pipeline, and the pure
//! session reader the UI polls.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use url::Url;

use crate::{
    application::id_token,
    application::ports::identity::{ExchangeError, IdentityPort, TokenSet},
    domain::entities::customer::CustomerProfile,
};

/// OAuth scopes required for the account area: OpenID identity, the
/// customer's email, and full Customer Account API access.
pub const OAUTH_SCOPES: &str = "openid email customer-account-api:full";

// ============================================================================
// PKCE
// ============================================================================

/// One login attempt's worth of PKCE/CSRF material.
#[derive(Debug, Clone)]
pub struct PkceParams {
    pub code_verifier: String,
    pub code_challenge: String,
    pub state: String,
    pub nonce: String,
}

impl PkceParams {
    /// Pure generation from the OS random source. An unavailable RNG panics;
    /// there is no meaningful recovery below that.
    pub fn generate() -> Self {
        let code_verifier = random_urlsafe(32);
        let code_challenge = code_challenge_s256(&code_verifier);
        Self {
            code_verifier,
            code_challenge,
            state: random_urlsafe(16),
            nonce: random_urlsafe(16),
        }
    }
}

fn random_urlsafe(entropy_bytes: usize) -> String {
    let mut bytes = vec![0u8; entropy_bytes];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `challenge = BASE64URL(SHA256(verifier))` (RFC 7636 S256).
pub fn code_challenge_s256(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Builds the hosted-login authorization URL.
pub fn build_authorization_url(
    identity_origin: &Url,
    shop_id: &str,
    client_id: &str,
    redirect_uri: &str,
    pkce: &PkceParams,
) -> Url {
    let mut auth_url = identity_origin
        .join(&format!("authentication/{shop_id}/oauth/authorize"))
        .expect("identity origin is a valid base URL");
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", OAUTH_SCOPES)
        .append_pair("state", &pkce.state)
        .append_pair("nonce", &pkce.nonce)
        .append_pair("code_challenge", &pkce.code_challenge)
        .append_pair("code_challenge_method", "S256");
    auth_url
}

// ============================================================================
// Callback pipeline
// ============================================================================

/// Transient values stored in cookies at authorization start.
#[derive(Debug, Clone, Default)]
pub struct StoredAuthState {
    pub state: Option<String>,
    pub code_verifier: Option<String>,
    pub nonce: Option<String>,
}

/// Terminal callback failures. Each maps to an error code attached to the
/// login-page redirect; none carry provider internals.
#[derive(Debug)]
pub enum CallbackFailure {
    /// The provider redirected back with an explicit error code.
    Provider(String),
    MissingParams,
    InvalidState,
    MissingVerifier,
    Exchange(ExchangeError),
    /// Residual failure while completing the callback (e.g. the redirect
    /// URI could not be reconstructed).
    Internal(String),
}

impl CallbackFailure {
    pub fn public_code(&self) -> &str {
        match self {
            CallbackFailure::Provider(code) => code,
            CallbackFailure::MissingParams => "missing_params",
            CallbackFailure::InvalidState => "invalid_state",
            CallbackFailure::MissingVerifier => "missing_verifier",
            CallbackFailure::Exchange(e) => e.public_code(),
            CallbackFailure::Internal(_) => "callback_failed",
        }
    }
}

/// A freshly established session, ready to be persisted as cookies.
#[derive(Debug, Clone)]
pub struct EstablishedSession {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub expires_in_secs: i64,
    pub expires_at: DateTime<Utc>,
}

pub struct CustomerAuthUseCases {
    identity: Arc<dyn IdentityPort>,
}

impl CustomerAuthUseCases {
    pub fn new(identity: Arc<dyn IdentityPort>) -> Self {
        Self { identity }
    }

    /// CSRF/replay validation. Must pass before any token exchange is
    /// attempted; failures are terminal for this login attempt.
    pub fn validate_callback(
        query_state: &str,
        stored: &StoredAuthState,
    ) -> Result<(), CallbackFailure> {
        match stored.state.as_deref() {
            Some(cookie_state) if cookie_state == query_state => {}
            _ => return Err(CallbackFailure::InvalidState),
        }
        if stored.code_verifier.as_deref().unwrap_or("").is_empty() {
            return Err(CallbackFailure::MissingVerifier);
        }
        Ok(())
    }

    /// Exchanges the authorization code and checks the identity token's
    /// nonce claim against the stored nonce. A mismatch is logged but does
    /// not abort the flow — current behavior, kept under review.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        stored: &StoredAuthState,
    ) -> Result<EstablishedSession, CallbackFailure> {
        let verifier = stored
            .code_verifier
            .as_deref()
            .ok_or(CallbackFailure::MissingVerifier)?;

        let tokens: TokenSet = self
            .identity
            .exchange_code(code, redirect_uri, verifier)
            .await
            .map_err(CallbackFailure::Exchange)?;

        verify_nonce(&tokens.id_token, stored.nonce.as_deref());

        let expires_at = Utc::now() + Duration::seconds(tokens.expires_in);
        Ok(EstablishedSession {
            access_token: tokens.access_token,
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
            expires_in_secs: tokens.expires_in,
            expires_at,
        })
    }
}

fn verify_nonce(id_token: &str, stored_nonce: Option<&str>) {
    let claim_nonce = id_token::decode_claims(id_token).and_then(|c| c.nonce);
    if claim_nonce.as_deref() != stored_nonce {
        tracing::error!(
            has_stored = stored_nonce.is_some(),
            has_claim = claim_nonce.is_some(),
            "Identity token nonce does not match stored nonce"
        );
    }
}

// ============================================================================
// Session reader
// ============================================================================

/// Session cookie values as read from the request.
#[derive(Debug, Clone, Default)]
pub struct SessionCookies {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub expires_at: Option<String>,
}

/// Answer to "who is logged in". Pure projection of cookie state; no
/// network call and no token refresh.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub authenticated: bool,
    pub customer: Option<CustomerProfile>,
    pub expired: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionView {
    fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            customer: None,
            expired: false,
            expires_at: None,
        }
    }
}

/// Decodes the persisted session. Fails closed: any missing cookie or
/// malformed token yields an unauthenticated view, never an error.
pub fn read_session(cookies: &SessionCookies, now: DateTime<Utc>) -> SessionView {
    let (Some(_access), Some(id_token)) = (&cookies.access_token, &cookies.id_token) else {
        return SessionView::unauthenticated();
    };

    let expires_at = cookies
        .expires_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc));

    match expires_at {
        Some(expiry) if expiry <= now => {
            return SessionView {
                authenticated: false,
                customer: None,
                expired: true,
                expires_at: Some(expiry),
            };
        }
        Some(_) => {}
        // Unreadable expiry stamp: treat the session as not established.
        None => return SessionView::unauthenticated(),
    }

    let Some(claims) = id_token::decode_claims(id_token) else {
        return SessionView::unauthenticated();
    };

    SessionView {
        authenticated: true,
        customer: Some(CustomerProfile::from_claims(&claims)),
        expired: false,
        expires_at,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use sha2::{Digest, Sha256};

    #[test]
    fn verifier_has_required_entropy_and_encoding() {
        let pkce = PkceParams::generate();
        // 32 bytes -> 43 base64url chars, RFC 7636 minimum.
        assert_eq!(pkce.code_verifier.len(), 43);
        assert!(
            pkce.code_verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_eq!(pkce.state.len(), 22);
        assert_eq!(pkce.nonce.len(), 22);
    }

    #[test]
    fn params_are_unique_per_attempt() {
        let a = PkceParams::generate();
        let b = PkceParams::generate();
        assert_ne!(a.code_verifier, b.code_verifier);
        assert_ne!(a.state, b.state);
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn challenge_is_s256_of_verifier() {
        let pkce = PkceParams::generate();
        let expected = URL_SAFE_NO_PAD.encode(Sha256::digest(pkce.code_verifier.as_bytes()));
        assert_eq!(pkce.code_challenge, expected);
    }

    #[test]
    fn authorization_url_carries_all_parameters() {
        let pkce = PkceParams::generate();
        let url = build_authorization_url(
            &"https://shopify.com".parse().unwrap(),
            "12345678",
            "client-abc",
            "https://conka.com/api/auth/callback",
            &pkce,
        );

        assert_eq!(url.path(), "/authentication/12345678/oauth/authorize");
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_id"], "client-abc");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["redirect_uri"], "https://conka.com/api/auth/callback");
        assert_eq!(pairs["scope"], OAUTH_SCOPES);
        assert_eq!(pairs["state"], pkce.state);
        assert_eq!(pairs["nonce"], pkce.nonce);
        assert_eq!(pairs["code_challenge"], pkce.code_challenge);
        assert_eq!(pairs["code_challenge_method"], "S256");
    }

    #[test]
    fn callback_validation_rejects_state_mismatch() {
        let stored = StoredAuthState {
            state: Some("expected".into()),
            code_verifier: Some("verifier".into()),
            nonce: None,
        };

        assert!(CustomerAuthUseCases::validate_callback("expected", &stored).is_ok());

        for bad in ["other", "", "EXPECTED"] {
            assert!(matches!(
                CustomerAuthUseCases::validate_callback(bad, &stored),
                Err(CallbackFailure::InvalidState)
            ));
        }

        let missing = StoredAuthState {
            state: None,
            code_verifier: Some("verifier".into()),
            nonce: None,
        };
        assert!(matches!(
            CustomerAuthUseCases::validate_callback("expected", &missing),
            Err(CallbackFailure::InvalidState)
        ));
    }

    #[test]
    fn callback_validation_requires_verifier() {
        let stored = StoredAuthState {
            state: Some("s".into()),
            code_verifier: None,
            nonce: None,
        };
        assert!(matches!(
            CustomerAuthUseCases::validate_callback("s", &stored),
            Err(CallbackFailure::MissingVerifier)
        ));
    }

    fn forge_id_token(email: &str) -> String {
        let payload = serde_json::json!({
            "sub": "gid://shopify/Customer/1",
            "email": email,
        });
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#),
            URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes()),
        )
    }

    #[test]
    fn session_reader_requires_both_tokens() {
        let now = Utc::now();
        let view = read_session(&SessionCookies::default(), now);
        assert!(!view.authenticated);

        let only_access = SessionCookies {
            access_token: Some("tok".into()),
            ..Default::default()
        };
        assert!(!read_session(&only_access, now).authenticated);
    }

    #[test]
    fn session_reader_reports_expiry() {
        let now = Utc::now();
        let cookies = SessionCookies {
            access_token: Some("tok".into()),
            id_token: Some(forge_id_token("jo@example.com")),
            expires_at: Some((now - Duration::minutes(1)).to_rfc3339()),
        };
        let view = read_session(&cookies, now);
        assert!(!view.authenticated);
        assert!(view.expired);
    }

    #[test]
    fn session_reader_projects_customer() {
        let now = Utc::now();
        let cookies = SessionCookies {
            access_token: Some("tok".into()),
            id_token: Some(forge_id_token("jo@example.com")),
            expires_at: Some((now + Duration::hours(1)).to_rfc3339()),
        };
        let view = read_session(&cookies, now);
        assert!(view.authenticated);
        let customer = view.customer.unwrap();
        assert_eq!(customer.email.as_deref(), Some("jo@example.com"));
        assert_eq!(customer.id, "gid://shopify/Customer/1");
    }

    #[test]
    fn session_reader_fails_closed_on_garbage_token() {
        let now = Utc::now();
        let cookies = SessionCookies {
            access_token: Some("tok".into()),
            id_token: Some("!!not a jwt!!".into()),
            expires_at: Some((now + Duration::hours(1)).to_rfc3339()),
        };
        let view = read_session(&cookies, now);
        assert!(!view.authenticated);
        assert!(view.customer.is_none());
    }
}

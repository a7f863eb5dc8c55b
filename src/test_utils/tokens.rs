//! Forged identity tokens for tests. Signatures are never checked by the
//! service, so a fixed fake signature segment is enough.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;

use crate::application::ports::identity::TokenSet;

pub fn forge_id_token(payload: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
    format!("{header}.{body}.test-signature")
}

/// A token set the mock identity provider hands out on success.
pub fn test_token_set(nonce: &str) -> TokenSet {
    TokenSet {
        access_token: "test-access-token".into(),
        id_token: forge_id_token(json!({
            "sub": "gid://shopify/Customer/7443621511414",
            "email": "jo@example.com",
            "given_name": "Jo",
            "family_name": "Bloggs",
            "name": "Jo Bloggs",
            "nonce": nonce,
        })),
        refresh_token: Some("test-refresh-token".into()),
        expires_in: 3600,
    }
}

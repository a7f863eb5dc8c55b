//! Identity-token payload decoding.
//!
//! The token's payload (second JWT segment) is base64url-decoded and parsed
//! as JSON. The signature is NOT verified: the token is consumed straight
//! from the provider's token endpoint over TLS, and session checks treat it
//! as a hint, not an entitlement. Every caller fails closed on decode errors.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::domain::entities::customer::IdTokenClaims;

/// Decodes the claims from an identity token. Returns `None` for anything
/// that is not a well-formed JWT with a JSON payload.
pub fn decode_claims(id_token: &str) -> Option<IdTokenClaims> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

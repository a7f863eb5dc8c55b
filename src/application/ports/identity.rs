use async_trait::async_trait;
use serde::Deserialize;

/// Tokens returned by the identity provider's token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

/// Typed token-exchange failure with source information.
#[derive(Debug)]
pub enum ExchangeError {
    /// Network error before a response was received.
    Network { message: String },
    /// The provider returned an error response.
    Provider {
        status: u16,
        error_code: Option<String>,
        message: String,
    },
}

impl ExchangeError {
    /// Error code safe to surface in a redirect query parameter.
    pub fn public_code(&self) -> &str {
        match self {
            ExchangeError::Network { .. } => "token_error",
            ExchangeError::Provider { error_code, .. } => {
                error_code.as_deref().unwrap_or("token_error")
            }
        }
    }
}

/// Port for the identity provider's authorization-code exchange.
///
/// The rest of the PKCE flow (URL construction, cookie handling) is pure;
/// only this one network call crosses the boundary.
#[async_trait]
pub trait IdentityPort: Send + Sync {
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, ExchangeError>;
}

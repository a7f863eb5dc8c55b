//! Token-endpoint client for Shopify's Customer Account identity provider.

use async_trait::async_trait;
use url::Url;

use crate::{
    application::ports::identity::{ExchangeError, IdentityPort, TokenSet},
    infra::http_client,
};

pub struct ShopifyIdentityClient {
    token_endpoint: Url,
    client_id: String,
}

impl ShopifyIdentityClient {
    pub fn new(identity_origin: &Url, shop_id: &str, client_id: String) -> Self {
        let token_endpoint = identity_origin
            .join(&format!("authentication/{shop_id}/oauth/token"))
            .expect("identity origin is a valid base URL");
        Self {
            token_endpoint,
            client_id,
        }
    }
}

#[async_trait]
impl IdentityPort for ShopifyIdentityClient {
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenSet, ExchangeError> {
        let client = http_client::try_build_client().map_err(|e| {
            tracing::error!(error = %e, "Failed to build HTTP client for token exchange");
            ExchangeError::Network {
                message: format!("Failed to build HTTP client: {e}"),
            }
        })?;

        // Public client: PKCE only, no client secret.
        let response = client
            .post(self.token_endpoint.clone())
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.client_id.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await
            .map_err(|e| ExchangeError::Network {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();

        if !response.status().is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let error_code = serde_json::from_str::<serde_json::Value>(&error_body)
                .ok()
                .and_then(|value| {
                    value
                        .get("error")
                        .and_then(|error| error.as_str())
                        .map(str::to_string)
                });
            return Err(ExchangeError::Provider {
                status,
                error_code,
                message: error_body,
            });
        }

        response
            .json::<TokenSet>()
            .await
            .map_err(|e| ExchangeError::Provider {
                status,
                error_code: None,
                message: format!("Failed to parse token response: {e}"),
            })
    }
}

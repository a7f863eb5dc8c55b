use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use secrecy::SecretString;
use url::Url;

pub struct AppConfig {
    /// Shopify shop ID used in the hosted login URLs. Auth routes return a
    /// configuration error when absent.
    pub shop_id: Option<String>,
    /// Customer Account API OAuth client ID (public client, PKCE only).
    pub client_id: Option<String>,
    /// Origin hosting the identity provider's authorize/token endpoints.
    pub identity_origin: Url,
    /// Origin hosting the Customer Account GraphQL API.
    pub customer_api_origin: Url,
    pub customer_api_version: String,
    /// Loop Subscriptions admin API key. Mirror writes are skipped when absent;
    /// mirror-only operations fail with a configuration error.
    pub loop_api_key: Option<SecretString>,
    pub loop_api_base: Url,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub refresh_token_ttl_days: i64,
    /// Lifetime of the transient PKCE/state/nonce cookies.
    pub oauth_cookie_ttl_minutes: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let shop_id: Option<String> = std::env::var("SHOPIFY_SHOP_ID").ok();
        let client_id: Option<String> = std::env::var("SHOPIFY_CUSTOMER_CLIENT_ID").ok();

        let identity_origin: Url = get_env_default(
            "SHOPIFY_IDENTITY_ORIGIN",
            "https://shopify.com".parse().unwrap(),
        );
        let customer_api_origin: Url = get_env_default(
            "SHOPIFY_CUSTOMER_API_ORIGIN",
            "https://shopify.com".parse().unwrap(),
        );
        let customer_api_version: String =
            get_env_default("SHOPIFY_CUSTOMER_API_VERSION", "2024-10".to_string());

        let loop_api_key: Option<SecretString> = std::env::var("LOOP_API_KEY")
            .ok()
            .map(|k| SecretString::new(k.into()));
        let loop_api_base: Url = get_env_default(
            "LOOP_API_BASE",
            "https://api.loopsubscriptions.com/admin/v2".parse().unwrap(),
        );

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let bind_addr: SocketAddr = get_env_default("BIND_ADDR", "127.0.0.1:3001".parse().unwrap());
        let refresh_token_ttl_days: i64 = get_env_default("REFRESH_TOKEN_TTL_DAYS", 30);
        let oauth_cookie_ttl_minutes: i64 = get_env_default("OAUTH_COOKIE_TTL_MINUTES", 10);

        Self {
            shop_id,
            client_id,
            identity_origin,
            customer_api_origin,
            customer_api_version,
            loop_api_key,
            loop_api_base,
            cors_origin,
            bind_addr,
            refresh_token_ttl_days,
            oauth_cookie_ttl_minutes,
        }
    }
}
